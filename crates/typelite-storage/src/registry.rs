// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed connection cache: at most one open connection per type key.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use typelite_core::TypeliteError;

use crate::database::Database;

/// Process-local registry mapping type keys to open database handles.
///
/// Each slot is an async once-cell, so under unbounded concurrent first use
/// exactly one open runs per key, every caller waits for it and observes the
/// same handle, and no entry is ever evicted during normal operation. A
/// failed open leaves the slot empty; the next caller for that key repeats
/// the attempt.
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: DashMap<&'static str, Arc<OnceCell<Database>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the connection for `key`, opening it through `open` on first
    /// use.
    pub async fn get_or_open<F, Fut>(
        &self,
        key: &'static str,
        open: F,
    ) -> Result<Database, TypeliteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Database, TypeliteError>>,
    {
        let cell = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();
        let db = cell.get_or_try_init(open).await?;
        Ok(db.clone())
    }

    /// Number of keys with a registered slot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles that finished opening, across all keys.
    pub(crate) fn open_connections(&self) -> Vec<Database> {
        self.entries
            .iter()
            .filter_map(|entry| entry.value().get().cloned())
            .collect()
    }
}
