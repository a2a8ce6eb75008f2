// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exactly-once table creation, safe under concurrent first use.
//!
//! The gate is the only piece of application-level locking in the crate.
//! Steady state is lock-free: once a key is recorded as created, callers
//! return before touching the lock arena. The per-key locks exist only for
//! the first-use race window and are reclaimed by the last task out, so the
//! arena never grows past the number of keys currently warming up.

use std::future::Future;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::Mutex;
use tracing::debug;
use typelite_core::TypeliteError;

/// Gate serializing the one-time creation step for each type key.
#[derive(Default)]
pub struct CreationGate {
    /// Keys whose creation step completed. Inserted once, never removed.
    created: DashSet<&'static str>,
    /// Transient per-key locks, live only while a key is warming up.
    locks: DashMap<&'static str, Arc<Mutex<()>>>,
}

impl CreationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `init` for `key` exactly once across all concurrent callers.
    ///
    /// Callers racing the first use serialize on a per-key lock and re-check
    /// the created-set after acquiring it, so `init` runs once even when the
    /// engine-level statement is not idempotent. If `init` fails, the key
    /// stays uncreated and the next caller retries.
    ///
    /// The lock entry is removed only when no other task still holds a clone
    /// of it; a waiter mid-acquire keeps the entry alive, so it can never be
    /// handed a freshly re-created lock while an earlier attempt is still in
    /// flight.
    pub async fn ensure<F, Fut>(&self, key: &'static str, init: F) -> Result<(), TypeliteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), TypeliteError>>,
    {
        if self.created.contains(key) {
            return Ok(());
        }

        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let guard = lock.lock().await;

        let result = if self.created.contains(key) {
            // A racing peer finished while we waited for the lock.
            Ok(())
        } else {
            init().await.map(|()| {
                self.created.insert(key);
                debug!(key, "one-time creation complete");
            })
        };

        drop(guard);
        drop(lock);
        // The created-set remembers the key permanently, so the lock is not
        // needed again after success. Count 1 = only the map's clone is left;
        // a waiter still holding one keeps the entry alive, and the last task
        // out removes it.
        self.locks
            .remove_if(key, |_, entry| Arc::strong_count(entry) == 1);
        result
    }

    /// Whether `key` has completed its one-time creation.
    pub fn is_created(&self, key: &str) -> bool {
        self.created.contains(key)
    }

    /// Number of live per-key locks. Nonzero only during first-use races.
    pub fn pending_locks(&self) -> usize {
        self.locks.len()
    }
}
