// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-type SQLite persistence for typelite.
//!
//! Each record type gets its own database file and table, opened lazily and
//! shared process-wide through a keyed connection cache. Table creation is
//! guarded by an exactly-once gate that stays lock-free once warm, so
//! concurrent first use from any operation is safe.
//!
//! All statements run through `tokio-rusqlite`'s single background thread
//! per connection. Do NOT open additional connections to the same file for
//! writes.

pub mod config;
pub mod database;
pub mod gate;
pub mod queries;
pub mod registry;
pub mod sql;
pub mod store;

pub use config::StorageConfig;
pub use database::Database;
pub use store::{RecordStore, Storage, TxnScope};
