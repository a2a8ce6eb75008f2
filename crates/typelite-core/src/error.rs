// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the typelite workspace.

use thiserror::Error;

/// The primary error type used across typelite storage operations.
#[derive(Debug, Error)]
pub enum TypeliteError {
    /// Configuration errors (no resolvable data directory, unusable type key).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage engine errors (connection open, statement execution).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Record shape errors (no primary key column, empty column list).
    #[error("schema error: {0}")]
    Schema(String),

    /// Row mapping errors raised while converting table rows into records.
    #[error("mapping error: {0}")]
    Mapping(String),
}
