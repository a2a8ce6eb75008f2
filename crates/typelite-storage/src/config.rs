// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage configuration and database file path resolution.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typelite_core::TypeliteError;

/// File extension shared by all per-type database files.
pub const DB_FILE_EXTENSION: &str = "db3";

/// Storage backend configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the per-type database files.
    ///
    /// When unset, the platform data directory joined with `typelite` is
    /// used.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the directory database files live in.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, TypeliteError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("typelite"))
                .ok_or_else(|| {
                    TypeliteError::Config("no platform data directory available".to_string())
                }),
        }
    }

    /// Database file path for a type key.
    ///
    /// The file stem is the key with every non-alphanumeric character
    /// stripped, suffixed with [`DB_FILE_EXTENSION`].
    pub fn database_path(&self, type_key: &str) -> Result<PathBuf, TypeliteError> {
        let stem: String = type_key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if stem.is_empty() {
            return Err(TypeliteError::Config(format!(
                "type key {type_key:?} has no usable characters for a file name"
            )));
        }
        Ok(self
            .resolve_data_dir()?
            .join(format!("{stem}.{DB_FILE_EXTENSION}")))
    }
}
