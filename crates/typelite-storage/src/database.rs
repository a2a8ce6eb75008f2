// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection handle with PRAGMA setup and WAL mode.

use std::path::Path;

use tracing::debug;
use typelite_core::TypeliteError;

/// Convert a tokio-rusqlite call error into `TypeliteError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TypeliteError {
    TypeliteError::Storage {
        source: Box::new(e),
    }
}

/// An open connection to one per-type database file.
///
/// Cloning is cheap and shares the same underlying connection; all callers
/// for a type key hold clones of the same handle.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open the database at `path` and apply the connection PRAGMAs.
    pub async fn open(path: &Path) -> Result<Self, TypeliteError> {
        let conn = tokio_rusqlite::Connection::open(path.to_path_buf())
            .await
            .map_err(|e| TypeliteError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %path.display(), "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), TypeliteError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.db3");
        let _db = Database::open(&path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn open_applies_wal_mode() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("wal.db3")).await.unwrap();

        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test]
    async fn open_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/x.db3");
        let result = Database::open(&path).await;
        assert!(matches!(result, Err(TypeliteError::Storage { .. })));
    }

    #[tokio::test]
    async fn checkpoint_succeeds_after_writes() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("cp.db3")).await.unwrap();

        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(
                    "CREATE TABLE t (id INTEGER PRIMARY KEY);
                     INSERT INTO t (id) VALUES (1);",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        db.checkpoint().await.unwrap();
    }
}
