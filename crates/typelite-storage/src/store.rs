// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed store facade over the connection registry and the creation gate.
//!
//! Every operation follows the same preamble: resolve the type's connection
//! through the registry, pass the creation gate, then delegate to the
//! engine. After warm-up the preamble is two lock-free map reads.

use std::marker::PhantomData;
use std::sync::OnceLock;

use tracing::debug;
use typelite_core::{Record, TypeliteError, Value, type_key};

use crate::config::StorageConfig;
use crate::database::{Database, map_tr_err};
use crate::gate::CreationGate;
use crate::queries::{self, row_values, to_sql_values};
use crate::registry::ConnectionRegistry;
use crate::sql;

static SHARED: OnceLock<Storage> = OnceLock::new();

/// Process-wide storage state: the configuration, the keyed connection
/// cache, and the table-creation gate.
///
/// Populated lazily and never torn down during normal operation; everything
/// is rebuilt empty at process start, at which point table creation re-runs
/// as an engine-level no-op. Use [`Storage::shared`] for the default
/// process-wide instance, or [`Storage::new`] for a scoped one (tests,
/// alternate data directories).
pub struct Storage {
    config: StorageConfig,
    registry: ConnectionRegistry,
    gate: CreationGate,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            registry: ConnectionRegistry::new(),
            gate: CreationGate::new(),
        }
    }

    /// The process-wide storage instance with default configuration.
    pub fn shared() -> &'static Storage {
        SHARED.get_or_init(|| Storage::new(StorageConfig::default()))
    }

    /// Typed store handle for record type `R`.
    pub fn store<R: Record>(&self) -> RecordStore<'_, R> {
        RecordStore {
            storage: self,
            _marker: PhantomData,
        }
    }

    /// Resolve (or lazily open) the connection for `key`.
    async fn connection(&self, key: &'static str) -> Result<Database, TypeliteError> {
        let config = &self.config;
        self.registry
            .get_or_open(key, move || async move {
                let path = config.database_path(key)?;
                if let Some(dir) = path.parent() {
                    std::fs::create_dir_all(dir).map_err(|e| TypeliteError::Storage {
                        source: Box::new(e),
                    })?;
                }
                Database::open(&path).await
            })
            .await
    }

    /// Checkpoint the WAL of every open connection.
    pub async fn checkpoint_all(&self) -> Result<(), TypeliteError> {
        for db in self.registry.open_connections() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

/// Typed CRUD facade for one record type.
pub struct RecordStore<'a, R: Record> {
    storage: &'a Storage,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> RecordStore<'_, R> {
    /// Connection for `R`, guaranteed to have its table created.
    async fn ready(&self) -> Result<Database, TypeliteError> {
        let key = type_key::<R>();
        let db = self.storage.connection(key).await?;
        let ddl_db = db.clone();
        self.storage
            .gate
            .ensure(key, move || async move {
                let ddl = sql::create_table(R::schema())?;
                queries::execute_ddl(&ddl_db, ddl).await?;
                debug!(key, table = R::schema().table, "table created");
                Ok(())
            })
            .await?;
        Ok(db)
    }

    /// Insert one record. Returns the number of rows affected.
    pub async fn add(&self, value: &R) -> Result<usize, TypeliteError> {
        let db = self.ready().await?;
        queries::execute(&db, sql::insert(R::schema()), value.to_values()).await
    }

    /// Delete the stored record with the same primary key.
    ///
    /// Returns rows affected; 0 when no such record exists, which is not an
    /// error.
    pub async fn delete(&self, value: &R) -> Result<usize, TypeliteError> {
        let db = self.ready().await?;
        let stmt = sql::delete(R::schema())?;
        let key_value = primary_key_value::<R>(value)?;
        queries::execute(&db, stmt, vec![key_value]).await
    }

    /// Update every non-key column of the stored record with the same
    /// primary key.
    ///
    /// Returns rows affected; 0 when no such record exists, which is not an
    /// error.
    pub async fn update(&self, value: &R) -> Result<usize, TypeliteError> {
        let db = self.ready().await?;
        let stmt = sql::update(R::schema())?;
        let params = update_params::<R>(value)?;
        queries::execute(&db, stmt, params).await
    }

    /// Fetch the record with the given primary key value.
    pub async fn get(&self, key: Value) -> Result<Option<R>, TypeliteError> {
        let db = self.ready().await?;
        let stmt = sql::select_by_key(R::schema())?;
        queries::select_record(&db, stmt, vec![key]).await
    }

    /// All records of the type, in the engine's natural retrieval order.
    pub async fn list(&self) -> Result<Vec<R>, TypeliteError> {
        let db = self.ready().await?;
        queries::select_records(&db, sql::select_all(R::schema()), Vec::new()).await
    }

    /// Number of stored records of the type.
    pub async fn count(&self) -> Result<i64, TypeliteError> {
        let db = self.ready().await?;
        queries::select_count(&db, sql::count(R::schema())).await
    }

    /// Run `action` inside a single engine transaction.
    ///
    /// Either every operation performed through the scope commits, or, if
    /// the action returns an error, none of them do. The scope handle is
    /// valid only for the duration of the call.
    pub async fn run_in_transaction<T, F>(&self, action: F) -> Result<T, TypeliteError>
    where
        F: FnOnce(&TxnScope<'_, R>) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.ready().await?;
        db.connection()
            .call(move |conn| -> rusqlite::Result<T> {
                let tx = conn.transaction()?;
                let out = action(&TxnScope {
                    tx: &tx,
                    _marker: PhantomData,
                })?;
                tx.commit()?;
                Ok(out)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Connection-scoped handle passed to [`RecordStore::run_in_transaction`]
/// actions.
///
/// Operations run synchronously on the engine thread inside the surrounding
/// transaction; an error from the action rolls every one of them back.
pub struct TxnScope<'conn, R: Record> {
    tx: &'conn rusqlite::Transaction<'conn>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> TxnScope<'_, R> {
    /// Insert one record. Returns the number of rows affected.
    pub fn add(&self, value: &R) -> rusqlite::Result<usize> {
        let params = to_sql_values(value.to_values());
        self.tx
            .execute(&sql::insert(R::schema()), rusqlite::params_from_iter(params))
    }

    /// Delete by primary key. Returns rows affected (0 when absent).
    pub fn delete(&self, value: &R) -> rusqlite::Result<usize> {
        let stmt = sql::delete(R::schema()).map_err(into_sql_err)?;
        let key_value = primary_key_value::<R>(value).map_err(into_sql_err)?;
        self.tx.execute(
            &stmt,
            rusqlite::params_from_iter(to_sql_values(vec![key_value])),
        )
    }

    /// Update non-key columns by primary key. Returns rows affected.
    pub fn update(&self, value: &R) -> rusqlite::Result<usize> {
        let stmt = sql::update(R::schema()).map_err(into_sql_err)?;
        let params = update_params::<R>(value).map_err(into_sql_err)?;
        self.tx
            .execute(&stmt, rusqlite::params_from_iter(to_sql_values(params)))
    }

    /// All records of the type, as visible inside the transaction.
    pub fn list(&self) -> rusqlite::Result<Vec<R>> {
        let schema = R::schema();
        let mut stmt = self.tx.prepare(&sql::select_all(schema))?;
        let rows = stmt.query_map([], |row| row_values(row, schema.columns.len()))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(R::from_values(&row?).map_err(into_sql_err)?);
        }
        Ok(records)
    }
}

/// Carry a typelite error across the rusqlite error channel inside a
/// transaction closure.
fn into_sql_err(e: TypeliteError) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

fn primary_key_value<R: Record>(value: &R) -> Result<Value, TypeliteError> {
    let schema = R::schema();
    let (key_idx, _) = sql::require_primary_key(schema)?;
    let mut values = checked_values::<R>(value)?;
    Ok(values.swap_remove(key_idx))
}

/// Non-key cells in schema order, then the key cell, matching
/// [`sql::update`]'s placeholder order.
fn update_params<R: Record>(value: &R) -> Result<Vec<Value>, TypeliteError> {
    let schema = R::schema();
    let (key_idx, _) = sql::require_primary_key(schema)?;
    let mut values = checked_values::<R>(value)?;
    let key_value = values.remove(key_idx);
    values.push(key_value);
    Ok(values)
}

fn checked_values<R: Record>(value: &R) -> Result<Vec<Value>, TypeliteError> {
    let schema = R::schema();
    let values = value.to_values();
    if values.len() != schema.columns.len() {
        return Err(TypeliteError::Mapping(format!(
            "record for table {:?} produced {} cells for {} columns",
            schema.table,
            values.len(),
            schema.columns.len()
        )));
    }
    Ok(values)
}
