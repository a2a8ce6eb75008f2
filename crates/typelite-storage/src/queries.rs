// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic statement execution against a per-type database.
//!
//! Every function ships its statement into the connection's background
//! thread via `conn.call()`. Row cells travel as [`Value`]s so record
//! mapping happens outside the engine closure and mapping failures surface
//! as their own error, not as engine errors.

use typelite_core::{Record, TypeliteError, Value};

use crate::database::{Database, map_tr_err};

/// Lower row cells into rusqlite parameter values.
pub(crate) fn to_sql_values(values: Vec<Value>) -> Vec<rusqlite::types::Value> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Null => rusqlite::types::Value::Null,
            Value::Integer(i) => rusqlite::types::Value::Integer(i),
            Value::Real(f) => rusqlite::types::Value::Real(f),
            Value::Text(s) => rusqlite::types::Value::Text(s),
            Value::Blob(b) => rusqlite::types::Value::Blob(b),
        })
        .collect()
}

fn from_sql_value(v: rusqlite::types::Value) -> Value {
    match v {
        rusqlite::types::Value::Null => Value::Null,
        rusqlite::types::Value::Integer(i) => Value::Integer(i),
        rusqlite::types::Value::Real(f) => Value::Real(f),
        rusqlite::types::Value::Text(s) => Value::Text(s),
        rusqlite::types::Value::Blob(b) => Value::Blob(b),
    }
}

/// Read the first `width` cells of a row.
pub(crate) fn row_values(
    row: &rusqlite::Row<'_>,
    width: usize,
) -> Result<Vec<Value>, rusqlite::Error> {
    let mut values = Vec::with_capacity(width);
    for i in 0..width {
        let v: rusqlite::types::Value = row.get(i)?;
        values.push(from_sql_value(v));
    }
    Ok(values)
}

/// Execute a row-changing statement. Returns the affected-row count.
pub async fn execute(
    db: &Database,
    sql: String,
    params: Vec<Value>,
) -> Result<usize, TypeliteError> {
    let params = to_sql_values(params);
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(&sql, rusqlite::params_from_iter(params))
        })
        .await
        .map_err(map_tr_err)
}

/// Run a one-shot DDL statement.
pub async fn execute_ddl(db: &Database, sql: String) -> Result<(), TypeliteError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Read every row the statement yields as records of type `R`.
pub async fn select_records<R: Record>(
    db: &Database,
    sql: String,
    params: Vec<Value>,
) -> Result<Vec<R>, TypeliteError> {
    let params = to_sql_values(params);
    let width = R::schema().columns.len();
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<Vec<Value>>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let mapped =
                stmt.query_map(rusqlite::params_from_iter(params), |row| {
                    row_values(row, width)
                })?;
            let mut rows = Vec::new();
            for row in mapped {
                rows.push(row?);
            }
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;

    rows.iter().map(|values| R::from_values(values)).collect()
}

/// Read at most one record, `None` when the statement matches no row.
pub async fn select_record<R: Record>(
    db: &Database,
    sql: String,
    params: Vec<Value>,
) -> Result<Option<R>, TypeliteError> {
    let params = to_sql_values(params);
    let width = R::schema().columns.len();
    let row = db
        .connection()
        .call(move |conn| -> Result<Option<Vec<Value>>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let result = stmt.query_row(rusqlite::params_from_iter(params), |row| {
                row_values(row, width)
            });
            match result {
                Ok(values) => Ok(Some(values)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    row.map(|values| R::from_values(&values)).transpose()
}

/// Single-integer query (COUNT and friends).
pub async fn select_count(db: &Database, sql: String) -> Result<i64, TypeliteError> {
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(&sql, [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use typelite_core::{Column, ColumnType, Schema};

    #[derive(Debug, Clone, PartialEq)]
    struct Pair {
        id: i64,
        label: String,
    }

    static PAIR_SCHEMA: Schema = Schema {
        table: "pairs",
        columns: &[
            Column {
                name: "id",
                ty: ColumnType::Integer,
                primary_key: true,
                not_null: true,
            },
            Column {
                name: "label",
                ty: ColumnType::Text,
                primary_key: false,
                not_null: true,
            },
        ],
    };

    impl Record for Pair {
        fn schema() -> &'static Schema {
            &PAIR_SCHEMA
        }

        fn to_values(&self) -> Vec<Value> {
            vec![Value::Integer(self.id), Value::Text(self.label.clone())]
        }

        fn from_values(values: &[Value]) -> Result<Self, TypeliteError> {
            match values {
                [Value::Integer(id), Value::Text(label)] => Ok(Self {
                    id: *id,
                    label: label.clone(),
                }),
                _ => Err(TypeliteError::Mapping("pair row shape mismatch".to_string())),
            }
        }
    }

    async fn pair_db(dir: &tempfile::TempDir) -> Database {
        let db = Database::open(&dir.path().join("pairs.db3")).await.unwrap();
        execute_ddl(&db, crate::sql::create_table(&PAIR_SCHEMA).unwrap())
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn execute_and_select_roundtrip() {
        let dir = tempdir().unwrap();
        let db = pair_db(&dir).await;

        let pair = Pair {
            id: 1,
            label: "first".to_string(),
        };
        let affected = execute(
            &db,
            crate::sql::insert(&PAIR_SCHEMA),
            pair.to_values(),
        )
        .await
        .unwrap();
        assert_eq!(affected, 1);

        let rows: Vec<Pair> =
            select_records(&db, crate::sql::select_all(&PAIR_SCHEMA), Vec::new())
                .await
                .unwrap();
        assert_eq!(rows, vec![pair]);
    }

    #[tokio::test]
    async fn select_record_none_on_miss() {
        let dir = tempdir().unwrap();
        let db = pair_db(&dir).await;

        let found: Option<Pair> = select_record(
            &db,
            crate::sql::select_by_key(&PAIR_SCHEMA).unwrap(),
            vec![Value::Integer(42)],
        )
        .await
        .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn select_count_counts_rows() {
        let dir = tempdir().unwrap();
        let db = pair_db(&dir).await;

        for i in 0..3 {
            let pair = Pair {
                id: i,
                label: format!("p{i}"),
            };
            execute(&db, crate::sql::insert(&PAIR_SCHEMA), pair.to_values())
                .await
                .unwrap();
        }
        let n = select_count(&db, crate::sql::count(&PAIR_SCHEMA))
            .await
            .unwrap();
        assert_eq!(n, 3);
    }

    #[tokio::test]
    async fn constraint_violation_surfaces_as_storage_error() {
        let dir = tempdir().unwrap();
        let db = pair_db(&dir).await;

        let pair = Pair {
            id: 7,
            label: "dup".to_string(),
        };
        execute(&db, crate::sql::insert(&PAIR_SCHEMA), pair.to_values())
            .await
            .unwrap();
        let result = execute(&db, crate::sql::insert(&PAIR_SCHEMA), pair.to_values()).await;
        assert!(matches!(result, Err(TypeliteError::Storage { .. })));
    }
}
