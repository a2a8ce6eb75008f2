// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL statement generation from a record schema.
//!
//! Builders that key on the primary column fail with a schema error when the
//! shape declares none; the table-creation statement uses `IF NOT EXISTS`,
//! so re-running it after a process restart is an engine-level no-op.

use typelite_core::{Column, Schema, TypeliteError};

/// The primary key column, or a schema error naming the table.
pub(crate) fn require_primary_key(schema: &Schema) -> Result<(usize, &Column), TypeliteError> {
    schema.primary_key().ok_or_else(|| {
        TypeliteError::Schema(format!(
            "table {:?} has no primary key column",
            schema.table
        ))
    })
}

fn column_list(schema: &Schema) -> String {
    schema
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CREATE TABLE IF NOT EXISTS statement for the schema.
pub fn create_table(schema: &Schema) -> Result<String, TypeliteError> {
    if schema.columns.is_empty() {
        return Err(TypeliteError::Schema(format!(
            "table {:?} declares no columns",
            schema.table
        )));
    }
    let defs = schema
        .columns
        .iter()
        .map(|c| {
            let mut def = format!("\"{}\" {}", c.name, c.ty.sql_name());
            if c.primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if c.not_null {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
        schema.table, defs
    ))
}

/// INSERT statement binding every column in schema order.
pub fn insert(schema: &Schema) -> String {
    let placeholders = (1..=schema.columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        schema.table,
        column_list(schema),
        placeholders
    )
}

/// UPDATE of every non-key column, keyed by the primary column.
///
/// Parameter order: non-key columns in schema order, then the key value.
pub fn update(schema: &Schema) -> Result<String, TypeliteError> {
    let (_, pk) = require_primary_key(schema)?;
    let assignments = schema
        .columns
        .iter()
        .filter(|c| !c.primary_key)
        .enumerate()
        .map(|(i, c)| format!("\"{}\" = ?{}", c.name, i + 1))
        .collect::<Vec<_>>();
    if assignments.is_empty() {
        return Err(TypeliteError::Schema(format!(
            "table {:?} has no non-key columns to update",
            schema.table
        )));
    }
    let key_slot = assignments.len() + 1;
    Ok(format!(
        "UPDATE \"{}\" SET {} WHERE \"{}\" = ?{}",
        schema.table,
        assignments.join(", "),
        pk.name,
        key_slot
    ))
}

/// DELETE keyed by the primary column.
pub fn delete(schema: &Schema) -> Result<String, TypeliteError> {
    let (_, pk) = require_primary_key(schema)?;
    Ok(format!(
        "DELETE FROM \"{}\" WHERE \"{}\" = ?1",
        schema.table, pk.name
    ))
}

/// SELECT of every column in schema order, no filter, no implied ordering.
pub fn select_all(schema: &Schema) -> String {
    format!("SELECT {} FROM \"{}\"", column_list(schema), schema.table)
}

/// SELECT of one row keyed by the primary column.
pub fn select_by_key(schema: &Schema) -> Result<String, TypeliteError> {
    let (_, pk) = require_primary_key(schema)?;
    Ok(format!(
        "SELECT {} FROM \"{}\" WHERE \"{}\" = ?1",
        column_list(schema),
        schema.table,
        pk.name
    ))
}

/// COUNT of all rows.
pub fn count(schema: &Schema) -> String {
    format!("SELECT COUNT(*) FROM \"{}\"", schema.table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typelite_core::ColumnType;

    static PLAYERS: Schema = Schema {
        table: "players",
        columns: &[
            Column {
                name: "id",
                ty: ColumnType::Integer,
                primary_key: true,
                not_null: true,
            },
            Column {
                name: "name",
                ty: ColumnType::Text,
                primary_key: false,
                not_null: true,
            },
            Column {
                name: "score",
                ty: ColumnType::Integer,
                primary_key: false,
                not_null: false,
            },
        ],
    };

    static KEYLESS: Schema = Schema {
        table: "notes",
        columns: &[Column {
            name: "body",
            ty: ColumnType::Text,
            primary_key: false,
            not_null: false,
        }],
    };

    static EMPTY: Schema = Schema {
        table: "void",
        columns: &[],
    };

    #[test]
    fn create_table_statement() {
        assert_eq!(
            create_table(&PLAYERS).unwrap(),
            "CREATE TABLE IF NOT EXISTS \"players\" (\"id\" INTEGER PRIMARY KEY NOT NULL, \
             \"name\" TEXT NOT NULL, \"score\" INTEGER)"
        );
    }

    #[test]
    fn create_table_rejects_empty_schema() {
        assert!(matches!(
            create_table(&EMPTY),
            Err(TypeliteError::Schema(_))
        ));
    }

    #[test]
    fn insert_statement() {
        assert_eq!(
            insert(&PLAYERS),
            "INSERT INTO \"players\" (\"id\", \"name\", \"score\") VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn update_statement_keys_on_primary_column() {
        assert_eq!(
            update(&PLAYERS).unwrap(),
            "UPDATE \"players\" SET \"name\" = ?1, \"score\" = ?2 WHERE \"id\" = ?3"
        );
    }

    #[test]
    fn delete_statement_keys_on_primary_column() {
        assert_eq!(
            delete(&PLAYERS).unwrap(),
            "DELETE FROM \"players\" WHERE \"id\" = ?1"
        );
    }

    #[test]
    fn select_statements() {
        assert_eq!(
            select_all(&PLAYERS),
            "SELECT \"id\", \"name\", \"score\" FROM \"players\""
        );
        assert_eq!(
            select_by_key(&PLAYERS).unwrap(),
            "SELECT \"id\", \"name\", \"score\" FROM \"players\" WHERE \"id\" = ?1"
        );
        assert_eq!(count(&PLAYERS), "SELECT COUNT(*) FROM \"players\"");
    }

    #[test]
    fn keyed_builders_reject_keyless_schemas() {
        assert!(matches!(update(&KEYLESS), Err(TypeliteError::Schema(_))));
        assert!(matches!(delete(&KEYLESS), Err(TypeliteError::Schema(_))));
        assert!(matches!(
            select_by_key(&KEYLESS),
            Err(TypeliteError::Schema(_))
        ));
    }
}
