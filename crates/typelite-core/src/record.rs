// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record mapping contract: how a record type declares its table shape
//! and converts between field values and row cells.
//!
//! The storage crate treats implementations as opaque. It derives SQL from
//! the [`Schema`] and moves data through [`Value`] cells in schema column
//! order; everything else about a record stays with the implementor.

use crate::error::TypeliteError;

/// SQLite storage class for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    /// SQL type name used in table-creation statements.
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        }
    }
}

/// One column of a record's declared table shape.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Column name as it appears in the table.
    pub name: &'static str,
    /// Storage class of the column.
    pub ty: ColumnType,
    /// Whether this column is the table's primary key.
    pub primary_key: bool,
    /// Whether the column carries a NOT NULL constraint.
    pub not_null: bool,
}

/// Declared table shape for a record type.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Table name.
    pub table: &'static str,
    /// Columns in declaration order. Row cells follow this order everywhere.
    pub columns: &'static [Column],
}

impl Schema {
    /// The primary key column and its index, if one is declared.
    pub fn primary_key(&self) -> Option<(usize, &Column)> {
        self.columns.iter().enumerate().find(|(_, c)| c.primary_key)
    }
}

/// A single row cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Mapping contract between a record type and its table rows.
///
/// `to_values` and `from_values` must produce and consume cells in the exact
/// order of [`Schema::columns`]. Mapping failures are reported as
/// [`TypeliteError::Mapping`] and surface unmodified to the caller of the
/// storage operation that hit them.
pub trait Record: Sized + Send + 'static {
    /// The declared table shape for this type.
    fn schema() -> &'static Schema;

    /// Cell values for this record, in schema column order.
    fn to_values(&self) -> Vec<Value>;

    /// Rebuild a record from cell values in schema column order.
    fn from_values(values: &[Value]) -> Result<Self, TypeliteError>;
}

/// Stable process-unique identity key for a record type.
///
/// Two distinct types never share a key; one type always yields the same key
/// within a process. Connections, table-creation state, and the transient
/// creation locks are all partitioned by this key.
pub fn type_key<R: 'static>() -> &'static str {
    std::any::type_name::<R>()
}
