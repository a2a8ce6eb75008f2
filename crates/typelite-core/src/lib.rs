// SPDX-FileCopyrightText: 2026 Typelite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for typelite, a per-type embedded SQLite store.
//!
//! This crate provides the error type and the record mapping contract shared
//! across the typelite workspace. The storage crate consumes the [`Record`]
//! trait as an opaque seam: it never inspects record fields itself, it only
//! works with the declared [`Schema`] and the [`Value`] cells a record
//! produces and parses.

pub mod error;
pub mod record;

pub use error::TypeliteError;
pub use record::{Column, ColumnType, Record, Schema, Value, type_key};
