//! Shared type definitions for anydb
//!
//! This crate provides the types every other anydb crate agrees on:
//!
//! - [`Dialect`] - Database dialect enum (SQLite, PostgreSQL, MySQL)
//! - [`Value`] - Dynamically typed statement parameter / column value
//!
//! # Features
//!
//! - `rusqlite` - `ToSql`/`FromSql` for [`Value`]
//! - `postgres` - `postgres_types::ToSql` for [`Value`]

mod dialect;
mod value;

pub use dialect::{Dialect, DialectParseError, dialect_name};
pub use value::Value;

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::Dialect;
    pub use crate::Value;
}
