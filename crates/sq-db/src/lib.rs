//! sq-db - Database abstraction layer for sqerge
//!
//! This crate provides the `Database` trait the migration engine talks to
//! and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
pub use value::SqlValue;
