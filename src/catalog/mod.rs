//! Catalog module for schema management.
//!
//! The catalog holds the table schemas the planner resolves column
//! references against. It is read-only for the duration of planning.

mod manager;
mod schema;
mod types;

pub use manager::Catalog;
pub use schema::{SchemaError, TableRef, TableSchema};
pub use types::{ColumnDef, DataType};
