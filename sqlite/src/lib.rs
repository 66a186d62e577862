//! SQLite storage backend for inferred models.
//!
//! Turns the ordered models of a
//! [`ModelPackage`](xsd_model_core::ModelPackage) into SQLite tables: one
//! table per model, typed columns, foreign keys for reference fields and
//! indexes on relation columns.
//!
//! # Architecture
//!
//! - **`schema`**: SQL generation with customizable table prefixes
//! - **`migration`**: lifecycle operations (up/down/refresh/status)
//!
//! # Quick start
//!
//! ```
//! use rusqlite::Connection;
//! use xsd_model_core::{FieldSpec, Model, ScalarType};
//! use xsd_model_sqlite::Migration;
//!
//! let models = vec![
//!     Model::enumeration("Type"),
//!     Model::record("Move")
//!         .with_field(FieldSpec::scalar("name", ScalarType::string(500)))
//!         .with_field(FieldSpec::reference("type", "Type")),
//! ];
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let mut migration = Migration::new(conn, "pk_", models).unwrap();
//! migration.up().unwrap();
//!
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist());
//! assert_eq!(status.tables.len(), 2);
//! ```
//!
//! # Table prefix customization
//!
//! All table and index names are prefixed with a configurable string,
//! allowing multiple isolated model sets within the same SQLite database.
//! Prefixes must contain only alphanumeric characters and underscores.

mod error;
mod migration;
mod schema;

pub use error::{Result, SqliteError};
pub use migration::{Migration, MigrationStatus, TableStatus};
pub use schema::{column_name, generate_drop_sql, generate_schema_sql, generate_table_sql, table_name};
