//! Migration lifecycle operations for model tables.
//!
//! Provides [`Migration`] for creating, dropping and refreshing the tables
//! of a model set. All mutation operations use transactions to ensure
//! atomicity.
//!
//! # Example
//!
//! ```no_run
//! use rusqlite::Connection;
//! use xsd_model_core::ModelPackage;
//! use xsd_model_sqlite::Migration;
//!
//! let package: ModelPackage =
//!     serde_json::from_str(&std::fs::read_to_string("models.json").unwrap()).unwrap();
//!
//! let conn = Connection::open("pokedex.db").unwrap();
//! let mut migration = Migration::from_package(conn, "pk_", &package).unwrap();
//!
//! // Create tables
//! migration.up().unwrap();
//!
//! // Check status
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist());
//!
//! // Drop and recreate
//! migration.refresh().unwrap();
//! ```

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};
use xsd_model_core::{Model, ModelPackage};

use crate::error::{Result, SqliteError};
use crate::schema::{generate_drop_sql, generate_schema_sql, table_name, validate_models, validate_prefix};

/// Manages the lifecycle of the tables for one model set.
///
/// Provides operations to create tables ([`up`](Self::up)), drop them
/// ([`down`](Self::down)), recreate them ([`refresh`](Self::refresh)), and
/// check the current state ([`status`](Self::status)).
pub struct Migration {
    conn: Connection,
    prefix: String,
    models: Vec<Model>,
}

impl Migration {
    /// Creates a migration manager for the given connection, table prefix and
    /// models.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`] if the prefix contains invalid
    /// characters, or [`SqliteError::InvalidModel`] if a class or field name
    /// cannot be used as an identifier.
    pub fn new(conn: Connection, prefix: impl Into<String>, models: Vec<Model>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        validate_models(&models)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            prefix,
            models,
        })
    }

    /// Creates a migration manager for every model of `package`.
    pub fn from_package(
        conn: Connection,
        prefix: impl Into<String>,
        package: &ModelPackage,
    ) -> Result<Self> {
        Self::new(conn, prefix, package.models.clone())
    }

    /// Creates all model tables and indexes.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    /// Executes within a transaction for atomicity.
    pub fn up(&mut self) -> Result<()> {
        let sql = generate_schema_sql(&self.prefix, &self.models)?;
        debug!(prefix = %self.prefix, "Creating model tables");
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, tables = self.models.len(), "Migration up");
        Ok(())
    }

    /// Drops all model tables in reverse model order.
    ///
    /// Uses `DROP TABLE IF EXISTS` so it is safe to call even if tables
    /// do not exist. Executes within a transaction for atomicity.
    pub fn down(&mut self) -> Result<()> {
        let sql = generate_drop_sql(&self.prefix, &self.models)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, tables = self.models.len(), "Migration down");
        Ok(())
    }

    /// Drops and recreates all model tables.
    pub fn refresh(&mut self) -> Result<()> {
        self.down()?;
        self.up()
    }

    /// Returns whether each model table exists and how many rows it holds.
    pub fn status(&self) -> Result<MigrationStatus> {
        let mut tables = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let table = table_name(&self.prefix, &model.class_name);
            let exists = self.table_exists(&table)?;
            let row_count = if exists { self.count_rows(&table)? } else { 0 };
            tables.push(TableStatus {
                class_name: model.class_name.clone(),
                table,
                exists,
                row_count,
            });
        }
        Ok(MigrationStatus {
            prefix: self.prefix.clone(),
            tables,
        })
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1")?;
        let count: i64 = stmt.query_row([table], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT COUNT(*) FROM \"{table}\""))?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// State of one model table.
#[derive(Debug, Clone, Serialize)]
pub struct TableStatus {
    pub class_name: String,
    pub table: String,
    pub exists: bool,
    pub row_count: usize,
}

/// Snapshot returned by [`Migration::status`].
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub prefix: String,
    /// One entry per model, in model order.
    pub tables: Vec<TableStatus>,
}

impl MigrationStatus {
    /// True when every model table exists.
    pub fn tables_exist(&self) -> bool {
        self.tables.iter().all(|t| t.exists)
    }

    pub fn existing_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.exists).count()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.row_count).sum()
    }
}
