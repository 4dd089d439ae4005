//! Database layer for the clinic front desk.

mod schema;
mod catalog;
mod patients;
mod expenses;

pub use schema::*;
#[allow(unused_imports)]
pub use catalog::*;
#[allow(unused_imports)]
pub use patients::*;
#[allow(unused_imports)]
pub use expenses::*;

use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid decimal value: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("invalid date value: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction holding the database lock from the start.
    ///
    /// Queue-number assignment must run inside one of these so the
    /// read-modify-write on the per-day counter is serialized.
    pub fn immediate_transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"body_parts".to_string()));
        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"patient_body_parts".to_string()));
        assert!(tables.contains(&"queue_counters".to_string()));
        assert!(tables.contains(&"expenses".to_string()));
    }
}
