//! Persistence layer: key-value blob stores.

mod schema;
mod blobs;
mod memory;

pub use schema::*;
pub use blobs::*;
pub use memory::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Durable key-value storage for opaque blobs.
///
/// Implementations must make a `put` visible to every later `get` on the
/// same store, including after the process restarts for durable backends.
pub trait BlobStore: Send {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> DbResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous blob.
    fn put(&mut self, key: &str, value: &[u8]) -> DbResult<()>;

    /// Remove the blob under `key`. Returns whether anything was removed.
    fn remove(&mut self, key: &str) -> DbResult<bool>;
}

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
}
