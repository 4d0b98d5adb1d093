//! SQLite persistence backends

mod account;
mod note;
mod schema;
mod todo;

pub use account::SqliteAccountStore;
pub use note::SqliteNoteStore;
pub use schema::{SCHEMA_VERSION, init_schema};
pub use todo::SqliteTodoStore;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::CoreResult;

/// Shared connection handle.
///
/// One connection backs every store so foreign-key cascades (user -> token,
/// notes, lists -> items) span them; concurrent callers are serialized by
/// the mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

pub(crate) fn now_micros() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_micros() as i64
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
