//! SQLite storage for groups, subscriptions, articles and users
//!
//! [`Store`] is an explicitly constructed handle, cheap to clone, shared by
//! backends (writers) and server sessions (readers). Every operation takes
//! the connection lock for the duration of one statement or transaction.

mod articles;
mod groups;
mod schema;
mod users;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Shared handle to the relay database
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open or create a database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        debug!("Opening database {}", path.as_ref().display());
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// SQLite `LIMIT` value; negative means unbounded
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX))
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
