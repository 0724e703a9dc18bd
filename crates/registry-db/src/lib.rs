pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures surfaced by the account store.
///
/// `Storage` deliberately carries no structure callers can branch on;
/// the detail is for logs only.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account name already taken")]
    Conflict,
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Handle to the accounts database.
///
/// Holds no open connection. Each request gets its own short-lived
/// connection, closed when it goes out of scope.
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so readers don't block the writer
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Open a connection scoped to one unit of work.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Run `f` on a fresh connection. The connection is dropped on every
    /// exit path, including errors.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.connect()?;
        f(&conn)
    }
}
