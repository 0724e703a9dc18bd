use rusqlite::{Connection, ErrorCode};
use tracing::debug;

use registry_types::models::{AccountRecord, default_birthday, default_tempban};

use crate::models::AccountRow;
use crate::{Database, StoreError};

/// Returned by `insert_account` when the store produced no row id.
pub const NO_ID: i64 = -1;

impl Database {
    // -- Accounts --

    pub fn account_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| account_exists(conn, name))
    }

    pub fn insert_account(&self, name: &str, password_hash: &str) -> Result<i64, StoreError> {
        self.with_conn(|conn| insert_account(conn, name, password_hash))
    }

    /// Existence check then insert, on one connection.
    ///
    /// The check is only a fast path. Two racing requests can both pass
    /// it, so a UNIQUE violation on insert is also reported as `Conflict`.
    pub fn register_account(&self, name: &str, password_hash: &str) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            if account_exists(conn, name)? {
                return Err(StoreError::Conflict);
            }
            insert_account(conn, name, password_hash)
        })
    }

    pub fn count_accounts_named(&self, name: &str) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM accounts WHERE name = ?1",
                [name],
                |row| row.get(0),
            )?)
        })
    }

    pub fn get_account_by_name(&self, name: &str) -> Result<Option<AccountRecord>, StoreError> {
        self.with_conn(|conn| query_account_by_name(conn, name))
    }
}

/// Exact, case-sensitive point lookup.
pub fn account_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found = conn
        .query_row("SELECT 1 FROM accounts WHERE name = ?1 LIMIT 1", [name], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Insert with default birthday and tempban. Returns the generated id,
/// or `NO_ID` if the store produced none.
pub fn insert_account(conn: &Connection, name: &str, password_hash: &str) -> Result<i64, StoreError> {
    let id: Option<i64> = conn
        .query_row(
            "INSERT INTO accounts (name, password, birthday, tempban) VALUES (?1, ?2, ?3, ?4) RETURNING id",
            rusqlite::params![name, password_hash, default_birthday(), default_tempban()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| match e {
            StoreError::Storage(ref inner) if is_unique_violation(inner) => StoreError::Conflict,
            other => other,
        })?;

    let id = id.unwrap_or(NO_ID);
    debug!(account_id = id, "Inserted account");
    Ok(id)
}

fn query_account_by_name(conn: &Connection, name: &str) -> Result<Option<AccountRecord>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT id, name, password, birthday, tempban FROM accounts WHERE name = ?1")?;

    let row = stmt
        .query_row([name], |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                name: row.get(1)?,
                password: row.get(2)?,
                birthday: row.get(3)?,
                tempban: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row.map(AccountRecord::from))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
