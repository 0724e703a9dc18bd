//! Database row types. These map directly to SQLite rows and convert into
//! the registry-types models at the crate boundary.
use chrono::{NaiveDate, NaiveDateTime};
use registry_types::models::AccountRecord;

pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub password: String,
    pub birthday: NaiveDate,
    pub tempban: NaiveDateTime,
}

impl From<AccountRow> for AccountRecord {
    fn from(row: AccountRow) -> Self {
        AccountRecord {
            id: row.id,
            name: row.name,
            password_hash: row.password,
            birthday: row.birthday,
            tempban: row.tempban,
        }
    }
}
