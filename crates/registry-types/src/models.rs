use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 13;

/// A stored account. The password hash is opaque; its format tells
/// bcrypt and legacy SHA-512 apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub birthday: NaiveDate,
    pub tempban: NaiveDateTime,
}

/// Birthday assigned to every new account.
pub fn default_birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2005, 5, 11).unwrap_or_default()
}

/// Tempban sentinel meaning "not banned".
pub fn default_tempban() -> NaiveDateTime {
    default_birthday().and_time(NaiveTime::MIN)
}
