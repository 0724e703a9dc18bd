use serde::{Deserialize, Serialize};

// -- Registration --

/// Body of a successful `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub id: i64,
}

/// Failure codes. Each one goes over the wire as a bare JSON string,
/// e.g. `"username_exists"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    MissingUsernameOrPassword,
    UsernameTooLong,
    MethodNotAllowed,
    PayloadTooLarge,
    UsernameExists,
    SqlError,
    /// Hash engine failure. A deployment defect, not bad input or bad data.
    InternalError,
    MissingQuery,
    HandbookUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::MissingUsernameOrPassword => "missing_username_or_password",
            Self::UsernameTooLong => "username_too_long",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::PayloadTooLarge => "payload_too_large",
            Self::UsernameExists => "username_exists",
            Self::SqlError => "sql_error",
            Self::InternalError => "internal_error",
            Self::MissingQuery => "missing_query",
            Self::HandbookUnavailable => "handbook_unavailable",
        }
    }
}

// -- Map lookup --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapHit {
    pub id: String,
    pub name: String,
}

/// `total` counts every match; `hits` is capped for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLookupResponse {
    pub total: usize,
    pub returned: usize,
    pub hits: Vec<MapHit>,
}
