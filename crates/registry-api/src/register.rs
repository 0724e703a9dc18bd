use std::collections::HashMap;
use std::fmt;

use axum::{
    body,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::Response,
};
use http_body_util::LengthLimitError;
use tracing::{debug, error, info, warn};

use registry_db::StoreError;
use registry_types::api::{ErrorCode, RegisterResponse};
use registry_types::models::MAX_USERNAME_LEN;

use crate::AppState;
use crate::json::parse_flat_object;
use crate::reply::{error_reply, json_reply};

/// Largest request body accepted on `/register`.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Validated registration input. The password is plaintext and must not
/// reach logs, so `Debug` redacts it.
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RegistrationForm {
    /// Trim both fields (absent counts as empty) and check them.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ErrorCode> {
        let username = trim_to_empty(params.get("username"));
        let password = trim_to_empty(params.get("password"));

        if username.is_empty() || password.is_empty() {
            return Err(ErrorCode::MissingUsernameOrPassword);
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ErrorCode::UsernameTooLong);
        }

        Ok(Self { username, password })
    }
}

fn trim_to_empty(value: Option<&String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// `/register`: any method routes here so non-POST gets a JSON 405.
///
/// Steps, stopping at the first failure: method, body decode, field
/// validation, hash, existence check + insert.
pub async fn register(State(state): State<AppState>, req: Request) -> Response {
    // Method first, before any of the body is read
    if req.method() != Method::POST {
        return error_reply(StatusCode::METHOD_NOT_ALLOWED, ErrorCode::MethodNotAllowed);
    }

    let bytes = match body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let inner = e.into_inner();
            if inner.is::<LengthLimitError>() {
                return error_reply(StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::PayloadTooLarge);
            }
            debug!(error = %inner, "Failed to read request body");
            return error_reply(StatusCode::BAD_REQUEST, ErrorCode::InvalidJson);
        }
    };

    let payload = String::from_utf8_lossy(&bytes);
    let Some(params) = parse_flat_object(&payload) else {
        return error_reply(StatusCode::BAD_REQUEST, ErrorCode::InvalidJson);
    };

    let form = match RegistrationForm::from_params(&params) {
        Ok(form) => form,
        Err(code) => return error_reply(StatusCode::BAD_REQUEST, code),
    };
    let RegistrationForm { username, password } = form;

    // bcrypt at cost 12 is slow; keep it off the async workers
    let hasher = state.hasher.clone();
    let algorithm = hasher.algorithm();
    let hashed = tokio::task::spawn_blocking(move || hasher.hash_with(algorithm, &password)).await;
    let password_hash = match hashed {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => {
            error!(error = %e, "Credential hashing unavailable, check deployment");
            return error_reply(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError);
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            return error_reply(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError);
        }
    };

    // One short-lived connection for the check and the insert
    let name = username.clone();
    let stored =
        tokio::task::spawn_blocking(move || state.db.register_account(&name, &password_hash)).await;

    match stored {
        Ok(Ok(id)) => {
            info!(username = %username, account_id = id, algorithm = ?algorithm, "Account registered");
            json_reply(StatusCode::CREATED, &RegisterResponse { ok: true, id })
        }
        Ok(Err(StoreError::Conflict)) => {
            warn!(username = %username, "Registration rejected, username taken");
            error_reply(StatusCode::CONFLICT, ErrorCode::UsernameExists)
        }
        Ok(Err(StoreError::Storage(e))) => {
            error!(username = %username, error = %e, "Account insert failed");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::SqlError)
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
        }
    }
}
