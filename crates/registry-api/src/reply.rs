use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use registry_types::api::ErrorCode;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Serialize `body` as the whole response, with an explicit UTF-8 charset.
pub fn json_reply<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response(),
        Err(e) => {
            error!("Failed to serialize response body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Error responses are a bare JSON string, e.g. `"invalid_json"`.
pub fn error_reply(status: StatusCode, code: ErrorCode) -> Response {
    debug!(status = status.as_u16(), code = code.as_str(), "Request rejected");
    json_reply(status, &code)
}
