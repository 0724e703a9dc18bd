pub mod lookup;
pub mod register;
pub mod reply;

pub use registry_types::json;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::Response,
    routing::{any, get},
};

use registry_crypto::CredentialHasher;
use registry_db::Database;

use crate::lookup::Handbook;
use crate::reply::json_reply;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub hasher: CredentialHasher,
    pub handbook: Handbook,
}

/// All public routes. Layers (tracing etc.) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", any(register::register))
        .route("/maps/lookup", get(lookup::lookup_maps))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Response {
    json_reply(StatusCode::OK, &"ok")
}
