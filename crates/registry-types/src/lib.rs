pub mod api;
pub mod json;
pub mod models;
