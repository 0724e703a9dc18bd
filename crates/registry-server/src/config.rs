use std::path::PathBuf;

use anyhow::{Context, Result};

/// Server settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub handbook_path: PathBuf,
    /// `true` hashes new credentials with bcrypt, `false` with legacy SHA-512.
    pub bcrypt_migration: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("REGISTRY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("REGISTRY_PORT")
            .unwrap_or_else(|_| "8585".into())
            .parse()
            .context("REGISTRY_PORT must be a port number")?;
        let db_path: PathBuf = std::env::var("REGISTRY_DB_PATH")
            .unwrap_or_else(|_| "registry.db".into())
            .into();
        let handbook_path: PathBuf = std::env::var("REGISTRY_HANDBOOK_PATH")
            .unwrap_or_else(|_| "handbook/json/Map.json".into())
            .into();

        Ok(Self {
            host,
            port,
            db_path,
            handbook_path,
            bcrypt_migration: bcrypt_migration_from_env()?,
        })
    }
}

/// Read `REGISTRY_BCRYPT_MIGRATION`. Unset means bcrypt.
pub fn bcrypt_migration_from_env() -> Result<bool> {
    match std::env::var("REGISTRY_BCRYPT_MIGRATION") {
        Ok(value) => parse_bool(&value)
            .with_context(|| format!("REGISTRY_BCRYPT_MIGRATION: expected true/false, got {:?}", value)),
        Err(_) => Ok(true),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
