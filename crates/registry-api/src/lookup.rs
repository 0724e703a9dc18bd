//! Map name lookup over the static handbook file.
//!
//! The handbook is loaded on first use and kept for the life of the
//! process. A failed load is not cached; the next lookup tries again.

use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, OnceLock};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use registry_types::api::{ErrorCode, MapHit, MapLookupResponse};

use crate::reply::{error_reply, json_reply};
use crate::AppState;

/// Most hits returned for one query.
pub const MAX_SEARCH_HITS: usize = 100;

/// One `"<id>": "<name>",` entry per line.
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"(\d+)"\s*:\s*"(.*)"\s*,?\s*$"#).expect("static pattern")
});

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to read handbook {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandbookItem {
    pub id: String,
    pub name: String,
}

impl HandbookItem {
    fn matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}

/// Result of a search: every match is counted, at most
/// `MAX_SEARCH_HITS` are kept.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub total: usize,
    pub hits: Vec<HandbookItem>,
}

/// Lazily loaded, read-only handbook.
pub struct Handbook {
    path: PathBuf,
    items: OnceLock<Vec<HandbookItem>>,
    load_lock: Mutex<()>,
}

impl Handbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Case-insensitive substring search over map names. Blank queries
    /// match nothing.
    pub fn search(&self, query: &str) -> Result<SearchResult, LookupError> {
        let items = self.items()?;
        if query.trim().is_empty() {
            return Ok(SearchResult { total: 0, hits: vec![] });
        }

        let needle = query.to_lowercase();
        let mut total = 0;
        let mut hits = Vec::new();
        for item in items.iter().filter(|item| item.matches(&needle)) {
            total += 1;
            if hits.len() < MAX_SEARCH_HITS {
                hits.push(item.clone());
            }
        }
        Ok(SearchResult { total, hits })
    }

    fn items(&self) -> Result<&[HandbookItem], LookupError> {
        if let Some(items) = self.items.get() {
            return Ok(items);
        }

        // Only one caller reads the file; the rest wait and reuse it.
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(items) = self.items.get() {
            return Ok(items);
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|source| LookupError::Read {
            path: self.path.clone(),
            source,
        })?;
        let parsed = parse_handbook(&contents);
        info!("Loaded {} map entries from {}", parsed.len(), self.path.display());
        Ok(self.items.get_or_init(|| parsed))
    }
}

fn parse_handbook(contents: &str) -> Vec<HandbookItem> {
    contents.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<HandbookItem> {
    let trimmed = line.trim();
    if trimmed == "{" || trimmed == "}" {
        return None;
    }

    let caps = ENTRY_PATTERN.captures(line)?;
    let name = caps[2].replace("\\\"", "\"").replace("\\\\", "\\");
    Some(HandbookItem {
        id: caps[1].to_string(),
        name,
    })
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub q: Option<String>,
}

/// GET /maps/lookup?q=<text>
pub async fn lookup_maps(State(state): State<AppState>, Query(query): Query<LookupQuery>) -> Response {
    let q = query.q.unwrap_or_default();
    if q.trim().is_empty() {
        return error_reply(StatusCode::BAD_REQUEST, ErrorCode::MissingQuery);
    }

    // First call reads the file from disk
    let result = tokio::task::spawn_blocking(move || state.handbook.search(&q)).await;

    match result {
        Ok(Ok(found)) => {
            let hits: Vec<MapHit> = found
                .hits
                .into_iter()
                .map(|item| MapHit { id: item.id, name: item.name })
                .collect();
            json_reply(
                StatusCode::OK,
                &MapLookupResponse {
                    total: found.total,
                    returned: hits.len(),
                    hits,
                },
            )
        }
        Ok(Err(e)) => {
            error!(error = %e, "Map lookup failed");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::HandbookUnavailable)
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
        }
    }
}
