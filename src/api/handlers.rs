//! API Handlers
//!
//! HTTP request handlers for each cache inspection endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheStats, CacheStore, FileStorage, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::keys::{generate_filter_key, generate_stats_key};
use crate::models::{
    validate_key, ClearResponse, DeleteResponse, GetResponse, HealthResponse, KeyRequest,
    KeyResponse, SetRequest, SetResponse,
};
use crate::tasks::{sweep_once, SweepReport};

/// Application state shared across all handlers.
///
/// Holds the injected cache store; handlers never reach for a global.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: SharedCache,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore<Value>) -> Self {
        Self {
            cache: cache.into_shared(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Persisted records live under `storage_dir` when persistence is on.
    pub fn from_config(config: &Config) -> Self {
        let cache = CacheStore::builder(config.cache.clone())
            .storage(FileStorage::new(&config.storage_dir))
            .build();
        Self::new(cache)
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value. Oversized values are reported, not rejected.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let stored = state.cache.write().await.set(req.key.clone(), req.value);

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a hit updates recency and access counts
    let value = state.cache.write().await.get(&key);

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.write().await.delete(&key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.len();
    cache.clear();

    Json(ClearResponse { removed })
}

/// Handler for DELETE /clear/:pattern
///
/// Removes every key containing `pattern` as a literal substring.
pub async fn clear_pattern_handler(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<Json<ClearResponse>> {
    if let Some(error_msg) = validate_key(&pattern) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.cache.write().await.clear_by_pattern(&pattern);
    Ok(Json(ClearResponse { removed }))
}

/// Handler for POST /cleanup
///
/// Runs one sweep immediately instead of waiting for the background task.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<SweepReport> {
    let mut cache = state.cache.write().await;
    Json(sweep_once(&mut *cache))
}

/// Handler for POST /keys
///
/// Builds the canonical cache key for a dimension and parameter set.
pub async fn key_handler(Json(req): Json<KeyRequest>) -> Result<Json<KeyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = if req.flatten {
        generate_filter_key(&req.dimension, req.params)
    } else {
        generate_stats_key(&req.dimension, req.params)
    };

    Ok(Json(KeyResponse { key }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    // Read lock: stats never remove entries
    Json(state.cache.read().await.get_stats())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
