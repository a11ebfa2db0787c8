//! Error types for the statistics cache
//!
//! Provides unified error handling using thiserror. The cache itself never
//! fails its callers; these types live at the storage and HTTP seams.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors surfaced by the HTTP inspection API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (missing or expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == Storage Error Enum ==
/// Failures of the durable storage backing a persistent cache.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem read or write failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record could not be encoded or decoded
    #[error("Storage record is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the record would exceed the backend's quota
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Record key would resolve outside the storage location
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend cannot be used at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, CacheError>;
