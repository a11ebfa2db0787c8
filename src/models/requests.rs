//! Request DTOs for the cache inspection API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for key generation (POST /keys)
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    /// Statistics dimension the key is prefixed with
    pub dimension: String,
    /// Flat parameter map; null values are ignored
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Use filter-key rules (drop empty strings, flatten arrays)
    #[serde(default)]
    pub flatten: bool,
}

impl KeyRequest {
    pub fn validate(&self) -> Option<String> {
        if self.dimension.is_empty() {
            return Some("Dimension cannot be empty".to_string());
        }
        None
    }
}

/// Shared key validation for path and body keys.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"total": 3}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value["total"], 3);
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: Value::Null,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_key() {
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH)).is_none());
    }

    #[test]
    fn test_key_request_defaults() {
        let req: KeyRequest = serde_json::from_str(r#"{"dimension": "shop"}"#).unwrap();
        assert!(req.params.is_empty());
        assert!(!req.flatten);
        assert!(req.validate().is_none());
    }
}
