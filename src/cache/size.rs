//! Size Estimation Module
//!
//! Pluggable strategies for estimating the byte footprint of cached values.

use serde::Serialize;
use tracing::debug;

/// Fallback size used when a value cannot be measured.
pub const DEFAULT_ENTRY_SIZE: usize = 1024;

/// Bytes charged per serialized character (UTF-16 code unit width).
pub const BYTES_PER_CHAR: usize = 2;

/// Estimates how much memory a cached value occupies.
///
/// The figure is an approximation used for the memory ceiling only. It
/// should reflect the "largest" part of a value, not its exact layout.
pub trait SizeEstimator<V>: Send + Sync {
    fn estimate_bytes(&self, value: &V) -> usize;
}

// == JSON Size Estimator ==
/// Charges `BYTES_PER_CHAR` per character of the value's JSON encoding.
///
/// Values that fail to serialize are charged `DEFAULT_ENTRY_SIZE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSizeEstimator;

impl<V: Serialize> SizeEstimator<V> for JsonSizeEstimator {
    fn estimate_bytes(&self, value: &V) -> usize {
        match serde_json::to_string(value) {
            Ok(json) => json.chars().count() * BYTES_PER_CHAR,
            Err(err) => {
                debug!("Size estimation fell back to default: {}", err);
                DEFAULT_ENTRY_SIZE
            }
        }
    }
}

// == Fixed Size Estimator ==
/// Charges every value the same amount. Useful when payloads are uniform
/// or too expensive to serialize just for accounting.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeEstimator(pub usize);

impl<V> SizeEstimator<V> for FixedSizeEstimator {
    fn estimate_bytes(&self, _value: &V) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_json_estimate_doubles_length() {
        // {"v":1} is 7 characters
        assert_eq!(JsonSizeEstimator.estimate_bytes(&json!({"v": 1})), 14);
    }

    #[test]
    fn test_json_estimate_counts_chars_not_bytes() {
        // "é" encodes as 3 characters including quotes
        assert_eq!(JsonSizeEstimator.estimate_bytes(&"é".to_string()), 6);
    }

    #[test]
    fn test_serialization_failure_falls_back() {
        assert_eq!(
            JsonSizeEstimator.estimate_bytes(&Unserializable),
            DEFAULT_ENTRY_SIZE
        );
    }

    #[test]
    fn test_fixed_estimator() {
        let estimator = FixedSizeEstimator(99);
        assert_eq!(estimator.estimate_bytes(&"anything"), 99);
    }
}
