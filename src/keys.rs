//! Cache Key Generation
//!
//! Canonical, order-independent keys built from a statistics dimension and
//! a flat parameter set. Equivalent parameter sets always produce the same
//! key no matter the order they are supplied in.

use std::collections::BTreeMap;

use serde_json::Value;

/// Separates the dimension and each `name:value` pair.
pub const KEY_DELIMITER: &str = "_";

/// Builds a key like `shop_from:2024-01-01_shopId:42`.
///
/// Parameters whose value is `None` or JSON `null` are dropped, so passing
/// an absent parameter is the same as leaving it out. Strings render
/// without quotes; arrays and objects render as compact JSON.
pub fn generate_stats_key<I, K, V>(dimension: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Option<Value>>,
{
    build_key(dimension, params, |value| match value {
        Value::Null => None,
        other => Some(render(other)),
    })
}

/// Like [`generate_stats_key`], but also drops empty strings and flattens
/// arrays into comma-joined elements. Element order is kept as given.
pub fn generate_filter_key<I, K, V>(dimension: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Option<Value>>,
{
    build_key(dimension, params, |value| match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(render)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(render(other)),
    })
}

fn build_key<I, K, V, F>(dimension: &str, params: I, render_value: F) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Option<Value>>,
    F: Fn(&Value) -> Option<String>,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .filter_map(|(name, value)| {
            let value: Option<Value> = value.into();
            render_value(&value?).map(|rendered| (name.into(), rendered))
        })
        .collect();

    if sorted.is_empty() {
        return dimension.to_string();
    }

    let pairs: Vec<String> = sorted
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect();
    format!("{}{}{}", dimension, KEY_DELIMITER, pairs.join(KEY_DELIMITER))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
