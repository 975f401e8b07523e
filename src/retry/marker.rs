//! Retry markers
//!
//! A coordinator records "this request was already retried for my reason" by
//! setting a boolean marker on the request descriptor. The marker key is
//! derived from the coordinator tag, so coordinators with different tags never
//! observe each other's markers.

use std::collections::BTreeSet;

/// Marker key for a coordinator tag.
pub fn marker_key(tag: &str) -> String {
    format!("_retry{tag}")
}

/// Request descriptors that can carry retry markers.
pub trait RetryMarker {
    /// Whether the marker `key` is set.
    fn has_marker(&self, key: &str) -> bool;

    /// Set the marker `key`. Setting an already present marker is a no-op.
    fn set_marker(&mut self, key: &str);
}

/// A set of retry markers that descriptor types can embed and delegate to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryMarks {
    keys: BTreeSet<String>,
}

impl RetryMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Iterate over the set marker keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl RetryMarker for RetryMarks {
    fn has_marker(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn set_marker(&mut self, key: &str) {
        if !self.keys.contains(key) {
            self.keys.insert(key.to_string());
        }
    }
}

/// Loosely typed request configs (e.g. JSON request options) store markers as
/// `"_retry<tag>": true` entries.
impl RetryMarker for serde_json::Map<String, serde_json::Value> {
    fn has_marker(&self, key: &str) -> bool {
        self.get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    fn set_marker(&mut self, key: &str) {
        self.insert(key.to_string(), serde_json::Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_key_uses_tag() {
        assert_eq!(marker_key("auth"), "_retryauth");
        assert_ne!(marker_key("auth"), marker_key("csrf"));
    }

    #[test]
    fn test_marks_are_independent_per_key() {
        let mut marks = RetryMarks::new();
        assert!(marks.is_empty());

        marks.set_marker(&marker_key("auth"));
        marks.set_marker(&marker_key("auth"));
        assert_eq!(marks.len(), 1);
        assert!(marks.has_marker("_retryauth"));
        assert!(!marks.has_marker("_retrycsrf"));
    }

    #[test]
    fn test_json_map_markers() {
        let mut config = serde_json::Map::new();
        config.insert("_retryauth".into(), serde_json::json!(false));
        assert!(!config.has_marker("_retryauth"));

        config.set_marker("_retryauth");
        assert!(config.has_marker("_retryauth"));
        assert_eq!(config["_retryauth"], serde_json::json!(true));
    }
}
