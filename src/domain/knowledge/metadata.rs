//! Flat passage metadata.
//!
//! Vector stores only accept primitive metadata values, so everything that
//! enters a passage is flattened on the way in: lists become comma-joined
//! strings and nested objects become truncated JSON text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum list items kept when flattening a list.
const MAX_LIST_ITEMS: usize = 10;
/// Maximum characters kept when flattening a nested object.
const MAX_FLATTENED_CHARS: usize = 500;

/// Well-known metadata keys.
pub mod keys {
    pub const CATEGORY: &str = "category";
    pub const SUB_TYPE: &str = "sub_type";
    pub const KEYWORDS: &str = "keywords";
    pub const PROJECT_REF: &str = "project_ref";
    pub const EVIDENCE_TYPE: &str = "evidence_type";
    pub const TAXONOMY_SCORE: &str = "taxonomy_score";
    pub const CHUNK_ID: &str = "chunk_id";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const SOURCE: &str = "source";
    pub const SOURCE_TYPE: &str = "source_type";
    pub const CREATED_AT: &str = "created_at";
    pub const DOC_ID: &str = "doc_id";
    pub const PROJECT_TITLE: &str = "project_title";
    pub const PROJECT_SLUG: &str = "project_slug";
    pub const SECTION_HEADING: &str = "section_heading";
    pub const IS_SUMMARY: &str = "is_summary";
    pub const VERSION: &str = "version";
}

/// A primitive metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl MetadataValue {
    /// Flattens an arbitrary JSON value into a primitive.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => MetadataValue::Null,
            Value::Bool(b) => MetadataValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => MetadataValue::Int(i),
                None => MetadataValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => MetadataValue::Text(s.clone()),
            Value::Array(items) => MetadataValue::Text(
                items
                    .iter()
                    .take(MAX_LIST_ITEMS)
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Object(_) => {
                MetadataValue::Text(truncate_chars(&value.to_string(), MAX_FLATTENED_CHARS))
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Int(i) => Some(*i as f64),
            MetadataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text rendering for display and substring search. Null renders empty.
    pub fn render(&self) -> String {
        match self {
            MetadataValue::Bool(b) => b.to_string(),
            MetadataValue::Int(i) => i.to_string(),
            MetadataValue::Float(f) => f.to_string(),
            MetadataValue::Text(s) => s.clone(),
            MetadataValue::Null => String::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            MetadataValue::Bool(b) => Value::Bool(*b),
            MetadataValue::Int(i) => Value::from(*i),
            MetadataValue::Float(f) => Value::from(*f),
            MetadataValue::Text(s) => Value::String(s.clone()),
            MetadataValue::Null => Value::Null,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

/// Flat key/value metadata attached to a passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassageMetadata(BTreeMap<String, MetadataValue>);

impl PassageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds store-safe metadata from a JSON object, flattening nested values.
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .map(|(key, value)| (key.clone(), MetadataValue::from_json(value)))
                .collect(),
        )
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<MetadataValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Text value for a key, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    /// Rendered value for a key, empty when absent.
    pub fn rendered(&self, key: &str) -> String {
        self.get(key).map(MetadataValue::render).unwrap_or_default()
    }

    pub fn category(&self) -> Option<&str> {
        self.text(keys::CATEGORY).filter(|c| !c.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// Truncates to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_kept() {
        assert_eq!(MetadataValue::from_json(&json!("a")), MetadataValue::Text("a".into()));
        assert_eq!(MetadataValue::from_json(&json!(3)), MetadataValue::Int(3));
        assert_eq!(MetadataValue::from_json(&json!(1.5)), MetadataValue::Float(1.5));
        assert_eq!(MetadataValue::from_json(&json!(true)), MetadataValue::Bool(true));
        assert_eq!(MetadataValue::from_json(&json!(null)), MetadataValue::Null);
    }

    #[test]
    fn lists_are_joined_and_capped_at_ten() {
        let list: Vec<String> = (0..15).map(|i| format!("k{i}")).collect();
        let flattened = MetadataValue::from_json(&json!(list));
        let text = flattened.as_str().unwrap();
        assert!(text.starts_with("k0, k1"));
        assert!(text.ends_with("k9"));
        assert_eq!(text.split(", ").count(), 10);
    }

    #[test]
    fn nested_objects_become_truncated_json() {
        let big = "x".repeat(1000);
        let flattened = MetadataValue::from_json(&json!({"nested": big}));
        let text = flattened.as_str().unwrap();
        assert!(text.starts_with("{\"nested\""));
        assert_eq!(text.chars().count(), 500);
    }

    #[test]
    fn from_json_object_flattens_every_value() {
        let object = json!({
            "category": "Technical_Capability",
            "keywords": ["React", "Node.js"],
            "details": {"team": 4}
        });
        let metadata = PassageMetadata::from_json_object(object.as_object().unwrap());

        assert_eq!(metadata.category(), Some("Technical_Capability"));
        assert_eq!(metadata.text("keywords"), Some("React, Node.js"));
        assert_eq!(metadata.text("details"), Some("{\"team\":4}"));
    }

    #[test]
    fn blank_category_is_treated_as_missing() {
        let metadata = PassageMetadata::new().with(keys::CATEGORY, "  ");
        assert_eq!(metadata.category(), None);
    }

    #[test]
    fn metadata_serializes_as_flat_json() {
        let metadata = PassageMetadata::new()
            .with(keys::CATEGORY, "Domain_Expertise")
            .with(keys::CHUNK_ID, 2i64)
            .with(keys::TAXONOMY_SCORE, 1.0);
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["category"], "Domain_Expertise");
        assert_eq!(json["chunk_id"], 2);
        assert_eq!(json["taxonomy_score"], 1.0);

        let restored: PassageMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(restored, metadata);
    }

    #[test]
    fn render_handles_every_variant() {
        assert_eq!(MetadataValue::Null.render(), "");
        assert_eq!(MetadataValue::Int(7).render(), "7");
        assert_eq!(MetadataValue::Bool(false).render(), "false");
    }
}
