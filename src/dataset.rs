//! Dataset model and JSON loader
//!
//! The input document maps sequence keys to annotation lists:
//! `{ "<seq_key>": { "annotations": [ { "seg_id", "text", "<embedding_key>": [x, y], ... } ] } }`
//!
//! Sequences are held in a BTreeMap so iteration order is lexicographic by
//! key, giving the transform a deterministic scan order across environments.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Segment-id prefix marking a BABEL annotation
pub const BABEL_PREFIX: &str = "babel_";
/// Segment-id prefix marking a HumanML3D annotation
pub const HUMANML3D_PREFIX: &str = "humanml3d_";

#[derive(Error, Debug)]
pub enum VizError {
    #[error("Invalid input data: {0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Full dataset: sequence key -> Sequence, iterated in key order
pub type Dataset = BTreeMap<String, Sequence>;

/// A named group of annotations sharing one source clip
#[derive(Debug, Clone, Deserialize)]
pub struct Sequence {
    pub annotations: Vec<Annotation>,
}

/// One textual description tied to a segment
///
/// Embedding fields are model-qualified keys (`clip_embedding_2d`, ...) and
/// vary per dataset, so they are captured through the flattened `extra` map
/// and read by key at transform time.
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub seg_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Annotation {
    /// True if this annotation's seg_id carries the given corpus prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.seg_id.as_deref().is_some_and(|id| id.starts_with(prefix))
    }

    /// Read the 2D coordinate stored under `embedding_key`
    ///
    /// Returns None when the field is absent, is not a two-element numeric
    /// array, or holds a non-finite value. Callers skip such annotations.
    pub fn embedding(&self, embedding_key: &str) -> Option<[f64; 2]> {
        let arr = self.extra.get(embedding_key)?.as_array()?;
        if arr.len() != 2 {
            return None;
        }
        let x = arr[0].as_f64()?;
        let y = arr[1].as_f64()?;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some([x, y])
    }
}

/// Load a dataset from a JSON file
///
/// Fails fast with `InvalidInput` when the document is not an object of
/// sequences; no partial result is returned.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, VizError> {
    let content = std::fs::read_to_string(&path)?;
    parse_dataset(&content)
}

/// Parse a dataset from a JSON string
pub fn parse_dataset(content: &str) -> Result<Dataset, VizError> {
    serde_json::from_str(content).map_err(|e| VizError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_dataset() {
        let json = r#"{
            "seq_a": { "annotations": [
                { "seg_id": "babel_1", "text": "walk", "clip_embedding_2d": [0.5, -1.0] }
            ]}
        }"#;
        let ds = parse_dataset(json).unwrap();
        assert_eq!(ds.len(), 1);
        let ann = &ds["seq_a"].annotations[0];
        assert!(ann.has_prefix(BABEL_PREFIX));
        assert_eq!(ann.embedding("clip_embedding_2d"), Some([0.5, -1.0]));
    }

    #[test]
    fn test_non_object_input_is_invalid() {
        let err = parse_dataset("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, VizError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_seg_id_matches_neither_corpus() {
        let json = r#"{ "s": { "annotations": [ { "text": "orphan" } ] } }"#;
        let ds = parse_dataset(json).unwrap();
        let ann = &ds["s"].annotations[0];
        assert!(!ann.has_prefix(BABEL_PREFIX));
        assert!(!ann.has_prefix(HUMANML3D_PREFIX));
    }

    #[test]
    fn test_embedding_rejects_wrong_arity_and_non_numbers() {
        let json = r#"{ "s": { "annotations": [
            { "seg_id": "humanml3d_1", "text": "a", "k1": [1.0], "k2": [1.0, 2.0, 3.0], "k3": ["x", "y"] }
        ]}}"#;
        let ds = parse_dataset(json).unwrap();
        let ann = &ds["s"].annotations[0];
        assert_eq!(ann.embedding("k1"), None);
        assert_eq!(ann.embedding("k2"), None);
        assert_eq!(ann.embedding("k3"), None);
        assert_eq!(ann.embedding("absent"), None);
    }

    #[test]
    fn test_sequences_iterate_in_key_order() {
        let json = r#"{
            "zzz": { "annotations": [] },
            "aaa": { "annotations": [] },
            "mmm": { "annotations": [] }
        }"#;
        let ds = parse_dataset(json).unwrap();
        let keys: Vec<&str> = ds.keys().map(String::as_str).collect();
        assert_eq!(keys, ["aaa", "mmm", "zzz"]);
    }
}
