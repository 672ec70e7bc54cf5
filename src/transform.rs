//! Annotation Transform - flattens the nested dataset into plottable points
//!
//! Each emitted point is one HumanML3D annotation with a 2D embedding
//! coordinate plus a snapshot of every BABEL caption from the same sequence.
//! Emission stops as soon as `cap` points exist; sequences after that are
//! never visited, so the cap acts as a scan bound for large datasets.

use crate::dataset::{Dataset, BABEL_PREFIX, HUMANML3D_PREFIX};

/// One plotted annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// HumanML3D caption for this point
    pub text: String,
    /// BABEL captions from the same sequence, in annotation order.
    /// Snapshot copy: shares no storage with other points.
    pub labels: Vec<String>,
}

/// Transform output: points plus the caption lists that drive the selectors
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub points: Vec<Point>,
    /// All BABEL captions from visited sequences, deduplicated, first-seen order
    pub babel_texts: Vec<String>,
    /// Captions of emitted points, deduplicated, first-seen order
    pub humanml3d_texts: Vec<String>,
}

/// Deduplicating accumulator preserving first-encounter order
#[derive(Debug, Default)]
struct OrderedSet {
    seen: std::collections::HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, text: &str) {
        if self.seen.insert(text.to_string()) {
            self.items.push(text.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Flatten a dataset into at most `cap` points
///
/// Sequences are scanned in dataset order (lexicographic key order). Within
/// a sequence the BABEL captions are collected in full before any point is
/// emitted, so every point in that sequence carries the complete label list
/// even when a BABEL annotation appears after a HumanML3D one. Annotations
/// without the embedding field are skipped and do not count against the cap.
///
/// A sequence straddling the cap boundary still contributes all of its BABEL
/// captions to `babel_texts`; sequences past the early exit contribute
/// nothing.
pub fn transform(dataset: &Dataset, cap: usize, embedding_key: &str) -> TransformOutput {
    let mut points: Vec<Point> = Vec::with_capacity(cap.min(4096));
    let mut babel_texts = OrderedSet::default();
    let mut humanml3d_texts = OrderedSet::default();

    for (seq_key, sequence) in dataset {
        if points.len() >= cap {
            break;
        }

        // First pass: the full BABEL caption list for this sequence
        let mut babel_in_sequence: Vec<String> = Vec::new();
        for annotation in &sequence.annotations {
            if annotation.has_prefix(BABEL_PREFIX) {
                babel_texts.insert(&annotation.text);
                babel_in_sequence.push(annotation.text.clone());
            }
        }

        // Second pass: emit a point per HumanML3D annotation with a coordinate
        for annotation in &sequence.annotations {
            if points.len() >= cap {
                break;
            }
            if !annotation.has_prefix(HUMANML3D_PREFIX) {
                continue;
            }
            let Some([x, y]) = annotation.embedding(embedding_key) else {
                tracing::debug!(
                    "Skipping annotation without '{}' in sequence '{}'",
                    embedding_key,
                    seq_key
                );
                continue;
            };
            humanml3d_texts.insert(&annotation.text);
            points.push(Point {
                x,
                y,
                text: annotation.text.clone(),
                labels: babel_in_sequence.clone(),
            });
        }
    }

    tracing::debug!(
        "Transform produced {} points, {} babel captions, {} humanml3d captions",
        points.len(),
        babel_texts.items.len(),
        humanml3d_texts.items.len()
    );

    TransformOutput {
        points,
        babel_texts: babel_texts.into_vec(),
        humanml3d_texts: humanml3d_texts.into_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_dataset;

    const KEY: &str = "clip_embedding_2d";

    fn one_sequence() -> Dataset {
        parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "babel_1", "text": "A1", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 2.0] }
            ]}
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_single_sequence_example() {
        let out = transform(&one_sequence(), 5, KEY);
        assert_eq!(out.points.len(), 1);
        let p = &out.points[0];
        assert_eq!((p.x, p.y), (1.0, 2.0));
        assert_eq!(p.text, "H1");
        assert_eq!(p.labels, vec!["A1"]);
        assert_eq!(out.babel_texts, vec!["A1"]);
        assert_eq!(out.humanml3d_texts, vec!["H1"]);
    }

    #[test]
    fn test_zero_cap_yields_no_points() {
        let out = transform(&one_sequence(), 0, KEY);
        assert!(out.points.is_empty());
        assert!(out.humanml3d_texts.is_empty());
        // Cap 0 stops the scan before the first sequence is visited
        assert!(out.babel_texts.is_empty());
    }

    #[test]
    fn test_labels_capture_babel_listed_after_point() {
        // BABEL caption appears after the HumanML3D annotation: the point
        // must still carry it (two-pass snapshot, not an interleaved scan)
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 1.0] },
                { "seg_id": "babel_1", "text": "late label", "clip_embedding_2d": [0.0, 0.0] }
            ]}
        }"#,
        )
        .unwrap();
        let out = transform(&ds, 10, KEY);
        assert_eq!(out.points[0].labels, vec!["late label"]);
    }

    #[test]
    fn test_cap_monotonicity_prefix_consistency() {
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "babel_1", "text": "A1", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 1.0] },
                { "seg_id": "humanml3d_2", "text": "H2", "clip_embedding_2d": [2.0, 2.0] }
            ]},
            "S2": { "annotations": [
                { "seg_id": "babel_2", "text": "A2", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_3", "text": "H3", "clip_embedding_2d": [3.0, 3.0] }
            ]}
        }"#,
        )
        .unwrap();
        let small = transform(&ds, 2, KEY);
        let large = transform(&ds, 3, KEY);
        assert_eq!(small.points.len(), 2);
        assert_eq!(large.points.len(), 3);
        assert_eq!(small.points[..], large.points[..2]);
    }

    #[test]
    fn test_cap_boundary_keeps_whole_sequence_babel_texts() {
        // Cap hit on S1's first point: S1's babel captions (both of them)
        // are kept, S2 is never visited and contributes nothing
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "babel_1", "text": "A1", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 1.0] },
                { "seg_id": "babel_2", "text": "A2", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_2", "text": "H2", "clip_embedding_2d": [2.0, 2.0] }
            ]},
            "S2": { "annotations": [
                { "seg_id": "babel_3", "text": "A3", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_3", "text": "H3", "clip_embedding_2d": [3.0, 3.0] }
            ]}
        }"#,
        )
        .unwrap();
        let out = transform(&ds, 1, KEY);
        assert_eq!(out.points.len(), 1);
        assert_eq!(out.points[0].labels, vec!["A1", "A2"]);
        assert_eq!(out.babel_texts, vec!["A1", "A2"]);
        assert_eq!(out.humanml3d_texts, vec!["H1"]);
    }

    #[test]
    fn test_label_snapshot_isolation() {
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "babel_1", "text": "A1", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 1.0] },
                { "seg_id": "humanml3d_2", "text": "H2", "clip_embedding_2d": [2.0, 2.0] }
            ]}
        }"#,
        )
        .unwrap();
        let mut out = transform(&ds, 10, KEY);
        out.points[0].labels.push("mutated".to_string());
        assert_eq!(out.points[1].labels, vec!["A1"]);
    }

    #[test]
    fn test_missing_embedding_skipped_without_counting() {
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "humanml3d_1", "text": "no coords" },
                { "seg_id": "humanml3d_2", "text": "H2", "clip_embedding_2d": [1.0, 1.0] }
            ]}
        }"#,
        )
        .unwrap();
        let out = transform(&ds, 1, KEY);
        assert_eq!(out.points.len(), 1);
        assert_eq!(out.points[0].text, "H2");
        assert_eq!(out.humanml3d_texts, vec!["H2"]);
    }

    #[test]
    fn test_missing_seg_id_excluded_from_both_passes() {
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "text": "orphan", "clip_embedding_2d": [1.0, 1.0] },
                { "seg_id": "kit_1", "text": "other corpus", "clip_embedding_2d": [1.0, 1.0] },
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 1.0] }
            ]}
        }"#,
        )
        .unwrap();
        let out = transform(&ds, 10, KEY);
        assert_eq!(out.points.len(), 1);
        assert!(out.points[0].labels.is_empty());
        assert!(out.babel_texts.is_empty());
    }

    #[test]
    fn test_duplicate_humanml3d_text_across_sequences() {
        let ds = parse_dataset(
            r#"{
            "S1": { "annotations": [
                { "seg_id": "babel_1", "text": "A1", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_1", "text": "H1", "clip_embedding_2d": [1.0, 1.0] }
            ]},
            "S2": { "annotations": [
                { "seg_id": "babel_2", "text": "A2", "clip_embedding_2d": [0.0, 0.0] },
                { "seg_id": "humanml3d_2", "text": "H1", "clip_embedding_2d": [2.0, 2.0] }
            ]}
        }"#,
        )
        .unwrap();
        let out = transform(&ds, 10, KEY);
        assert_eq!(out.points.len(), 2);
        assert_eq!(out.points[0].labels, vec!["A1"]);
        assert_eq!(out.points[1].labels, vec!["A2"]);
        // Caption list deduplicates the repeated text
        assert_eq!(out.humanml3d_texts, vec!["H1"]);
    }
}
