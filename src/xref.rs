//! Cross-reference queries between the two caption corpora
//!
//! All three queries are linear scans over the current point list; the data
//! is session-local and capped, so no persistent index is kept. Selections
//! with no matching points (stale after a cap change) just return empty
//! results.

use crate::transform::Point;

/// Points whose label list contains the given BABEL caption
pub fn points_referencing<'a>(points: &'a [Point], babel_text: &str) -> Vec<&'a Point> {
    points
        .iter()
        .filter(|p| p.labels.iter().any(|l| l == babel_text))
        .collect()
}

/// HumanML3D captions of all points referencing the given BABEL caption,
/// deduplicated in first-match order
pub fn humanml3d_texts_for(points: &[Point], babel_text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for point in points_referencing(points, babel_text) {
        if !out.contains(&point.text) {
            out.push(point.text.clone());
        }
    }
    out
}

/// BABEL captions of all points with exactly the given HumanML3D caption,
/// flattened and deduplicated in first-match order
///
/// The same caption can recur across sequences with different labels; the
/// result is the union over every matching point.
pub fn babel_texts_for(points: &[Point], humanml3d_text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for point in points.iter().filter(|p| p.text == humanml3d_text) {
        for label in &point.labels {
            if !out.contains(label) {
                out.push(label.clone());
            }
        }
    }
    out
}
