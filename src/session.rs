//! View session - the owned result of one transform pass
//!
//! The session bundles the current point list, the caption lists feeding the
//! two selectors and the color map. It is rebuilt as a new value whenever
//! the cap changes or a view is (re)loaded; event handlers read the current
//! session instead of closing over rebindable state.

use crate::color::{assign_colors, ColorMap};
use crate::dataset::Dataset;
use crate::transform::{transform, Point};

#[derive(Debug, Clone)]
pub struct ViewSession {
    pub cap: usize,
    pub embedding_key: String,
    pub points: Vec<Point>,
    pub babel_texts: Vec<String>,
    pub humanml3d_texts: Vec<String>,
    pub colors: ColorMap,
}

impl ViewSession {
    /// Run the transform and derive colors for the discovered BABEL captions
    pub fn build(dataset: &Dataset, cap: usize, embedding_key: &str) -> Self {
        let output = transform(dataset, cap, embedding_key);
        let colors = assign_colors(output.babel_texts.iter().map(String::as_str));
        tracing::info!(
            "Session built: {} points, {} babel captions, {} humanml3d captions (cap {})",
            output.points.len(),
            output.babel_texts.len(),
            output.humanml3d_texts.len(),
            cap
        );
        Self {
            cap,
            embedding_key: embedding_key.to_string(),
            points: output.points,
            babel_texts: output.babel_texts,
            humanml3d_texts: output.humanml3d_texts,
            colors,
        }
    }

    /// Default fill for a point: its first label's color, grey when unlabeled
    pub fn default_color(&self, point: &Point) -> [f32; 3] {
        point
            .labels
            .first()
            .and_then(|l| self.colors.get(l))
            .copied()
            .unwrap_or([0.6, 0.6, 0.6])
    }
}
