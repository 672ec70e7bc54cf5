//! Deterministic caption-to-color assignment
//!
//! Captions are deduplicated and sorted before hues are handed out, so a
//! given caption set always maps to the same colors no matter the order the
//! captions were discovered in (cap changes must not reshuffle colors).

use std::collections::HashMap;

/// Golden angle in degrees; successive hues land far apart on the circle
const GOLDEN_ANGLE: f64 = 137.508;

const SATURATION: f32 = 0.65;
const LIGHTNESS: f32 = 0.55;

/// Caption -> RGB triplet in [0, 1]
pub type ColorMap = HashMap<String, [f32; 3]>;

/// Assign a distinct color to every caption in the input
///
/// Hues step by the golden angle modulo 360, so any number of captions gets
/// a color; distinctness degrades gracefully for very large sets rather than
/// failing.
pub fn assign_colors<I, S>(labels: I) -> ColorMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sorted: Vec<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
    sorted.sort();
    sorted.dedup();

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let hue = (i as f64 * GOLDEN_ANGLE) % 360.0;
            (label, hsl_to_rgb(hue as f32 / 360.0, SATURATION, LIGHTNESS))
        })
        .collect()
}

/// HSL to RGB, all components in [0, 1]
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}
