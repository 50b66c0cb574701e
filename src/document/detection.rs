use serde::{Deserialize, Serialize};

use crate::document::bounds::Bounds;

/// A decoded anchor in model space: centre, size, winning class and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub class_id: usize,
    pub score: f32,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

/// A detection in page-pixel space.
///
/// Produced by coordinate recovery and never modified afterwards. The bounds are
/// not clamped to the page, so they may extend past the image edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bounds: Bounds,
    pub score: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn new(bounds: Bounds, score: f32, class_id: usize) -> Self {
        Self {
            bounds,
            score,
            class_id,
        }
    }
}
