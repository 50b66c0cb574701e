//! Decoding of raw per-anchor detector output.
//!
//! The layout model emits a channel-major tensor of shape `[4 + C, N]`: for each
//! of the `N` anchors the first four channels hold `(cx, cy, w, h)` in model
//! space and the remaining `C` channels hold per-class scores.

use ndarray::{ArrayView2, Axis};

use crate::document::bounds::Bounds;
use crate::document::detection::{Detection, RawCandidate};
use crate::utils::letterbox::{letterbox_inverse, LetterboxMeta};

/// Number of leading box channels in the raw tensor.
pub const BOX_CHANNELS: usize = 4;

/// Decodes a raw `[4 + C, N]` tensor into candidates.
///
/// Each anchor takes the class with the highest score (the first one on ties);
/// anchors whose best score is below `conf_threshold` are discarded, as are
/// anchors with non-finite scores. A tensor with no class channels or no anchors
/// decodes to an empty list. Output order follows anchor order, which callers
/// must not rely on.
#[must_use]
pub fn decode_candidates(raw: ArrayView2<'_, f32>, conf_threshold: f32) -> Vec<RawCandidate> {
    let (channels, anchors) = raw.dim();
    if channels <= BOX_CHANNELS || anchors == 0 {
        return Vec::new();
    }

    raw.axis_iter(Axis(1))
        .filter_map(|anchor| {
            let (class_id, score) = anchor
                .iter()
                .skip(BOX_CHANNELS)
                .copied()
                .enumerate()
                .filter(|(_, score)| score.is_finite())
                .fold(None, |best: Option<(usize, f32)>, (id, score)| match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((id, score)),
                })?;

            if score < conf_threshold {
                return None;
            }

            Some(RawCandidate {
                class_id,
                score,
                cx: anchor[0],
                cy: anchor[1],
                w: anchor[2],
                h: anchor[3],
            })
        })
        .collect()
}

/// Maps a model-space candidate back onto the page.
///
/// The corners are recovered independently through [`letterbox_inverse`]. No
/// clamping happens here, so the result may extend past the page edges.
#[must_use]
pub fn recover_detection(candidate: &RawCandidate, meta: &LetterboxMeta) -> Detection {
    let (x1, y1) = letterbox_inverse(
        candidate.cx - candidate.w / 2.0,
        candidate.cy - candidate.h / 2.0,
        meta,
    );
    let (x2, y2) = letterbox_inverse(
        candidate.cx + candidate.w / 2.0,
        candidate.cy + candidate.h / 2.0,
        meta,
    );

    Detection::new(Bounds::new(x1, y1, x2, y2), candidate.score, candidate.class_id)
}

/// Recovers every candidate; see [`recover_detection`].
#[must_use]
pub fn recover_detections(candidates: &[RawCandidate], meta: &LetterboxMeta) -> Vec<Detection> {
    candidates
        .iter()
        .map(|candidate| recover_detection(candidate, meta))
        .collect()
}
