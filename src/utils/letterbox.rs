//! Letterbox coordinate mapping between page pixels and the square model input.
//!
//! A page of arbitrary size is scaled uniformly to fit inside an `S x S` square
//! and centred with padding. [`LetterboxMeta`] records that transform so
//! detections in model space can be mapped back onto the page.

use serde::{Deserialize, Serialize};

/// Parameters of one page's resize-with-padding into the model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LetterboxMeta {
    /// Uniform scale factor applied to the page, always positive.
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
    /// Width of the scaled page inside the square.
    pub new_width: u32,
    /// Height of the scaled page inside the square.
    pub new_height: u32,
}

/// Computes the letterbox transform for a page of `orig_width x orig_height`
/// pixels into a square input of side `size`.
///
/// `scale = min(S/w, S/h)`, the scaled size is rounded, and the padding is the
/// floor of half the remaining space on each axis. Zero-sized pages are treated
/// as one pixel to keep the scale finite.
#[must_use]
pub fn letterbox_forward(orig_width: u32, orig_height: u32, size: u32) -> LetterboxMeta {
    let w = orig_width.max(1) as f32;
    let h = orig_height.max(1) as f32;
    let s = size as f32;

    let scale = f32::min(s / w, s / h);
    let new_width = (w * scale).round();
    let new_height = (h * scale).round();

    LetterboxMeta {
        scale,
        pad_x: ((s - new_width) / 2.0).floor().max(0.0),
        pad_y: ((s - new_height) / 2.0).floor().max(0.0),
        orig_width,
        orig_height,
        new_width: new_width as u32,
        new_height: new_height as u32,
    }
}

/// Maps a page-pixel point into model space.
#[inline]
#[must_use]
pub fn letterbox_forward_point(page_x: f32, page_y: f32, meta: &LetterboxMeta) -> (f32, f32) {
    (
        page_x * meta.scale + meta.pad_x,
        page_y * meta.scale + meta.pad_y,
    )
}

/// Maps a model-space point back to page pixels; the exact inverse of
/// [`letterbox_forward_point`].
#[inline]
#[must_use]
pub fn letterbox_inverse(model_x: f32, model_y: f32, meta: &LetterboxMeta) -> (f32, f32) {
    (
        (model_x - meta.pad_x) / meta.scale,
        (model_y - meta.pad_y) / meta.scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_landscape_pads_vertically() {
        let meta = letterbox_forward(1280, 720, 640);
        assert!((meta.scale - 0.5).abs() < 1e-6);
        assert_eq!(meta.new_width, 640);
        assert_eq!(meta.new_height, 360);
        assert_eq!(meta.pad_x, 0.0);
        assert_eq!(meta.pad_y, 140.0);
    }

    #[test]
    fn test_forward_portrait_pads_horizontally() {
        let meta = letterbox_forward(600, 1000, 640);
        assert!((meta.scale - 0.64).abs() < 1e-6);
        assert_eq!(meta.new_width, 384);
        assert_eq!(meta.new_height, 640);
        assert_eq!(meta.pad_x, 128.0);
        assert_eq!(meta.pad_y, 0.0);
    }

    #[test]
    fn test_forward_square_has_no_padding() {
        let meta = letterbox_forward(320, 320, 640);
        assert!((meta.scale - 2.0).abs() < 1e-6);
        assert_eq!(meta.pad_x, 0.0);
        assert_eq!(meta.pad_y, 0.0);
    }

    #[test]
    fn test_forward_odd_remainder_floors_padding() {
        // 640 / 1000 * 333 = 213.12 -> 213; (640 - 213) / 2 = 213.5 -> 213
        let meta = letterbox_forward(333, 1000, 640);
        assert_eq!(meta.new_width, 213);
        assert_eq!(meta.pad_x, 213.0);
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        let sizes = [(600, 1000), (1280, 720), (333, 1000), (2480, 3508), (17, 9)];
        for (w, h) in sizes {
            let meta = letterbox_forward(w, h, 640);
            for &(px, py) in &[(0.0, 0.0), (w as f32, h as f32), (w as f32 / 3.0, h as f32 / 7.0)] {
                let (mx, my) = letterbox_forward_point(px, py, &meta);
                let (rx, ry) = letterbox_inverse(mx, my, &meta);
                assert!((rx.round() - px.round()).abs() <= 1.0, "x for {w}x{h}");
                assert!((ry.round() - py.round()).abs() <= 1.0, "y for {w}x{h}");
            }
        }
    }

    #[test]
    fn test_inverse_of_padding_origin_is_page_origin() {
        let meta = letterbox_forward(600, 1000, 640);
        let (x, y) = letterbox_inverse(meta.pad_x, meta.pad_y, &meta);
        assert!(x.abs() < 1e-4);
        assert!(y.abs() < 1e-4);
    }
}
