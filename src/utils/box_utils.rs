//! Utility functions for bounding box operations.

use crate::document::bounds::Bounds;
use crate::document::detection::Detection;

/// Calculates the Intersection over Union (IoU) between two axis-aligned boxes.
///
/// IoU is a measure of overlap between two bounding boxes, used here to judge
/// whether two detections describe the same region.
///
/// # Returns
///
/// A value between 0.0 and 1.0 where:
/// - 0.0 indicates no overlap
/// - 1.0 indicates identical boxes
///
/// Returns 0.0 if either box has zero area. The result is symmetric in its
/// arguments.
#[inline]
#[must_use]
pub fn calculate_iou(a: &Bounds, b: &Bounds) -> f32 {
    let area_a = a.area();
    let area_b = b.area();

    if area_a <= 0.0 || area_b <= 0.0 {
        return 0.0;
    }

    let inter_w = (a.x2().min(b.x2()) - a.x1().max(b.x1())).max(0.0);
    let inter_h = (a.y2().min(b.y2()) - a.y1().max(b.y1())).max(0.0);
    let intersection = inter_w * inter_h;

    if intersection <= 0.0 {
        return 0.0;
    }

    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Returns the smallest box containing both `a` and `b`.
#[inline]
#[must_use]
pub fn union_bounds(a: &Bounds, b: &Bounds) -> Bounds {
    Bounds::new(
        a.x1().min(b.x1()),
        a.y1().min(b.y1()),
        a.x2().max(b.x2()),
        a.y2().max(b.y2()),
    )
}

/// Returns the union of every box in `bounds`, or `None` for an empty input.
#[must_use]
pub fn union_all<'a, I>(bounds: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Bounds>,
{
    bounds
        .into_iter()
        .fold(None, |acc: Option<Bounds>, b| match acc {
            Some(acc) => Some(union_bounds(&acc, b)),
            None => Some(*b),
        })
}

/// Clamps a box into `[0, width] x [0, height]`.
///
/// A box lying entirely outside the image collapses onto the nearest edge.
#[inline]
#[must_use]
pub fn clamp_bounds(bounds: &Bounds, width: u32, height: u32) -> Bounds {
    let w = width as f32;
    let h = height as f32;
    Bounds::new(
        bounds.x1().clamp(0.0, w),
        bounds.y1().clamp(0.0, h),
        bounds.x2().clamp(0.0, w),
        bounds.y2().clamp(0.0, h),
    )
}

/// Clamps a box into the image and rounds it to integer pixel corners.
#[inline]
#[must_use]
pub fn clamp_to_pixels(bounds: &Bounds, width: u32, height: u32) -> [i32; 4] {
    let clamped = clamp_bounds(bounds, width, height);
    [
        clamped.x1().round() as i32,
        clamped.y1().round() as i32,
        clamped.x2().round() as i32,
        clamped.y2().round() as i32,
    ]
}

/// Applies Non-Maximum Suppression (NMS) to filter overlapping detections.
///
/// # Algorithm
///
/// 1. Sort detections by score in descending order (stable, so equal scores
///    keep their input order)
/// 2. For each detection (starting from the highest score):
///    - Keep the detection if not suppressed
///    - Suppress every lower-ranked detection of the same class whose IoU with
///      it is at or above the threshold
///
/// Only boxes with the same class id are compared, so each class is suppressed
/// independently. Running the function on its own output with the same
/// threshold returns the same set.
#[must_use]
pub fn apply_nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.len() <= 1 {
        return detections;
    }

    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }

        keep.push(detections[i]);

        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[i].class_id != detections[j].class_id {
                continue;
            }

            let iou = calculate_iou(&detections[i].bounds, &detections[j].bounds);
            if iou >= iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Orders points for right-to-left, top-to-bottom reading of vertical script.
///
/// Points are ranked by `x` descending. Consecutive points whose `x` lies
/// within `tolerance` of the first point of the current rank share that rank
/// and are read top to bottom (`y` ascending).
///
/// # Returns
///
/// Indices into `centroids` in reading order.
#[must_use]
pub fn vertical_rtl_reading_order(centroids: &[(f32, f32)], tolerance: f32) -> Vec<usize> {
    let n = centroids.len();
    let mut by_x: Vec<usize> = (0..n).collect();
    by_x.sort_by(|&a, &b| {
        centroids[b]
            .0
            .total_cmp(&centroids[a].0)
            .then_with(|| centroids[a].1.total_cmp(&centroids[b].1))
    });

    let mut result = Vec::with_capacity(n);
    let mut start = 0;
    while start < n {
        let anchor_x = centroids[by_x[start]].0;
        let mut end = start + 1;
        while end < n && anchor_x - centroids[by_x[end]].0 < tolerance {
            end += 1;
        }

        let rank = &mut by_x[start..end];
        rank.sort_by(|&a, &b| {
            centroids[a]
                .1
                .total_cmp(&centroids[b].1)
                .then_with(|| centroids[b].0.total_cmp(&centroids[a].0))
        });
        result.extend_from_slice(rank);
        start = end;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Detection {
        Detection::new(Bounds::new(x1, y1, x2, y2), score, class_id)
    }

    // calculate_iou Tests

    #[test]
    fn test_calculate_iou_identical() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(calculate_iou(&a, &a), 1.0);
    }

    #[test]
    fn test_calculate_iou_disjoint() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(calculate_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_calculate_iou_partial() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 0.0, 15.0, 10.0);
        assert!((calculate_iou(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_calculate_iou_symmetric() {
        let a = Bounds::new(3.0, 7.5, 40.0, 90.0);
        let b = Bounds::new(-12.0, 20.0, 25.0, 64.0);
        assert_eq!(calculate_iou(&a, &b), calculate_iou(&b, &a));
    }

    #[test]
    fn test_calculate_iou_zero_area_box() {
        let flat = Bounds::new(0.0, 0.0, 10.0, 0.0);
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(calculate_iou(&flat, &b), 0.0);
        assert_eq!(calculate_iou(&flat, &flat), 0.0);
    }

    #[test]
    fn test_calculate_iou_touching_boxes() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(calculate_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_calculate_iou_one_inside_other() {
        let large = Bounds::new(0.0, 0.0, 20.0, 20.0);
        let small = Bounds::new(5.0, 5.0, 15.0, 15.0);
        assert!((calculate_iou(&large, &small) - 0.25).abs() < 1e-6);
    }

    // union / clamp Tests

    #[test]
    fn test_union_all_contains_inputs() {
        let boxes = [
            Bounds::new(10.0, 20.0, 30.0, 40.0),
            Bounds::new(-5.0, 25.0, 12.0, 90.0),
        ];
        let union = union_all(boxes.iter()).unwrap();
        assert_eq!(union.to_array(), [-5.0, 20.0, 30.0, 90.0]);
        assert!(boxes.iter().all(|b| union.contains(b)));
    }

    #[test]
    fn test_union_all_empty() {
        assert!(union_all(std::iter::empty()).is_none());
    }

    #[test]
    fn test_clamp_to_pixels() {
        let b = Bounds::new(-10.4, 5.6, 650.0, 1200.0);
        assert_eq!(clamp_to_pixels(&b, 600, 1000), [0, 6, 600, 1000]);
    }

    #[test]
    fn test_clamp_box_outside_image_collapses() {
        let b = Bounds::new(700.0, 10.0, 800.0, 50.0);
        assert_eq!(clamp_to_pixels(&b, 600, 1000), [600, 10, 600, 50]);
    }

    // apply_nms Tests

    #[test]
    fn test_apply_nms() {
        let detections = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(1.0, 1.0, 11.0, 11.0, 0.8, 0),
            det(20.0, 20.0, 30.0, 30.0, 0.7, 0),
        ];
        let result = apply_nms(detections, 0.5);

        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|d| d.score == 0.9));
        assert!(result.iter().any(|d| d.score == 0.7));
    }

    #[test]
    fn test_apply_nms_empty() {
        assert!(apply_nms(Vec::new(), 0.45).is_empty());
    }

    #[test]
    fn test_apply_nms_different_classes() {
        let detections = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(1.0, 1.0, 11.0, 11.0, 0.85, 1),
        ];
        assert_eq!(apply_nms(detections, 0.5).len(), 2);
    }

    #[test]
    fn test_apply_nms_threshold_is_inclusive() {
        // IoU of these two boxes is exactly 1/3.
        let detections = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(5.0, 0.0, 15.0, 10.0, 0.8, 0),
        ];
        let iou = calculate_iou(&detections[0].bounds, &detections[1].bounds);
        let result = apply_nms(detections, iou);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].score, 0.9);
    }

    #[test]
    fn test_apply_nms_same_scores_keeps_first() {
        let detections = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(1.0, 1.0, 11.0, 11.0, 0.9, 0),
        ];
        let result = apply_nms(detections, 0.5);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].bounds.x1(), 0.0);
    }

    #[test]
    fn test_apply_nms_idempotent() {
        let detections = vec![
            det(0.0, 0.0, 100.0, 400.0, 0.95, 1),
            det(5.0, 10.0, 105.0, 410.0, 0.90, 1),
            det(50.0, 0.0, 150.0, 400.0, 0.85, 1),
            det(200.0, 0.0, 260.0, 400.0, 0.80, 1),
            det(0.0, 0.0, 100.0, 400.0, 0.70, 4),
            det(210.0, 5.0, 265.0, 395.0, 0.60, 1),
        ];
        let once = apply_nms(detections, 0.45);
        let twice = apply_nms(once.clone(), 0.45);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_nms_no_kept_pair_above_threshold() {
        let mut detections = Vec::new();
        for i in 0..20 {
            let offset = (i * 7 % 30) as f32;
            detections.push(det(
                offset,
                offset / 2.0,
                offset + 40.0,
                offset + 200.0,
                1.0 - i as f32 * 0.03,
                i % 2,
            ));
        }
        let kept = apply_nms(detections, 0.45);
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                if a.class_id == b.class_id {
                    assert!(calculate_iou(&a.bounds, &b.bounds) < 0.45);
                }
            }
        }
    }

    // vertical_rtl_reading_order Tests

    #[test]
    fn test_reading_order_empty() {
        assert!(vertical_rtl_reading_order(&[], 50.0).is_empty());
    }

    #[test]
    fn test_reading_order_right_to_left() {
        let centroids = [(100.0, 500.0), (500.0, 500.0), (300.0, 500.0)];
        assert_eq!(vertical_rtl_reading_order(&centroids, 50.0), vec![1, 2, 0]);
    }

    #[test]
    fn test_reading_order_same_rank_top_to_bottom() {
        // Two regions at nearly the same horizontal position: upper one first.
        let centroids = [(480.0, 800.0), (500.0, 200.0), (100.0, 100.0)];
        assert_eq!(vertical_rtl_reading_order(&centroids, 50.0), vec![1, 0, 2]);
    }

    #[test]
    fn test_reading_order_outside_tolerance_uses_x() {
        let centroids = [(560.0, 800.0), (500.0, 100.0)];
        assert_eq!(vertical_rtl_reading_order(&centroids, 50.0), vec![0, 1]);
    }
}
