//! Grouping of column-level detections into region-level groups.
//!
//! Layout models for vertical script detect one box per column of text. The
//! [`RegionGrouper`] merges runs of adjacent, top-aligned columns into the
//! paragraph-level regions that transcription works on. Everything that is not a
//! text column passes through as a singleton [`Group`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::document::bounds::Bounds;
use crate::document::detection::Detection;
use crate::document::layout_block::ClassMap;
use crate::utils::box_utils;

/// Fraction of the median column height two neighbouring columns may differ by
/// in their top edge and still belong to one region.
pub const INDENT_FRACTION: f32 = 0.15;

/// Multiple of the median column spacing beyond which two neighbouring columns
/// belong to different regions.
pub const ADJACENCY_FACTOR: f32 = 2.0;

/// A maximal run of detections merged by the grouper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub members: Vec<Detection>,
    /// Union of the member boxes.
    pub bounds: Bounds,
    /// Mean of the member centres.
    pub centroid_x: f32,
    pub centroid_y: f32,
    pub class_id: usize,
}

impl Group {
    /// Builds a group from its members, or `None` if there are none.
    ///
    /// The class of the group is the class of its first member; the grouper
    /// only merges detections of one class.
    pub fn from_members(members: Vec<Detection>) -> Option<Self> {
        let first = members.first()?;
        let class_id = first.class_id;
        let bounds = box_utils::union_all(members.iter().map(|m| &m.bounds))?;

        let count = members.len() as f32;
        let centroid_x = members.iter().map(|m| m.bounds.center_x()).sum::<f32>() / count;
        let centroid_y = members.iter().map(|m| m.bounds.center_y()).sum::<f32>() / count;

        Some(Self {
            members,
            bounds,
            centroid_x,
            centroid_y,
            class_id,
        })
    }

    pub fn singleton(detection: Detection) -> Self {
        Self {
            bounds: detection.bounds,
            centroid_x: detection.bounds.center_x(),
            centroid_y: detection.bounds.center_y(),
            class_id: detection.class_id,
            members: vec![detection],
        }
    }
}

/// Break thresholds derived from one page's column statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingThresholds {
    /// Maximum top-edge drift within one region.
    pub indent: f32,
    /// Horizontal centre distance at which columns stop being adjacent.
    pub adjacency: f32,
}

impl GroupingThresholds {
    /// Computes the thresholds for columns already sorted right-to-left.
    ///
    /// Returns `None` for fewer than two columns.
    pub fn from_sorted_columns(columns: &[Detection]) -> Option<Self> {
        if columns.len() < 2 {
            return None;
        }

        let heights: Vec<f32> = columns.iter().map(|c| c.bounds.height()).collect();
        let gaps: Vec<f32> = columns
            .windows(2)
            .map(|pair| (pair[1].bounds.center_x() - pair[0].bounds.center_x()).abs())
            .collect();

        let median_height = lower_median(heights)?;
        let median_gap = lower_median(gaps)?;

        Some(Self {
            indent: median_height * INDENT_FRACTION,
            adjacency: median_gap * ADJACENCY_FACTOR,
        })
    }

    /// Returns `true` if `next` starts a new region after `prev`.
    #[inline]
    pub fn breaks(&self, prev: &Detection, next: &Detection) -> bool {
        let dx = (next.bounds.center_x() - prev.bounds.center_x()).abs();
        let dy = (next.bounds.y1() - prev.bounds.y1()).abs();
        dx >= self.adjacency || dy >= self.indent
    }
}

/// Lower median: the element at index `(n - 1) / 2` of the sorted values.
fn lower_median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    Some(values[(values.len() - 1) / 2])
}

/// Clusters text-column detections into regions.
pub struct RegionGrouper<'a> {
    classes: &'a ClassMap,
}

impl<'a> RegionGrouper<'a> {
    pub fn new(classes: &'a ClassMap) -> Self {
        Self { classes }
    }

    /// Groups the detections of one page.
    ///
    /// Text-column detections are grouped per class id; all other detections
    /// become singleton groups. Every input detection ends up in exactly one
    /// output group.
    pub fn group(&self, detections: &[Detection]) -> Vec<Group> {
        let mut columns_by_class: BTreeMap<usize, Vec<Detection>> = BTreeMap::new();
        let mut groups = Vec::with_capacity(detections.len());

        for detection in detections {
            if self.classes.is_text_column(detection.class_id) {
                columns_by_class
                    .entry(detection.class_id)
                    .or_default()
                    .push(*detection);
            } else {
                groups.push(Group::singleton(*detection));
            }
        }

        for (class_id, columns) in columns_by_class {
            let column_count = columns.len();
            let merged = Self::group_columns(columns);
            debug!(
                "Grouped {} columns of class {} into {} regions",
                column_count,
                class_id,
                merged.len()
            );
            groups.extend(merged);
        }

        groups
    }

    /// Folds right-to-left sorted columns into runs, breaking wherever the
    /// spacing or top alignment changes.
    fn group_columns(mut columns: Vec<Detection>) -> Vec<Group> {
        columns.sort_by(|a, b| b.bounds.center_x().total_cmp(&a.bounds.center_x()));

        let Some(thresholds) = GroupingThresholds::from_sorted_columns(&columns) else {
            return columns.into_iter().map(Group::singleton).collect();
        };
        debug!(
            "Grouping thresholds: indent {:.2}, adjacency {:.2}",
            thresholds.indent, thresholds.adjacency
        );

        let (current, mut completed) = columns.into_iter().fold(
            (Vec::new(), Vec::new()),
            |(mut current, mut completed): (Vec<Detection>, Vec<Vec<Detection>>), column| {
                if let Some(prev) = current.last() {
                    if thresholds.breaks(prev, &column) {
                        completed.push(std::mem::take(&mut current));
                    }
                }
                current.push(column);
                (current, completed)
            },
        );
        if !current.is_empty() {
            completed.push(current);
        }

        completed.into_iter().filter_map(Group::from_members).collect()
    }
}
