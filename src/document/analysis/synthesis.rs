use tracing::debug;

use crate::document::layout_block::{ClassMap, LayoutBlock};
use crate::document::region::Group;
use crate::utils::box_utils;

/// Turns a page's groups into ordered, clamped [`LayoutBlock`]s.
pub struct BlockSynthesizer<'a> {
    classes: &'a ClassMap,
    tolerance: f32,
}

impl<'a> BlockSynthesizer<'a> {
    /// `tolerance` is the horizontal centroid distance in pixels under which two
    /// groups are ordered top to bottom instead of right to left.
    pub fn new(classes: &'a ClassMap, tolerance: f32) -> Self {
        Self { classes, tolerance }
    }

    /// Synthesizes the blocks of one page.
    ///
    /// Overview groups are dropped. The remaining groups receive reading orders
    /// `0..N` and identifiers derived from `(page_number, reading_order)`; their
    /// boxes are clamped into `[0, width] x [0, height]`.
    pub fn synthesize(
        &self,
        groups: &[Group],
        page_number: usize,
        width: u32,
        height: u32,
    ) -> Vec<LayoutBlock> {
        let kept: Vec<&Group> = groups
            .iter()
            .filter(|group| !self.classes.is_overview(group.class_id))
            .collect();

        if kept.len() != groups.len() {
            debug!(
                "Dropped {} overview groups on page {}",
                groups.len() - kept.len(),
                page_number
            );
        }

        let centroids: Vec<(f32, f32)> = kept
            .iter()
            .map(|group| (group.centroid_x, group.centroid_y))
            .collect();
        let order = box_utils::vertical_rtl_reading_order(&centroids, self.tolerance);

        order
            .into_iter()
            .enumerate()
            .map(|(reading_order, index)| {
                let group = kept[index];
                LayoutBlock {
                    block_id: LayoutBlock::make_id(page_number, reading_order),
                    block_type: self.classes.block_type(group.class_id),
                    bbox: box_utils::clamp_to_pixels(&group.bounds, width, height),
                    reading_order,
                    skip_ocr: self.classes.skips_ocr(group.class_id),
                }
            })
            .collect()
    }
}
