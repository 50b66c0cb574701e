use image::{imageops, ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use ndarray::Array4;

use crate::document::layout_block::{BlockType, LayoutBlock};
use crate::utils::letterbox::{letterbox_forward, LetterboxMeta};

/// Fill colour used for letterbox padding.
pub const LETTERBOX_FILL: Rgb<u8> = Rgb([114, 114, 114]);

pub fn add_image_padding(
    image: &RgbImage,
    padding_top: u32,
    padding_bottom: u32,
    padding_left: u32,
    padding_right: u32,
    fill: Option<Rgb<u8>>,
) -> RgbImage {
    if padding_top == 0 && padding_bottom == 0 && padding_left == 0 && padding_right == 0 {
        return image.clone();
    }

    let new_width = image.width() + padding_left + padding_right;
    let new_height = image.height() + padding_top + padding_bottom;

    let mut padded_img: RgbImage =
        ImageBuffer::from_pixel(new_width, new_height, fill.unwrap_or(Rgb([255, 255, 255])));

    imageops::replace(
        &mut padded_img,
        image,
        i64::from(padding_left),
        i64::from(padding_top),
    );

    padded_img
}

/// Resizes `image` to fit a `size x size` square and pads it symmetrically.
///
/// The transform is described by [`letterbox_forward`], so the returned meta
/// is identical to what the pipeline computes from the page dimensions alone.
pub fn letterbox_image(image: &RgbImage, size: u32) -> (RgbImage, LetterboxMeta) {
    let meta = letterbox_forward(image.width(), image.height(), size);

    let new_width = meta.new_width.clamp(1, size);
    let new_height = meta.new_height.clamp(1, size);
    let resized = imageops::resize(
        image,
        new_width,
        new_height,
        imageops::FilterType::Triangle,
    );

    let pad_left = meta.pad_x as u32;
    let pad_top = meta.pad_y as u32;
    let pad_right = size.saturating_sub(new_width + pad_left);
    let pad_bottom = size.saturating_sub(new_height + pad_top);

    let padded = add_image_padding(
        &resized,
        pad_top,
        pad_bottom,
        pad_left,
        pad_right,
        Some(LETTERBOX_FILL),
    );

    (padded, meta)
}

/// Converts an RGB image into a `[1, 3, H, W]` tensor scaled to `[0, 1]`.
pub fn to_nchw_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let [r, g, b] = pixel.0;
        tensor[[0, 0, y, x]] = f32::from(r) / 255.0;
        tensor[[0, 1, y, x]] = f32::from(g) / 255.0;
        tensor[[0, 2, y, x]] = f32::from(b) / 255.0;
    }

    tensor
}

fn block_color(block_type: BlockType) -> Rgb<u8> {
    match block_type {
        BlockType::MainText => Rgb([220, 40, 40]),
        BlockType::Illustration => Rgb([40, 140, 220]),
        BlockType::Seal => Rgb([230, 150, 20]),
        BlockType::Unknown => Rgb([120, 120, 120]),
    }
}

/// Draws block outlines onto a copy of the page for visual inspection.
pub fn draw_blocks(image: &RgbImage, blocks: &[LayoutBlock]) -> RgbImage {
    let mut output = image.clone();

    for block in blocks {
        let [x1, y1, x2, y2] = block.bbox;
        let width = (x2 - x1).max(0) as u32;
        let height = (y2 - y1).max(0) as u32;
        if width == 0 || height == 0 {
            continue;
        }

        let color = block_color(block.block_type);
        for offset in 0..3i32 {
            let grow = (offset * 2) as u32;
            let rect = Rect::at(x1 - offset, y1 - offset).of_size(width + grow, height + grow);
            draw_hollow_rect_mut(&mut output, rect, color);
        }
    }

    output
}
