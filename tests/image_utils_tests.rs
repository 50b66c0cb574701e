use guji_layout::document::layout_block::{BlockType, LayoutBlock};
use guji_layout::utils::image_utils::{
    add_image_padding, draw_blocks, letterbox_image, to_nchw_tensor, LETTERBOX_FILL,
};
use image::{ImageBuffer, Rgb, RgbImage};

#[test]
fn test_add_image_padding() {
    let img: RgbImage = ImageBuffer::from_pixel(10, 10, Rgb([0, 0, 0]));

    let padded = add_image_padding(&img, 2, 2, 2, 2, None);

    assert_eq!(padded.width(), 14);
    assert_eq!(padded.height(), 14);

    // Default padding colour is white
    assert_eq!(padded.get_pixel(0, 0), &Rgb([255, 255, 255]));
    assert_eq!(padded.get_pixel(13, 13), &Rgb([255, 255, 255]));

    // Original content sits at the (left, top) offset
    assert_eq!(padded.get_pixel(2, 2), &Rgb([0, 0, 0]));
}

#[test]
fn test_add_image_padding_without_padding_is_identity() {
    let img: RgbImage = ImageBuffer::from_pixel(3, 5, Rgb([9, 8, 7]));
    assert_eq!(add_image_padding(&img, 0, 0, 0, 0, None), img);
}

#[test]
fn test_letterbox_portrait_page() {
    let img: RgbImage = ImageBuffer::from_pixel(600, 1000, Rgb([0, 0, 0]));

    let (boxed, meta) = letterbox_image(&img, 640);

    assert_eq!(boxed.dimensions(), (640, 640));
    assert_eq!(meta.pad_x, 128.0);
    assert_eq!(meta.pad_y, 0.0);
    assert_eq!(boxed.get_pixel(0, 320), &LETTERBOX_FILL);
    assert_eq!(boxed.get_pixel(639, 320), &LETTERBOX_FILL);
    assert_eq!(boxed.get_pixel(320, 320), &Rgb([0, 0, 0]));
}

#[test]
fn test_letterbox_landscape_page() {
    let img: RgbImage = ImageBuffer::from_pixel(1280, 720, Rgb([255, 255, 255]));

    let (boxed, meta) = letterbox_image(&img, 640);

    assert_eq!(boxed.dimensions(), (640, 640));
    assert_eq!(meta.pad_y, 140.0);
    assert_eq!(boxed.get_pixel(320, 10), &LETTERBOX_FILL);
    assert_eq!(boxed.get_pixel(320, 320), &Rgb([255, 255, 255]));
}

#[test]
fn test_to_nchw_tensor_layout_and_scale() {
    let mut img: RgbImage = ImageBuffer::new(4, 2);
    img.put_pixel(3, 1, Rgb([255, 0, 51]));

    let tensor = to_nchw_tensor(&img);

    assert_eq!(tensor.shape(), &[1, 3, 2, 4]);
    assert_eq!(tensor[[0, 0, 1, 3]], 1.0);
    assert_eq!(tensor[[0, 1, 1, 3]], 0.0);
    assert!((tensor[[0, 2, 1, 3]] - 0.2).abs() < 1e-6);
}

#[test]
fn test_draw_blocks_outlines_regions() {
    let img: RgbImage = ImageBuffer::from_pixel(100, 100, Rgb([255, 255, 255]));
    let blocks = vec![
        LayoutBlock {
            block_id: "p1_b0".to_string(),
            block_type: BlockType::MainText,
            bbox: [20, 20, 60, 80],
            reading_order: 0,
            skip_ocr: false,
        },
        LayoutBlock {
            block_id: "p1_b1".to_string(),
            block_type: BlockType::Seal,
            bbox: [70, 70, 70, 90],
            reading_order: 1,
            skip_ocr: true,
        },
    ];

    let drawn = draw_blocks(&img, &blocks);

    assert_eq!(drawn.dimensions(), img.dimensions());
    assert_ne!(drawn.get_pixel(20, 50), &Rgb([255, 255, 255]));
    assert_eq!(drawn.get_pixel(40, 50), &Rgb([255, 255, 255]));
    // Zero-width block is skipped
    assert_eq!(drawn.get_pixel(70, 80), &Rgb([255, 255, 255]));
}
