use image::RgbImage;
use ndarray::Array2;

use crate::inference::error::InferenceError;

/// A layout detection model.
///
/// Implementations letterbox `image` into a `model_size x model_size` input
/// (see [`crate::utils::image_utils::letterbox_image`]) and return the raw
/// channel-major output of shape `[4 + num_classes, num_anchors]`: box centre
/// and size in model space followed by one score per class.
///
/// Detection takes `&mut self` because inference sessions are not assumed to
/// be safe for concurrent calls; share instances through a
/// [`SessionPool`](crate::inference::SessionPool).
pub trait LayoutDetector: Send {
    fn detect(&mut self, image: &RgbImage, model_size: u32) -> Result<Array2<f32>, InferenceError>;
}

impl<D: LayoutDetector + ?Sized> LayoutDetector for Box<D> {
    fn detect(&mut self, image: &RgbImage, model_size: u32) -> Result<Array2<f32>, InferenceError> {
        (**self).detect(image, model_size)
    }
}
