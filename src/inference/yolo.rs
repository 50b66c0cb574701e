//! ONNX Runtime layout detector for YOLO-style single-output models.
//!
//! The model takes a letterboxed `[1, 3, S, S]` image scaled to `[0, 1]` and
//! produces one `[1, 4 + C, N]` tensor of box and class-score channels.

use std::path::{Path, PathBuf};

use image::RgbImage;
use ndarray::Array2;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::{inputs, session::Session, value::Value};
use tracing::debug;

use crate::inference::detector::LayoutDetector;
use crate::inference::error::InferenceError;
use crate::utils::image_utils;

pub struct YoloLayout {
    session: Session,
    input_name: String,
    output_name: String,
}

impl YoloLayout {
    const NUM_THREADS: usize = 4;

    /// Loads the model at `model_path`.
    ///
    /// With `use_cuda` the CUDA execution provider is registered ahead of the
    /// CPU provider; ONNX Runtime falls back to CPU if CUDA is unavailable.
    pub fn new(model_path: &Path, use_cuda: bool) -> Result<Self, InferenceError> {
        if !model_path.exists() {
            return Err(InferenceError::ModelFileMissing {
                path: model_path.to_path_buf(),
            });
        }

        let mut providers = Vec::with_capacity(2);
        if use_cuda {
            providers.push(CUDAExecutionProvider::default().with_device_id(0).build());
        }
        providers.push(CPUExecutionProvider::default().build());

        let session = Session::builder()
            .map_err(|source| InferenceError::ModelFileLoadError {
                path: model_path.into(),
                source,
            })?
            .with_execution_providers(providers)?
            .with_intra_threads(Self::NUM_THREADS)?
            .commit_from_file(model_path)
            .map_err(|source| InferenceError::ModelFileLoadError {
                path: model_path.into(),
                source,
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .unwrap_or_else(|| "output0".to_string());

        debug!(
            "Loaded layout model {} (input '{}', output '{}')",
            model_path.display(),
            input_name,
            output_name
        );

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }

    /// Returns a factory suitable for [`SessionPool::new`](crate::inference::SessionPool::new).
    pub fn factory(
        model_path: PathBuf,
        use_cuda: bool,
    ) -> impl Fn() -> Result<Self, InferenceError> + Send + Sync + 'static {
        move || Self::new(&model_path, use_cuda)
    }

    fn create_model_input(&self, image: &RgbImage) -> Result<Value, InferenceError> {
        let input_array = image_utils::to_nchw_tensor(image);
        let shape = input_array.shape().to_vec();
        let (data, _offset) = input_array.into_raw_vec_and_offset();

        let input = Value::from_array((shape.as_slice(), data)).map_err(|e| {
            InferenceError::PreprocessingError {
                operation: "create image input".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(input.into())
    }

    /// Reshapes `[1, C, N]` or `[C, N]` output into a `[C, N]` array.
    fn to_channel_major(shape: &[i64], data: Vec<f32>) -> Result<Array2<f32>, InferenceError> {
        let dims: Vec<usize> = shape
            .iter()
            .map(|&d| usize::try_from(d).unwrap_or(0))
            .collect();

        let (channels, anchors) = match dims.as_slice() {
            [1, channels, anchors] | [channels, anchors] => (*channels, *anchors),
            other => {
                return Err(InferenceError::PredictionError {
                    operation: "reshape detection output".to_string(),
                    message: format!("unexpected output shape {other:?}"),
                })
            }
        };

        Array2::from_shape_vec((channels, anchors), data).map_err(|e| {
            InferenceError::PredictionError {
                operation: "reshape detection output".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl LayoutDetector for YoloLayout {
    fn detect(&mut self, image: &RgbImage, model_size: u32) -> Result<Array2<f32>, InferenceError> {
        let (letterboxed, _meta) = image_utils::letterbox_image(image, model_size);
        let input = self.create_model_input(&letterboxed)?;

        let (shape, data) = {
            let outputs = self
                .session
                .run(inputs![self.input_name.as_str() => input])
                .map_err(|source| InferenceError::ModelExecutionError {
                    operation: "layout forward pass".to_string(),
                    source,
                })?;

            let output = outputs
                .get(self.output_name.as_str())
                .ok_or_else(|| InferenceError::PredictionError {
                    operation: "get detection output".to_string(),
                    message: format!("Output '{}' not found", self.output_name),
                })?
                .try_extract_tensor::<f32>()
                .map_err(|source| InferenceError::PredictionError {
                    operation: "extract detection tensor".to_string(),
                    message: source.to_string(),
                })?;

            (output.0.to_vec(), output.1.to_vec())
        };

        Self::to_channel_major(&shape, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_channel_major_squeezes_batch() {
        let data: Vec<f32> = (0..18).map(|v| v as f32).collect();
        let array = YoloLayout::to_channel_major(&[1, 6, 3], data).unwrap();
        assert_eq!(array.dim(), (6, 3));
        assert_eq!(array[[1, 0]], 3.0);
    }

    #[test]
    fn test_to_channel_major_accepts_2d() {
        let array = YoloLayout::to_channel_major(&[5, 2], vec![0.0; 10]).unwrap();
        assert_eq!(array.dim(), (5, 2));
    }

    #[test]
    fn test_to_channel_major_rejects_bad_shape() {
        assert!(YoloLayout::to_channel_major(&[2, 5, 2], vec![0.0; 20]).is_err());
        assert!(YoloLayout::to_channel_major(&[1, 6, 3], vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let result = YoloLayout::new(Path::new("/nonexistent/layout.onnx"), false);
        assert!(matches!(
            result,
            Err(InferenceError::ModelFileMissing { .. })
        ));
    }
}
