use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid {name}: {value} is outside [0, 1]")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to load page image")]
    ImageLoadError {
        #[source]
        source: image::ImageError,
    },

    #[error("Model processing failed")]
    ModelProcessingError {
        #[from]
        source: crate::inference::InferenceError,
    },

    #[error("Failed to persist page {page_number} to {path}")]
    PersistError {
        page_number: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory {path}")]
    SinkSetupError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize page {page_number}")]
    SerializeError {
        page_number: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Page {page_number} was not processed: batch cancelled")]
    Cancelled { page_number: usize },

    #[error("Page {page_number} analysis panicked: {message}")]
    Panicked { page_number: usize, message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

impl LayoutError {
    /// Validates a caller-supplied threshold.
    ///
    /// Values outside `[0, 1]` and NaN are rejected rather than clamped.
    pub fn check_threshold(name: &'static str, value: f32) -> Result<f32, LayoutError> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(LayoutError::InvalidThreshold { name, value })
        }
    }

    /// Returns `true` if the error is a caller contract violation rather than a
    /// runtime or setup failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LayoutError::InvalidThreshold { .. } | LayoutError::InvalidConfig { .. }
        )
    }

    /// Returns a human-readable reason including the source chain.
    pub fn reason(&self) -> String {
        let mut reason = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            reason.push_str(": ");
            reason.push_str(&err.to_string());
            source = err.source();
        }
        reason
    }
}
