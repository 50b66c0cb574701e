//! Application configuration module.
//!
//! Configuration is loaded from a JSON file and passed explicitly to the
//! pipeline context and server; there is no process-wide instance. Every field
//! has a default, so a configuration file only needs the values it overrides.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::layout_block::ClassMap;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/app_config.json";

/// Settings of the layout pipeline itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum class score for an anchor to survive decoding.
    pub conf_threshold: f32,

    /// IoU at or above which a lower-scoring box of the same class is suppressed.
    pub iou_threshold: f32,

    /// Side length of the square model input.
    pub model_size: u32,

    /// Horizontal distance in pixels under which regions are read top to bottom.
    pub reading_order_tolerance: f32,

    /// Number of pages analysed concurrently in batch mode.
    pub workers: usize,

    /// Class-to-block-type table of the layout model.
    pub classes: ClassMap,
}

impl PipelineConfig {
    /// Checks ranges and the class table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("conf_threshold", self.conf_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }

        if self.model_size == 0 {
            return Err(ConfigError::Invalid {
                message: "model_size must be positive".to_string(),
            });
        }

        if !(self.reading_order_tolerance.is_finite() && self.reading_order_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "reading_order_tolerance must be a non-negative number, got {}",
                    self.reading_order_tolerance
                ),
            });
        }

        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                message: "workers must be at least 1".to_string(),
            });
        }

        if self.classes.is_empty() {
            return Err(ConfigError::Invalid {
                message: "classes must not be empty".to_string(),
            });
        }

        if let Some(id) = self.classes.duplicate_id() {
            return Err(ConfigError::Invalid {
                message: format!("class id {id} is defined more than once"),
            });
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            conf_threshold: 0.5,
            iou_threshold: 0.45,
            model_size: 640,
            reading_order_tolerance: 50.0,
            workers: 1,
            classes: ClassMap::default(),
        }
    }
}

/// Application configuration structure.
///
/// String fields use `Box<str>` since they are set once and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum allowed decoded upload size in bytes
    pub max_file_size: u64,

    /// Directory path for model files
    pub model_directory: Box<str>,

    /// Layout model file, relative to `model_directory`
    pub layout_model: Box<str>,

    /// Number of model instances kept for concurrent inference
    pub inference_pool_size: usize,

    /// Register the CUDA execution provider
    pub use_cuda: bool,

    /// Host URL for the server
    pub host_url: Box<str>,

    /// Layout pipeline settings
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `path` if given, otherwise from the default
    /// path if it exists, otherwise use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load_default(),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inference_pool_size == 0 {
            return Err(ConfigError::Invalid {
                message: "inference_pool_size must be at least 1".to_string(),
            });
        }
        self.pipeline.validate()
    }

    /// Create a new configuration with default values.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024, // 256 MB
            model_directory: "models".into(),
            layout_model: "onnx/layout_detection.onnx".into(),
            inference_pool_size: 1,
            use_cuda: false,
            host_url: "0.0.0.0:3000".into(),
            pipeline: PipelineConfig::default(),
        }
    }

    /// Get the path to the layout model file.
    #[must_use]
    pub fn layout_model_path(&self) -> PathBuf {
        Path::new(&*self.model_directory).join(&*self.layout_model)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
