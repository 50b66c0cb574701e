pub mod box_utils;
pub mod config;
pub mod error;
pub mod image_utils;
pub mod letterbox;

pub use config::{AppConfig, PipelineConfig};
pub use error::ConfigError;
pub use letterbox::LetterboxMeta;
