pub mod document;
pub mod inference;
pub mod server;
pub mod utils;

pub use document::{
    BatchReport, BlockType, ClassMap, DocumentAnalysis, LayoutBlock, LayoutError, PageResult,
    PipelineContext,
};
pub use inference::{InferenceError, LayoutDetector, YoloLayout};
pub use server::{create_app, start_server, AppState};
pub use utils::{AppConfig, PipelineConfig};
