pub mod batch;
pub mod pipeline;
pub mod result;
pub mod synthesis;

pub use batch::{BatchOptions, JsonFileSink, PageSink};
pub use pipeline::{LayoutPipeline, PipelineContext};
pub use result::{BatchReport, DocumentAnalysis, PageFailure, PageResult};
pub use synthesis::BlockSynthesizer;
