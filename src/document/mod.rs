pub mod analysis;
pub mod bounds;
pub mod detection;
pub mod error;
pub mod layout_block;
pub mod page;
pub mod region;

pub use analysis::{
    BatchOptions, BatchReport, DocumentAnalysis, JsonFileSink, LayoutPipeline, PageResult,
    PageSink, PipelineContext,
};
pub use bounds::Bounds;
pub use detection::{Detection, RawCandidate};
pub use error::LayoutError;
pub use layout_block::{BlockType, ClassMap, ClassRole, ClassSpec, LayoutBlock};
pub use region::{Group, RegionGrouper};
