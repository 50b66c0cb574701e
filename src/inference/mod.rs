pub mod decoder;
pub mod detector;
pub mod error;
pub mod session_pool;
pub mod yolo;

pub use detector::LayoutDetector;
pub use error::InferenceError;
pub use session_pool::SessionPool;
pub use yolo::YoloLayout;
