pub mod orchestration;
pub mod status;
pub mod steps;

pub use orchestration::{FrameContext, ProcessingPipeline, ProcessingStep};
pub use status::{StatusLogger, StatusSnapshot};
pub use steps::{AlertDispatchStep, StatusPublishStep};
