pub mod frame_event;
pub mod pose;

pub use frame_event::FrameEvent;
pub use pose::{Landmark, PoseResult};
