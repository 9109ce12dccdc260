pub mod presence_tracker;
pub mod session;

pub use presence_tracker::{AlertChannel, FrameOutcome, PresenceTracker};
pub use session::{AlertCursor, SessionTimer, TrackerPhase};
