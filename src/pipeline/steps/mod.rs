pub mod alert_dispatch_step;
pub mod status_publish_step;

pub use alert_dispatch_step::AlertDispatchStep;
pub use status_publish_step::StatusPublishStep;
