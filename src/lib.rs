pub mod alert;
pub mod backend;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod i18n;
pub mod intake;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod tracker;

pub use config::{BackendConfiguration, Configuration, TimeLimit};
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::AppError;
pub use i18n::Language;
pub use session::TrackerCommand;
