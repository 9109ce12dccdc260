pub mod reminder;
pub mod server;

pub use reminder::{CannedReminderWriter, FALLBACK_REMINDER, LlmReminderWriter, ReminderWriter};
pub use server::{router, serve};
