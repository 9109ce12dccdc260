pub mod backend_service;
pub mod channels;
pub mod dispatcher;

pub use backend_service::{AlertRequest, AlertResponse, BackendAlertService, LONG_SITTING_EVENT};
pub use channels::{LogNotifier, LogSpeech, NotificationPermission, Notifier, SpeechSynthesizer};
pub use dispatcher::{AlertBackend, AlertDispatcher};
