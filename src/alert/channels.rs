use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

/// Local notification primitive.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;
    fn request_permission(&self) -> NotificationPermission;
    fn show(&self, title: &str, body: &str);
}

/// Speech synthesis primitive.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, language_tag: &str);
}

/// Writes notifications to the log. Permission is fixed at construction.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    permission: NotificationPermission,
}

impl LogNotifier {
    pub fn new(granted: bool) -> Self {
        let permission = if granted {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        };
        Self { permission }
    }
}

impl Notifier for LogNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn request_permission(&self) -> NotificationPermission {
        if self.permission != NotificationPermission::Granted {
            warn!("Notifications are disabled in the configuration");
        }
        self.permission
    }

    fn show(&self, title: &str, body: &str) {
        info!(title, body, "notification");
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogSpeech;

impl SpeechSynthesizer for LogSpeech {
    fn speak(&self, text: &str, language_tag: &str) {
        info!(lang = language_tag, "speaking: {}", text);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    pub struct RecordingNotifier {
        pub permission: NotificationPermission,
        pub shown: Mutex<Vec<(String, String)>>,
        pub requests: Mutex<usize>,
    }

    impl RecordingNotifier {
        pub fn new(permission: NotificationPermission) -> Self {
            Self {
                permission,
                shown: Mutex::new(Vec::new()),
                requests: Mutex::new(0),
            }
        }

        pub fn shown(&self) -> Vec<(String, String)> {
            self.shown.lock().unwrap().clone()
        }

        pub fn requests(&self) -> usize {
            *self.requests.lock().unwrap()
        }
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> NotificationPermission {
            self.permission
        }

        fn request_permission(&self) -> NotificationPermission {
            *self.requests.lock().unwrap() += 1;
            self.permission
        }

        fn show(&self, title: &str, body: &str) {
            self.shown
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingSpeech {
        pub spoken: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSpeech {
        pub fn spoken(&self) -> Vec<(String, String)> {
            self.spoken.lock().unwrap().clone()
        }
    }

    impl SpeechSynthesizer for RecordingSpeech {
        fn speak(&self, text: &str, language_tag: &str) {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), language_tag.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_reports_configured_permission() {
        assert_eq!(
            LogNotifier::new(true).request_permission(),
            NotificationPermission::Granted
        );
        assert_eq!(
            LogNotifier::new(false).permission(),
            NotificationPermission::Denied
        );
    }
}
