use std::sync::Arc;
use tokio::task::JoinHandle;
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt};
use tracing::{debug, error, info};

use crate::alert::backend_service::{AlertRequest, AlertResponse};
use crate::alert::channels::{NotificationPermission, Notifier, SpeechSynthesizer};
use crate::error::AlertError;
use crate::i18n::Language;
use crate::tracker::{AlertChannel, FrameOutcome};

pub type AlertBackend = BoxCloneService<AlertRequest, AlertResponse, AlertError>;

/// Fans claimed alerts out to their channels. Holds no timer state; the tracker has
/// already advanced the cursors by the time an outcome gets here.
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    speech: Arc<dyn SpeechSynthesizer>,
    backend: AlertBackend,
    user_id: String,
}

impl AlertDispatcher {
    pub fn new<S>(
        notifier: Arc<dyn Notifier>,
        speech: Arc<dyn SpeechSynthesizer>,
        backend: S,
        user_id: impl Into<String>,
    ) -> Self
    where
        S: Service<AlertRequest, Response = AlertResponse, Error = AlertError>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            notifier,
            speech,
            backend: BoxCloneService::new(backend),
            user_id: user_id.into(),
        }
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    /// Runs every channel claimed in `outcome`. Returns the in-flight backend call, if any.
    pub fn dispatch(&self, outcome: &FrameOutcome, language: Language) -> Option<JoinHandle<()>> {
        let mut backend_task = None;
        for channel in &outcome.alerts {
            match channel {
                AlertChannel::Notification => {
                    self.notify(language);
                }
                AlertChannel::Backend => {
                    backend_task = Some(self.send_backend_alert(outcome.seconds_sat, language));
                }
            }
        }
        backend_task
    }

    /// Shows the "time up" notification. Returns false when permission is missing.
    pub fn notify(&self, language: Language) -> bool {
        if self.notifier.permission() != NotificationPermission::Granted {
            debug!("Notification permission not granted, skipping notification");
            return false;
        }
        let translations = language.translations();
        self.notifier
            .show(translations.title, translations.status_time_up);
        true
    }

    /// Fire-and-forget backend call; the reply, if any, is spoken.
    pub fn send_backend_alert(&self, seconds_sat: u64, language: Language) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let speech = Arc::clone(&self.speech);
        let request = AlertRequest::long_sitting(self.user_id.clone(), seconds_sat);
        info!(duration_seconds = seconds_sat, "sending long sitting alert");
        tokio::spawn(async move {
            match backend.oneshot(request).await {
                Ok(AlertResponse {
                    message: Some(message),
                }) => {
                    speech.speak(&message, language.speech_tag());
                }
                Ok(AlertResponse { message: None }) => {
                    debug!("Alert backend replied without a message");
                }
                Err(e) => {
                    error!("Backend connection failed: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::channels::testing::{RecordingNotifier, RecordingSpeech};
    use crate::common::FrameEvent;
    use crate::config::TimeLimit;
    use crate::tracker::PresenceTracker;
    use std::sync::Mutex;

    fn replying(message: Option<&'static str>) -> AlertBackend {
        BoxCloneService::new(tower::service_fn(move |_request: AlertRequest| async move {
            Ok::<_, AlertError>(AlertResponse {
                message: message.map(str::to_string),
            })
        }))
    }

    fn failing() -> AlertBackend {
        BoxCloneService::new(tower::service_fn(|_request: AlertRequest| async {
            Err::<AlertResponse, _>(AlertError::Status(503))
        }))
    }

    fn dispatcher(
        permission: NotificationPermission,
        backend: AlertBackend,
    ) -> (AlertDispatcher, Arc<RecordingNotifier>, Arc<RecordingSpeech>) {
        let notifier = Arc::new(RecordingNotifier::new(permission));
        let speech = Arc::new(RecordingSpeech::default());
        let dispatcher = AlertDispatcher::new(notifier.clone(), speech.clone(), backend, "user_001");
        (dispatcher, notifier, speech)
    }

    fn outcome(seconds_sat: u64, alerts: Vec<AlertChannel>) -> FrameOutcome {
        FrameOutcome {
            seconds_sat,
            over_limit: true,
            alerts,
            ..FrameOutcome::default()
        }
    }

    #[tokio::test]
    async fn notification_uses_active_language() {
        let (dispatcher, notifier, _) =
            dispatcher(NotificationPermission::Granted, replying(None));
        dispatcher.dispatch(&outcome(10, vec![AlertChannel::Notification]), Language::Zh);
        assert_eq!(
            notifier.shown(),
            vec![("L.I.S.A.".to_string(), "⚠️ 时间到!".to_string())]
        );
    }

    #[tokio::test]
    async fn notification_is_skipped_without_permission() {
        let (dispatcher, notifier, _) = dispatcher(NotificationPermission::Denied, replying(None));
        assert!(!dispatcher.notify(Language::En));
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn backend_reply_is_spoken_in_active_language() {
        let (dispatcher, _, speech) =
            dispatcher(NotificationPermission::Granted, replying(Some("Move it!")));
        let task = dispatcher
            .dispatch(&outcome(70, vec![AlertChannel::Backend]), Language::Zh)
            .expect("backend task");
        task.await.unwrap();
        assert_eq!(
            speech.spoken(),
            vec![("Move it!".to_string(), "zh-CN".to_string())]
        );
    }

    #[tokio::test]
    async fn backend_failure_is_swallowed() {
        let (dispatcher, _, speech) = dispatcher(NotificationPermission::Granted, failing());
        let task = dispatcher
            .dispatch(&outcome(10, vec![AlertChannel::Backend]), Language::En)
            .expect("backend task");
        assert!(task.await.is_ok());
        assert!(speech.spoken().is_empty());
    }

    #[tokio::test]
    async fn backend_request_carries_user_and_duration() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let backend = BoxCloneService::new(tower::service_fn(move |request: AlertRequest| {
            let recorded = Arc::clone(&recorded);
            async move {
                recorded.lock().unwrap().push(request);
                Ok::<_, AlertError>(AlertResponse::default())
            }
        }));
        let (dispatcher, _, _) = dispatcher(NotificationPermission::Granted, backend);
        dispatcher.send_backend_alert(70, Language::En).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user_id, "user_001");
        assert_eq!(seen[0].event, "long_sitting");
        assert_eq!(seen[0].duration_seconds, 70);
    }

    #[tokio::test]
    async fn failed_backend_call_leaves_cursor_on_current_second() {
        let (dispatcher, _, _) = dispatcher(NotificationPermission::Granted, failing());
        let mut tracker = PresenceTracker::new(TimeLimit::TenSeconds);
        let mut tasks = Vec::new();
        for i in 0..=10 {
            let outcome = tracker.process_frame(FrameEvent::present(i * 1_000));
            if let Some(task) = dispatcher.dispatch(&outcome, Language::En) {
                tasks.push(task);
            }
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(tracker.cursor().last_backend_alerted_second, Some(10));
        assert_eq!(tracker.timer().accumulated_ms(), 10_000);
    }
}
