use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::i18n::Language;
use crate::tracker::{PresenceTracker, TrackerPhase};

/// Read-only view of the session handed to render observers after every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub phase: TrackerPhase,
    pub accumulated_ms: u64,
    pub seconds_sat: u64,
    pub limit_seconds: u64,
    pub present: bool,
    pub paused: bool,
    pub over_limit: bool,
    pub language: Language,
}

impl StatusSnapshot {
    pub fn capture(tracker: &PresenceTracker, language: Language) -> Self {
        let timer = tracker.timer();
        Self {
            phase: tracker.phase(),
            accumulated_ms: timer.accumulated_ms(),
            seconds_sat: timer.seconds_sat(),
            limit_seconds: timer.limit().seconds(),
            present: tracker.is_person_present(),
            paused: timer.is_paused(),
            over_limit: timer.is_over_limit(),
            language,
        }
    }

    pub fn status_line(&self) -> String {
        let t = self.language.translations();
        let line = if self.over_limit {
            format!(
                "{} ({}s / {}s)",
                t.status_time_up, self.seconds_sat, self.limit_seconds
            )
        } else {
            match self.phase {
                TrackerPhase::AwaitingInput => t.status_init.to_string(),
                TrackerPhase::TrackingPresent => {
                    format!("{} {}s", t.status_user_detected, self.seconds_sat)
                }
                TrackerPhase::TrackingAbsent => {
                    format!("{} {}s", t.status_user_away, self.seconds_sat)
                }
            }
        };
        if self.paused {
            format!("{} {}", line, t.status_paused)
        } else {
            line
        }
    }
}

/// Default render observer: logs the status line whenever it changes.
pub struct StatusLogger {
    status_rx: broadcast::Receiver<StatusSnapshot>,
    last_line: Option<String>,
}

impl StatusLogger {
    pub fn new(status_rx: broadcast::Receiver<StatusSnapshot>) -> Self {
        Self {
            status_rx,
            last_line: None,
        }
    }

    /// Returns the line to render if it differs from the previous one.
    fn observe(&mut self, snapshot: &StatusSnapshot) -> Option<String> {
        let line = snapshot.status_line();
        if self.last_line.as_deref() == Some(line.as_str()) {
            return None;
        }
        self.last_line = Some(line.clone());
        Some(line)
    }

    pub fn spawn(mut self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    received = self.status_rx.recv() => {
                        match received {
                            Ok(snapshot) => {
                                if let Some(line) = self.observe(&snapshot) {
                                    info!("{}", line);
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                warn!("Status logger lagged, skipped {} updates", skipped);
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        })
    }
}
