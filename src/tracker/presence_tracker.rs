use tracing::{debug, info};

use crate::common::FrameEvent;
use crate::config::TimeLimit;
use crate::tracker::session::{AlertCursor, SessionTimer, TrackerPhase};

const NOTIFICATION_INTERVAL_SECS: u64 = 10;
const BACKEND_ALERT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertChannel {
    Notification,
    Backend,
}

/// What a single frame did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    pub phase: TrackerPhase,
    pub seconds_sat: u64,
    pub over_limit: bool,
    pub auto_reset: bool,
    /// Channels whose cursor was claimed on this frame, in firing order.
    pub alerts: Vec<AlertChannel>,
}

impl FrameOutcome {
    pub fn fires(&self, channel: AlertChannel) -> bool {
        self.alerts.contains(&channel)
    }
}

/// Presence/timer state machine. Owns the session timer and alert cursors and is the only
/// writer of both.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    timer: SessionTimer,
    cursor: AlertCursor,
    phase: TrackerPhase,
    last_frame_ms: Option<u64>,
}

impl PresenceTracker {
    pub fn new(limit: TimeLimit) -> Self {
        Self {
            timer: SessionTimer::new(limit),
            ..Self::default()
        }
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn cursor(&self) -> &AlertCursor {
        &self.cursor
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    pub fn limit(&self) -> TimeLimit {
        self.timer.limit()
    }

    pub fn is_person_present(&self) -> bool {
        self.phase == TrackerPhase::TrackingPresent
    }

    /// Folds one frame into the session and claims any alert channel that is due.
    pub fn process_frame(&mut self, event: FrameEvent) -> FrameOutcome {
        let dt_ms = match self.last_frame_ms {
            Some(last) => event.timestamp_ms.saturating_sub(last),
            None => 0,
        };
        self.last_frame_ms = Some(event.timestamp_ms);

        let mut auto_reset = false;
        if event.person_present {
            self.timer.advance(dt_ms);
            self.phase = TrackerPhase::TrackingPresent;
        } else {
            if self.timer.has_reached_limit() {
                info!(
                    seconds_sat = self.timer.seconds_sat(),
                    limit_secs = self.timer.limit().seconds(),
                    "user left after reaching the limit, resetting session"
                );
                self.clear_session();
                auto_reset = true;
            }
            self.phase = TrackerPhase::TrackingAbsent;
        }

        let alerts = self.claim_due_alerts();
        debug!(
            timestamp_ms = event.timestamp_ms,
            present = event.person_present,
            dt_ms,
            accumulated_ms = self.timer.accumulated_ms(),
            alerts = alerts.len(),
            "processed frame"
        );

        FrameOutcome {
            phase: self.phase,
            seconds_sat: self.timer.seconds_sat(),
            over_limit: self.timer.is_over_limit(),
            auto_reset,
            alerts,
        }
    }

    fn claim_due_alerts(&mut self) -> Vec<AlertChannel> {
        let mut alerts = Vec::new();
        if !self.timer.is_over_limit() {
            return alerts;
        }

        let seconds_sat = self.timer.seconds_sat();
        let elapsed_over_limit = seconds_sat - self.timer.limit().seconds();

        if elapsed_over_limit % NOTIFICATION_INTERVAL_SECS == 0
            && self.cursor.last_notified_second != Some(seconds_sat)
        {
            self.cursor.last_notified_second = Some(seconds_sat);
            alerts.push(AlertChannel::Notification);
        }

        if elapsed_over_limit % BACKEND_ALERT_INTERVAL_SECS == 0
            && self.cursor.last_backend_alerted_second != Some(seconds_sat)
        {
            self.cursor.last_backend_alerted_second = Some(seconds_sat);
            alerts.push(AlertChannel::Backend);
        }

        alerts
    }

    pub fn pause(&mut self) {
        self.timer.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.timer.set_paused(false);
    }

    pub fn toggle_pause(&mut self) -> bool {
        let paused = !self.timer.is_paused();
        self.timer.set_paused(paused);
        paused
    }

    /// Manual reset. Keeps the pause flag, limit and last frame timestamp.
    pub fn reset(&mut self) {
        self.clear_session();
    }

    /// Takes effect on the next frame; accumulated time and cursors are kept.
    pub fn set_limit(&mut self, limit: TimeLimit) {
        self.timer.set_limit(limit);
    }

    fn clear_session(&mut self) {
        self.timer.clear();
        self.cursor.clear();
    }
}
