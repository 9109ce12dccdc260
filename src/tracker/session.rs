use crate::config::TimeLimit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackerPhase {
    #[default]
    AwaitingInput,
    TrackingPresent,
    TrackingAbsent,
}

/// Seated time accumulated since the last reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionTimer {
    accumulated_ms: u64,
    paused: bool,
    limit: TimeLimit,
}

impl SessionTimer {
    pub fn new(limit: TimeLimit) -> Self {
        Self {
            accumulated_ms: 0,
            paused: false,
            limit,
        }
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn limit(&self) -> TimeLimit {
        self.limit
    }

    pub fn seconds_sat(&self) -> u64 {
        self.accumulated_ms / 1000
    }

    pub fn is_over_limit(&self) -> bool {
        self.seconds_sat() >= self.limit.seconds()
    }

    pub fn has_reached_limit(&self) -> bool {
        self.accumulated_ms >= self.limit.millis()
    }

    /// Adds `dt_ms` unless paused. Returns whether anything was added.
    pub fn advance(&mut self, dt_ms: u64) -> bool {
        if self.paused {
            return false;
        }
        self.accumulated_ms = self.accumulated_ms.saturating_add(dt_ms);
        true
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_limit(&mut self, limit: TimeLimit) {
        self.limit = limit;
    }

    pub fn clear(&mut self) {
        self.accumulated_ms = 0;
    }
}

/// Last second at which each alert channel fired. `None` means it has not fired since the
/// last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertCursor {
    pub last_notified_second: Option<u64>,
    pub last_backend_alerted_second: Option<u64>,
}

impl AlertCursor {
    pub fn clear(&mut self) {
        self.last_notified_second = None;
        self.last_backend_alerted_second = None;
    }

    pub fn is_clear(&self) -> bool {
        self.last_notified_second.is_none() && self.last_backend_alerted_second.is_none()
    }
}
