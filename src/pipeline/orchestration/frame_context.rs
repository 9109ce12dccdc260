use std::time::Instant;
use tokio::task::JoinHandle;

use crate::common::FrameEvent;
use crate::i18n::Language;
use crate::pipeline::status::StatusSnapshot;
use crate::tracker::FrameOutcome;

/// Context object that flows through the processing pipeline after the tracker has
/// folded in one frame.
pub struct FrameContext {
    pub event: FrameEvent,
    pub outcome: FrameOutcome,
    pub snapshot: StatusSnapshot,
    /// In-flight backend alert started by this frame, if any.
    pub backend_task: Option<JoinHandle<()>>,
    pub metrics: FrameMetrics,
    pub processing_start: Instant,
}

impl FrameContext {
    pub fn new(event: FrameEvent, outcome: FrameOutcome, snapshot: StatusSnapshot) -> Self {
        Self {
            event,
            outcome,
            snapshot,
            backend_task: None,
            metrics: FrameMetrics::new(),
            processing_start: Instant::now(),
        }
    }

    pub fn language(&self) -> Language {
        self.snapshot.language
    }
}

/// Metrics collected during frame processing
#[derive(Debug, Clone, Default)]
pub struct FrameMetrics {
    pub alert_dispatch_duration_us: u64,
    pub status_publish_duration_us: u64,
    pub total_processing_duration_us: u64,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_duration(&mut self, step: ProcessingStepType, duration_us: u64) {
        match step {
            ProcessingStepType::AlertDispatch => self.alert_dispatch_duration_us = duration_us,
            ProcessingStepType::StatusPublish => self.status_publish_duration_us = duration_us,
        }
    }

    pub fn finalize(&mut self, start_time: Instant) {
        self.total_processing_duration_us = start_time.elapsed().as_micros() as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStepType {
    AlertDispatch,
    StatusPublish,
}
