use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::alert::Notifier;
use crate::common::FrameEvent;
use crate::config::TimeLimit;
use crate::i18n::Language;
use crate::intake::ControlOp;
use crate::pipeline::{FrameContext, ProcessingPipeline, StatusSnapshot};
use crate::tracker::PresenceTracker;

/// Everything the session task reacts to, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerCommand {
    Frame(FrameEvent),
    Pause,
    Resume,
    TogglePause,
    Reset,
    SetLimit(TimeLimit),
    SetLanguage(Language),
}

impl From<ControlOp> for TrackerCommand {
    fn from(op: ControlOp) -> Self {
        match op {
            ControlOp::Pause => TrackerCommand::Pause,
            ControlOp::Resume => TrackerCommand::Resume,
            ControlOp::TogglePause => TrackerCommand::TogglePause,
            ControlOp::Reset => TrackerCommand::Reset,
            ControlOp::SetLimit(limit) => TrackerCommand::SetLimit(limit),
            ControlOp::SetLanguage(language) => TrackerCommand::SetLanguage(language),
        }
    }
}

/// Owns the tracker and applies commands to it one at a time.
pub struct Session {
    tracker: PresenceTracker,
    language: Language,
    pipeline: ProcessingPipeline,
    notifier: Arc<dyn Notifier>,
    status_tx: broadcast::Sender<StatusSnapshot>,
    /// Backend alerts still being delivered.
    in_flight: Vec<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        tracker: PresenceTracker,
        language: Language,
        pipeline: ProcessingPipeline,
        notifier: Arc<dyn Notifier>,
        status_tx: broadcast::Sender<StatusSnapshot>,
    ) -> Self {
        Self {
            tracker,
            language,
            pipeline,
            notifier,
            status_tx,
            in_flight: Vec::new(),
        }
    }

    pub fn tracker(&self) -> &PresenceTracker {
        &self.tracker
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::capture(&self.tracker, self.language)
    }

    pub async fn handle(&mut self, command: TrackerCommand) {
        match command {
            TrackerCommand::Frame(event) => {
                self.handle_frame(event).await;
                return;
            }
            TrackerCommand::Pause => {
                self.tracker.pause();
                self.notifier.request_permission();
            }
            TrackerCommand::Resume => {
                self.tracker.resume();
                self.notifier.request_permission();
            }
            TrackerCommand::TogglePause => {
                self.tracker.toggle_pause();
                self.notifier.request_permission();
            }
            TrackerCommand::Reset => {
                info!("Session reset");
                self.tracker.reset();
            }
            TrackerCommand::SetLimit(limit) => {
                info!(limit_secs = limit.seconds(), "Time limit changed");
                self.tracker.set_limit(limit);
            }
            TrackerCommand::SetLanguage(language) => {
                info!(%language, "Language changed");
                self.language = language;
            }
        }
        self.publish();
    }

    async fn handle_frame(&mut self, event: FrameEvent) {
        let outcome = self.tracker.process_frame(event);
        let context = FrameContext::new(event, outcome, self.snapshot());
        match self.pipeline.process(context).await {
            Ok(mut context) => {
                debug!(
                    alert_us = context.metrics.alert_dispatch_duration_us,
                    publish_us = context.metrics.status_publish_duration_us,
                    total_us = context.metrics.total_processing_duration_us,
                    "Frame pipeline finished"
                );
                if let Some(task) = context.backend_task.take() {
                    self.in_flight.retain(|task| !task.is_finished());
                    self.in_flight.push(task);
                }
            }
            Err(e) => error!("Pipeline error: {}", e),
        }
    }

    async fn drain_in_flight(&mut self) {
        for task in self.in_flight.drain(..) {
            if let Err(e) = task.await {
                error!("Backend alert task failed: {}", e);
            }
        }
    }

    fn publish(&self) {
        let _ = self.status_tx.send(self.snapshot());
    }

    pub async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<TrackerCommand>,
        cancel_token: CancellationToken,
    ) -> Self {
        self.notifier.request_permission();
        self.publish();
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("Session cancelled");
                    break;
                }
                command = command_rx.recv() => {
                    match command {
                        Some(command) => self.handle(command).await,
                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }
        self.drain_in_flight().await;
        self
    }
}
