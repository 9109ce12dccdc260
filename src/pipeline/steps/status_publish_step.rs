use async_trait::async_trait;
use std::time::Instant;
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::pipeline::orchestration::{FrameContext, ProcessingStep, ProcessingStepType};
use crate::pipeline::status::StatusSnapshot;

/// Publishes the post-frame snapshot to render observers.
#[derive(Clone)]
pub struct StatusPublishStep {
    status_tx: broadcast::Sender<StatusSnapshot>,
}

impl StatusPublishStep {
    pub fn new(status_tx: broadcast::Sender<StatusSnapshot>) -> Self {
        Self { status_tx }
    }
}

#[async_trait]
impl ProcessingStep for StatusPublishStep {
    async fn process(&mut self, context: &mut FrameContext) -> Result<(), AppError> {
        let step_start = Instant::now();
        // No subscribers is fine.
        let _ = self.status_tx.send(context.snapshot.clone());
        let duration = step_start.elapsed().as_micros() as u64;
        context
            .metrics
            .record_duration(ProcessingStepType::StatusPublish, duration);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "StatusPublishStep"
    }
}
