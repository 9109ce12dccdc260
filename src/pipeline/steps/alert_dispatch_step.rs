use async_trait::async_trait;
use std::time::Instant;

use crate::alert::AlertDispatcher;
use crate::error::AppError;
use crate::pipeline::orchestration::{FrameContext, ProcessingStep, ProcessingStepType};

/// Hands the alerts claimed by the tracker to the dispatcher.
pub struct AlertDispatchStep {
    dispatcher: AlertDispatcher,
}

impl AlertDispatchStep {
    pub fn new(dispatcher: AlertDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl ProcessingStep for AlertDispatchStep {
    async fn process(&mut self, context: &mut FrameContext) -> Result<(), AppError> {
        let step_start = Instant::now();

        if !context.outcome.alerts.is_empty() {
            context.backend_task = self
                .dispatcher
                .dispatch(&context.outcome, context.language());
        }

        let duration = step_start.elapsed().as_micros() as u64;
        context
            .metrics
            .record_duration(ProcessingStepType::AlertDispatch, duration);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "AlertDispatchStep"
    }
}
