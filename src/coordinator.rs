use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    alert::AlertDispatcher,
    config::{Configuration, TimeLimit},
    error::AppError,
    i18n::Language,
    intake::IntakeListener,
    pipeline::{AlertDispatchStep, ProcessingPipeline, StatusPublishStep, StatusSnapshot},
    session::{Session, TrackerCommand},
    tracker::PresenceTracker,
};

/// Wires intake, session and alert dispatch together and owns their tasks.
pub struct Coordinator {
    session_task: Option<JoinHandle<Session>>,
    intake_task: Option<JoinHandle<Result<(), AppError>>>,
    cancel_token: CancellationToken,
    command_tx: mpsc::Sender<TrackerCommand>,
    status_tx: broadcast::Sender<StatusSnapshot>,
}

impl Coordinator {
    fn new(
        configuration: Configuration,
        dispatcher: AlertDispatcher,
        intake_listener: Option<TcpListener>,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(configuration.command_buffer_size);
        let (status_tx, _) = broadcast::channel(configuration.status_buffer_size);

        let notifier = dispatcher.notifier();
        let pipeline = ProcessingPipeline::new()
            .add_step(Box::new(AlertDispatchStep::new(dispatcher)))
            .add_step(Box::new(StatusPublishStep::new(status_tx.clone())));
        info!(
            limit_secs = configuration.time_limit.seconds(),
            language = %configuration.language,
            steps = ?pipeline.step_names(),
            "Starting session"
        );
        let session = Session::new(
            PresenceTracker::new(configuration.time_limit),
            configuration.language,
            pipeline,
            notifier,
            status_tx.clone(),
        );
        let session_task = tokio::spawn(session.run(command_rx, cancel_token.clone()));

        let intake_task = intake_listener.map(|listener| {
            let intake = IntakeListener::new(listener, command_tx.clone(), cancel_token.clone());
            tokio::spawn(intake.run())
        });

        Self {
            session_task: Some(session_task),
            intake_task,
            cancel_token,
            command_tx,
            status_tx,
        }
    }

    /// Sender for injecting frames and controls directly, bypassing intake.
    pub fn commands(&self) -> mpsc::Sender<TrackerCommand> {
        self.command_tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusSnapshot> {
        self.status_tx.subscribe()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Stops every task and waits for them. Returns the final session state.
    pub async fn shutdown(mut self) -> Result<Session, AppError> {
        self.stop();
        if let Some(intake_task) = self.intake_task.take() {
            match intake_task.await {
                Ok(Err(e)) => error!("Intake listener failed: {}", e),
                Err(e) => error!("Intake task panicked: {}", e),
                Ok(Ok(())) => {}
            }
        }
        let session_task = self
            .session_task
            .take()
            .ok_or_else(|| AppError::Session("Session already stopped".to_string()))?;
        session_task
            .await
            .map_err(|e| AppError::Session(e.to_string()))
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    dispatcher: Option<AlertDispatcher>,
    intake_listener: Option<TcpListener>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            dispatcher: None,
            intake_listener: None,
        }
    }

    // Overrides the configured command buffer size.
    pub fn command_buffer_size(mut self, command_buffer_size: usize) -> Self {
        self.configuration.command_buffer_size = command_buffer_size;
        self
    }

    // Overrides the configured status buffer size.
    pub fn status_buffer_size(mut self, status_buffer_size: usize) -> Self {
        self.configuration.status_buffer_size = status_buffer_size;
        self
    }

    pub fn time_limit(mut self, time_limit: TimeLimit) -> Self {
        self.configuration.time_limit = time_limit;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.configuration.language = language;
        self
    }

    pub fn dispatcher(mut self, dispatcher: AlertDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    // Without a listener, frames only arrive through `Coordinator::commands`.
    pub fn intake_listener(mut self, listener: TcpListener) -> Self {
        self.intake_listener = Some(listener);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let dispatcher = self
            .dispatcher
            .ok_or(AppError::Pipeline("Dispatcher not set".to_string()))?;
        Ok(Coordinator::new(
            self.configuration,
            dispatcher,
            self.intake_listener,
        ))
    }
}
