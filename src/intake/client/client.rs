use crate::{
    common::FrameEvent,
    error::AppError,
    intake::frame::{Frame, reader::FrameReader},
    session::TrackerCommand,
};
use tokio::sync::{
    broadcast::{self, Sender},
    mpsc,
};
use tracing::{debug, error, info};
use uuid::Uuid;

/// One connected pose-detection sidecar.
pub struct Client {
    id: Uuid,
    reader: Box<dyn FrameReader + Send + Sync>,
    shutdown_tx: Sender<()>,
    command_tx: mpsc::Sender<TrackerCommand>,
}

#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: Uuid,
    shutdown_tx: Sender<()>,
}

impl ClientHandle {
    pub fn send_shutdown(&self) -> Result<(), AppError> {
        match self.shutdown_tx.send(()) {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    "Error sending shutdown to client handle {:?}: {:?}",
                    self.id,
                    e.to_string()
                );
                Err(AppError::ClientShutdown(self.id))
            }
        }
    }
}

impl Client {
    pub fn new(
        reader: Box<dyn FrameReader + Send + Sync>,
        command_tx: mpsc::Sender<TrackerCommand>,
    ) -> (Self, ClientHandle) {
        let (shutdown_tx, _) = broadcast::channel(1);
        let id = Uuid::new_v4();
        (
            Self {
                id,
                reader,
                shutdown_tx: shutdown_tx.clone(),
                command_tx,
            },
            ClientHandle { id, shutdown_tx },
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns `Ok(false)` once the client has nothing more to say.
    async fn handle_next_message(&mut self) -> Result<bool, AppError> {
        match self.reader.read().await? {
            Some(frame) => self.route(frame).await,
            None => Ok(false),
        }
    }

    async fn route(&self, frame: Frame) -> Result<bool, AppError> {
        let command = match frame {
            Frame::Ping => {
                debug!("Ping from client {:?}", self.id);
                return Ok(true);
            }
            Frame::Detection { timestamp_ms, pose } => {
                TrackerCommand::Frame(FrameEvent::from_detection(timestamp_ms, pose.as_ref()))
            }
            Frame::Control(op) => {
                info!("Client {:?} sent control {:?}", self.id, op);
                TrackerCommand::from(op)
            }
            Frame::Shutdown => {
                debug!("Client {:?} requested shutdown", self.id);
                return Ok(false);
            }
        };
        self.command_tx.send(command).await.map_err(|e| {
            error!("Error forwarding command from client {:?}: {:?}", self.id, e);
            AppError::Client(e.to_string())
        })?;
        Ok(true)
    }

    pub async fn run(&mut self) -> Result<(), AppError> {
        info!("Running client {:?}", self.id);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    debug!("Client {:?} received shutdown", self.id);
                    break;
                }
                result = self.handle_next_message() => {
                    match result {
                        Ok(true) => {}
                        Ok(false) => {
                            info!("Client {:?} has disconnected", self.id);
                            break;
                        }
                        Err(e) => {
                            error!("Client {:?} failed: {}", self.id, e);
                            return Err(e);
                        }
                    }
                }
            }
        }
        debug!("Client {:?} finished", self.id);
        Ok(())
    }
}
