use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::intake::client::{Client, ClientHandle};
use crate::intake::frame::FramedAsyncBufferedReader;
use crate::session::TrackerCommand;

struct ClientEntry {
    handle: ClientHandle,
    task: JoinHandle<Result<(), AppError>>,
}

/// Accepts pose-detection sidecars and forwards their frames to the session.
pub struct IntakeListener {
    listener: TcpListener,
    command_tx: mpsc::Sender<TrackerCommand>,
    cancel_token: CancellationToken,
    clients: Vec<ClientEntry>,
}

impl IntakeListener {
    pub fn new(
        listener: TcpListener,
        command_tx: mpsc::Sender<TrackerCommand>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            listener,
            command_tx,
            cancel_token,
            clients: Vec::new(),
        }
    }

    pub async fn run(mut self) -> Result<(), AppError> {
        match self.listener.local_addr() {
            Ok(addr) => info!("Listening for pose detector on {}", addr),
            Err(e) => error!("Failed to read intake address: {}", e),
        }
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!("Intake listener cancelled");
                    break;
                }
                accepted = self.listener.accept() => self.handle_accepted(accepted),
            }
        }
        self.shutdown_clients().await;
        Ok(())
    }

    /// A failed accept is logged and the loop keeps listening.
    fn handle_accepted(&mut self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        match accepted {
            Ok((stream, peer)) => {
                info!("Pose detector connected from {}", peer);
                self.clients.retain(|entry| !entry.task.is_finished());
                self.spawn_client(stream);
            }
            Err(e) => error!("Error accepting connection: {}", e),
        }
    }

    fn spawn_client(&mut self, stream: TcpStream) {
        let reader = FramedAsyncBufferedReader::new(stream);
        let (mut client, handle) = Client::new(Box::new(reader), self.command_tx.clone());
        let id = client.id();
        let task = tokio::spawn(async move {
            let result = client.run().await;
            if let Err(e) = &result {
                error!("Client {:?} stopped with error: {}", id, e);
            }
            result
        });
        self.clients.push(ClientEntry { handle, task });
    }

    async fn shutdown_clients(&mut self) {
        for entry in self.clients.drain(..) {
            // A client that has not subscribed yet cannot hear the shutdown.
            if !entry.task.is_finished() && entry.handle.send_shutdown().is_err() {
                entry.task.abort();
            }
            match entry.task.await {
                Err(e) if e.is_cancelled() => debug!("Client {:?} aborted", entry.handle.id),
                Err(e) => error!("Client task {:?} panicked: {}", entry.handle.id, e),
                Ok(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FrameEvent;
    use crate::intake::frame::{ControlOp, Frame};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn forwards_frames_from_tcp_clients() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (command_tx, mut command_rx) = mpsc::channel(16);
        let cancel_token = CancellationToken::new();
        let intake = IntakeListener::new(listener, command_tx, cancel_token.clone());
        let intake_task = tokio::spawn(intake.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                &Frame::Detection {
                    timestamp_ms: 7,
                    pose: None,
                }
                .encode(),
            )
            .await
            .unwrap();
        stream
            .write_all(&Frame::Control(ControlOp::Pause).encode())
            .await
            .unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), command_rx.recv())
            .await
            .unwrap();
        assert_eq!(first, Some(TrackerCommand::Frame(FrameEvent::absent(7))));
        let second = tokio::time::timeout(Duration::from_secs(1), command_rx.recv())
            .await
            .unwrap();
        assert_eq!(second, Some(TrackerCommand::Pause));

        cancel_token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), intake_task)
            .await
            .expect("listener did not stop");
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn keeps_listening_after_a_failed_accept() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (command_tx, mut command_rx) = mpsc::channel(16);
        let cancel_token = CancellationToken::new();
        let mut intake = IntakeListener::new(listener, command_tx, cancel_token.clone());

        intake.handle_accepted(Err(io::Error::from(io::ErrorKind::ConnectionAborted)));
        assert!(intake.clients.is_empty());
        let intake_task = tokio::spawn(intake.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(&Frame::Control(ControlOp::Reset).encode())
            .await
            .unwrap();
        let received = tokio::time::timeout(Duration::from_secs(1), command_rx.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(TrackerCommand::Reset));

        cancel_token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), intake_task)
            .await
            .expect("listener did not stop");
        assert!(result.unwrap().is_ok());
    }
}
