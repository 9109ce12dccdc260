use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use lisa::alert::{AlertDispatcher, BackendAlertService, LogNotifier, LogSpeech};
use lisa::config::Configuration;
use lisa::coordinator::CoordinatorBuilder;
use lisa::error::AppError;
use lisa::logging::init_logging;
use lisa::pipeline::StatusLogger;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path = std::env::args().nth(1);
    let configuration = Configuration::load(config_path.as_deref())?;
    init_logging(configuration.log_level()?);

    let backend = BackendAlertService::new(
        &configuration.alert_endpoint,
        configuration.request_timeout(),
    )?;
    info!("Alert backend at {}", backend.url());
    let dispatcher = AlertDispatcher::new(
        Arc::new(LogNotifier::new(configuration.notifications_granted)),
        Arc::new(LogSpeech),
        backend,
        configuration.user_id.clone(),
    );

    let listener = TcpListener::bind(&configuration.listen_addr)
        .await
        .map_err(|e| AppError::Bind(e, configuration.listen_addr.clone()))?;

    let coordinator = CoordinatorBuilder::new(configuration)
        .dispatcher(dispatcher)
        .intake_listener(listener)
        .build()?;
    let status_task = StatusLogger::new(coordinator.subscribe()).spawn(coordinator.cancel_token());

    tokio::signal::ctrl_c().await.map_err(AppError::Server)?;
    info!("Shutting down");
    let session = coordinator.shutdown().await?;
    if let Err(e) = status_task.await {
        error!("Status logger task failed: {}", e);
    }
    info!(
        seconds_sat = session.tracker().timer().seconds_sat(),
        "Session ended"
    );
    Ok(())
}
