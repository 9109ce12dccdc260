use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lisa::backend::{CannedReminderWriter, LlmReminderWriter, ReminderWriter, serve};
use lisa::config::BackendConfiguration;
use lisa::error::AppError;
use lisa::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path = std::env::args().nth(1);
    let configuration = BackendConfiguration::load(config_path.as_deref())?;
    init_logging(configuration.log_level()?);

    let writer: Arc<dyn ReminderWriter> = match &configuration.llm_api_key {
        Some(api_key) => {
            info!(model = %configuration.llm_model, "Using language model for reminders");
            Arc::new(LlmReminderWriter::new(
                configuration.llm_url.clone(),
                configuration.llm_model.clone(),
                api_key.clone(),
                configuration.llm_timeout(),
            )?)
        }
        None => {
            warn!("No language model key configured, using canned reminders");
            Arc::new(CannedReminderWriter)
        }
    };

    let listener = TcpListener::bind(&configuration.bind_addr)
        .await
        .map_err(|e| AppError::Bind(e, configuration.bind_addr.clone()))?;

    let cancel_token = CancellationToken::new();
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
        shutdown.cancel();
    });

    serve(listener, writer, cancel_token).await
}
