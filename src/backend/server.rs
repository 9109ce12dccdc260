use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::alert::{AlertRequest, AlertResponse};
use crate::backend::reminder::ReminderWriter;
use crate::error::AppError;

#[derive(Clone)]
struct BackendState {
    writer: Arc<dyn ReminderWriter>,
}

pub fn router(writer: Arc<dyn ReminderWriter>) -> Router {
    Router::new()
        .route("/api/alert", post(handle_alert))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
        .with_state(BackendState { writer })
}

async fn log_request(request: Request, next: Next) -> Response {
    info!("Request: {} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn handle_alert(
    State(state): State<BackendState>,
    payload: Result<Json<AlertRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected alert body: {}", rejection);
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };
    info!(
        user_id = %request.user_id,
        event = %request.event,
        duration_seconds = request.duration_seconds,
        "Alert received"
    );
    let message = state.writer.compose(request.duration_seconds).await;
    info!(%message, "Reminder composed");
    Json(AlertResponse {
        message: Some(message),
    })
    .into_response()
}

pub async fn serve(
    listener: TcpListener,
    writer: Arc<dyn ReminderWriter>,
    cancel_token: CancellationToken,
) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Alert backend listening on http://{}", addr);
    }
    axum::serve(listener, router(writer))
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await
        .map_err(AppError::Server)
}
