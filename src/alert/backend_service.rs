use chrono::Utc;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;
use tracing::debug;

use crate::error::AlertError;

pub const LONG_SITTING_EVENT: &str = "long_sitting";

/// Body of `POST /api/alert`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub event: String,
    pub duration_seconds: u64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl AlertRequest {
    pub fn long_sitting(user_id: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            user_id: user_id.into(),
            event: LONG_SITTING_EVENT.to_string(),
            duration_seconds,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AlertResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Posts alerts to the backend. One attempt per call, no retry.
#[derive(Debug, Clone)]
pub struct BackendAlertService {
    client: Client,
    url: String,
}

impl BackendAlertService {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, AlertError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: format!("{}/api/alert", endpoint.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Service<AlertRequest> for BackendAlertService {
    type Response = AlertResponse;
    type Error = AlertError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AlertRequest) -> Self::Future {
        let client = self.client.clone();
        let url = self.url.clone();
        Box::pin(async move {
            debug!(url = %url, duration_seconds = request.duration_seconds, "posting alert");
            let response = client.post(&url).json(&request).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(AlertError::Status(status.as_u16()));
            }
            Ok(response.json::<AlertResponse>().await?)
        })
    }
}
