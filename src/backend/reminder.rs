use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ReminderError;

pub const FALLBACK_REMINDER: &str = "Take a break! (AI Connection issue)";

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Produces the text spoken back to a user who has been sitting too long.
#[async_trait]
pub trait ReminderWriter: Send + Sync {
    async fn compose(&self, duration_seconds: u64) -> String;
}

/// Fixed reminder used when no language model is configured.
#[derive(Debug, Clone, Default)]
pub struct CannedReminderWriter;

#[async_trait]
impl ReminderWriter for CannedReminderWriter {
    async fn compose(&self, duration_seconds: u64) -> String {
        format!(
            "You've been sitting for {} seconds. Stand up and stretch!",
            duration_seconds
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Asks a chat-completions endpoint for a short, varied reminder.
#[derive(Debug, Clone)]
pub struct LlmReminderWriter {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl LlmReminderWriter {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReminderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn prompt(duration_seconds: u64) -> String {
        format!(
            "The user has been sitting still for {} seconds. Write a creative, varied, and very short (max 15 words) warning to get them moving. Don't be boring.",
            duration_seconds
        )
    }

    async fn request_reminder(&self, duration_seconds: u64) -> Result<String, ReminderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::prompt(duration_seconds),
                },
            ],
        };
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReminderError::Status(status.as_u16()));
        }
        let completion = response.json::<ChatCompletion>().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ReminderError::EmptyReply)
    }
}

#[async_trait]
impl ReminderWriter for LlmReminderWriter {
    async fn compose(&self, duration_seconds: u64) -> String {
        match self.request_reminder(duration_seconds).await {
            Ok(message) => {
                debug!(%message, "Language model reply");
                message
            }
            Err(e) => {
                warn!("Falling back to canned reminder: {}", e);
                FALLBACK_REMINDER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    async fn spawn_llm(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn writer(addr: SocketAddr) -> LlmReminderWriter {
        LlmReminderWriter::new(
            format!("http://{}/chat/completions", addr),
            "deepseek-chat",
            "secret",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn canned_reminder_mentions_duration() {
        let message = CannedReminderWriter.compose(70).await;
        assert!(message.contains("70 seconds"));
    }

    #[tokio::test]
    async fn first_choice_is_the_reminder() {
        let (seen_tx, mut seen_rx) = mpsc::channel::<(Option<String>, Value)>(1);
        let router = Router::new().route(
            "/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let seen_tx = seen_tx.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    seen_tx.send((auth, body)).await.unwrap();
                    Json(json!({
                        "choices": [
                            {"message": {"role": "assistant", "content": "Up you get, chair warrior!"}},
                            {"message": {"role": "assistant", "content": "ignored"}}
                        ]
                    }))
                }
            }),
        );
        let addr = spawn_llm(router).await;

        let message = writer(addr).compose(60).await;
        assert_eq!(message, "Up you get, chair warrior!");

        let (auth, body) = seen_rx.recv().await.unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["messages"][0]["role"], "system");
        let prompt = body["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("60 seconds"));
        assert!(prompt.contains("max 15 words"));
    }

    #[tokio::test]
    async fn empty_choices_fall_back() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let addr = spawn_llm(router).await;
        assert_eq!(writer(addr).compose(10).await, FALLBACK_REMINDER);
    }

    #[tokio::test]
    async fn error_status_falls_back() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let addr = spawn_llm(router).await;
        assert_eq!(writer(addr).compose(10).await, FALLBACK_REMINDER);
    }

    #[tokio::test]
    async fn unreachable_model_falls_back() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert_eq!(writer(addr).compose(10).await, FALLBACK_REMINDER);
    }
}
