//! Chat-completion provider seam and the OpenAI-compatible (Groq) implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SetupError;
use crate::memory::Turn;

pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Wire message for the chat-completions API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role().as_str().to_string(),
            content: turn.content().to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider request timed out")]
    Timeout,

    #[error("provider request: {0}")]
    Transport(String),

    #[error("provider response parse: {0}")]
    Decode(String),
}

/// Something that turns a message list into a completion.
/// `Ok(None)` means the provider answered but produced no text.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, ProviderError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` over reqwest. Defaults to Groq.
/// Deadlines are enforced by the caller; this client sets none of its own.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self, SetupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("foxxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, ProviderError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        let text = res.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/openai/v1/chat/completions", addr)
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("hello")]
    }

    #[tokio::test]
    async fn sends_model_messages_and_bearer_key() {
        let app = Router::new().route(
            "/openai/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers["authorization"], "Bearer test-key");
                assert_eq!(body["model"], "llama-3.1-8b-instant");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "hello");
                Json(serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  We do AI automation.  " } }]
                }))
            }),
        );
        let url = spawn_upstream(app).await;
        let provider = OpenAiCompatibleProvider::new(url, DEFAULT_MODEL).unwrap();
        let reply = provider.complete("test-key", &messages()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("We do AI automation."));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let app = Router::new().route(
            "/openai/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );
        let url = spawn_upstream(app).await;
        let provider = OpenAiCompatibleProvider::new(url, DEFAULT_MODEL).unwrap();
        match provider.complete("k", &messages()).await {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let provider =
            OpenAiCompatibleProvider::new(format!("http://{}/v1/chat/completions", addr), DEFAULT_MODEL)
                .unwrap();
        assert!(matches!(
            provider.complete("k", &messages()).await,
            Err(ProviderError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn missing_choices_yield_none() {
        let app = Router::new().route(
            "/openai/v1/chat/completions",
            post(|| async { Json(serde_json::json!({ "choices": [] })) }),
        );
        let url = spawn_upstream(app).await;
        let provider = OpenAiCompatibleProvider::new(url, DEFAULT_MODEL).unwrap();
        assert_eq!(provider.complete("k", &messages()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let app = Router::new().route(
            "/openai/v1/chat/completions",
            post(|| async { "not json" }),
        );
        let url = spawn_upstream(app).await;
        let provider = OpenAiCompatibleProvider::new(url, DEFAULT_MODEL).unwrap();
        assert!(matches!(
            provider.complete("k", &messages()).await,
            Err(ProviderError::Decode(_))
        ));
    }
}
