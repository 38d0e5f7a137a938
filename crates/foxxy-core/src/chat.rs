//! Chat pipeline: validate → intent short-circuit → model gateway.
//! HTTP-agnostic; the gateway binary maps results onto status codes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::{Limits, ServerConfig};
use crate::content::{Content, Replies};
use crate::error::ChatError;
use crate::gateway::{ModelGateway, DEFAULT_UPSTREAM_TIMEOUT};
use crate::intent::{Intent, IntentClassifier};
use crate::memory::MemoryStore;
use crate::prompt::system_prompt;
use crate::provider::ChatProvider;
use crate::suggestions::Suggester;

/// Response body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip)]
    pub intent: Option<Intent>,
}

impl ChatReply {
    /// Reply text only; used for error bodies.
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            suggestions: Vec::new(),
            intent: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub limits: Limits,
    pub api_key: Option<String>,
    pub upstream_timeout: Duration,
    pub max_sessions: usize,
}

impl ServiceOptions {
    pub fn from_config(config: &ServerConfig, api_key: Option<String>) -> Self {
        Self {
            limits: config.limits(),
            api_key,
            upstream_timeout: config.upstream_timeout(),
            max_sessions: config.max_sessions,
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            limits: Limits::hardened(),
            api_key: None,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            max_sessions: 1024,
        }
    }
}

pub struct ChatService {
    classifier: IntentClassifier,
    suggester: Suggester,
    gateway: ModelGateway,
    replies: Replies,
    limits: Limits,
    booking_url: String,
}

impl ChatService {
    pub fn new(content: Content, provider: Arc<dyn ChatProvider>, options: ServiceOptions) -> Self {
        let memory = Arc::new(MemoryStore::new(options.limits.memory_cap, options.max_sessions));
        let gateway = ModelGateway::new(
            provider,
            memory,
            system_prompt(&content),
            content.replies.empty_completion.clone(),
        )
        .with_api_key(options.api_key)
        .with_timeout(options.upstream_timeout);

        if !gateway.has_api_key() {
            tracing::warn!("[CHAT] No provider API key configured; model replies will fail with a configuration error");
        }

        Self {
            classifier: IntentClassifier::new(content.intents),
            suggester: Suggester::new(content.suggestions, content.default_suggestions),
            gateway,
            replies: content.replies,
            limits: options.limits,
            booking_url: content.booking_url,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn memory(&self) -> &MemoryStore {
        self.gateway.memory()
    }

    pub fn booking_url(&self) -> &str {
        &self.booking_url
    }

    /// The fixed, user-facing text for `err`.
    pub fn error_reply(&self, err: &ChatError) -> &str {
        self.replies.for_error(err)
    }

    /// Checks, in order: text present, non-empty after trim, within the length limit.
    /// The limit applies to what the visitor typed; escaping happens afterwards.
    /// Returns the trimmed (and, when hardened, escaped) message.
    pub fn validate(&self, message: Option<&serde_json::Value>) -> Result<String, ChatError> {
        let raw = match message {
            Some(serde_json::Value::String(s)) => s,
            _ => return Err(ChatError::MissingMessage),
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let len = trimmed.chars().count();
        if len > self.limits.max_message_chars {
            return Err(ChatError::MessageTooLong {
                len,
                max: self.limits.max_message_chars,
            });
        }
        if self.limits.sanitize_input {
            Ok(escape_markup(trimmed))
        } else {
            Ok(trimmed.to_string())
        }
    }

    pub async fn respond(
        &self,
        session: &str,
        message: Option<&serde_json::Value>,
    ) -> Result<ChatReply, ChatError> {
        let text = self.validate(message)?;
        let suggestions = self.suggester.suggest(&text);

        if let Some(rule) = self.classifier.classify(&text) {
            tracing::info!("[CHAT] Intent short-circuit: {}", rule.kind.as_str());
            return Ok(ChatReply {
                reply: rule.reply.clone(),
                suggestions,
                intent: Some(rule.kind),
            });
        }

        let reply = self.gateway.reply(session, &text).await?;
        Ok(ChatReply {
            reply,
            suggestions,
            intent: None,
        })
    }
}

/// Neutralizes markup in user input before it reaches the prompt or logs.
fn escape_markup(s: &str) -> String {
    s.replace('<', "&lt;")
}
