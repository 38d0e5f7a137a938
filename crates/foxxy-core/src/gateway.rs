//! Model Gateway: builds the prompt, calls the provider under a deadline and
//! records the exchange in Conversation Memory.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ChatError;
use crate::memory::{MemoryStore, Turn};
use crate::prompt::build_messages;
use crate::provider::{ChatProvider, ProviderError};

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ModelGateway {
    provider: Arc<dyn ChatProvider>,
    memory: Arc<MemoryStore>,
    system_prompt: String,
    api_key: Option<String>,
    timeout: Duration,
    empty_completion_reply: String,
}

impl ModelGateway {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        memory: Arc<MemoryStore>,
        system_prompt: String,
        empty_completion_reply: String,
    ) -> Self {
        Self {
            provider,
            memory,
            system_prompt,
            api_key: None,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
            empty_completion_reply,
        }
    }

    /// Blank keys are treated as missing.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// One model round-trip for `session`. Memory is only touched on success.
    pub async fn reply(&self, session: &str, user_message: &str) -> Result<String, ChatError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("[GATEWAY] Missing provider API key; refusing model call");
            return Err(ChatError::MissingApiKey);
        };

        let history = self.memory.snapshot(session);
        let messages = build_messages(&self.system_prompt, &history, user_message);
        tracing::debug!(
            "[GATEWAY] Calling provider: session={} history_turns={}",
            session,
            history.len()
        );

        let completion =
            match tokio::time::timeout(self.timeout, self.provider.complete(api_key, &messages)).await {
                Err(_) => {
                    tracing::warn!("[GATEWAY] Provider call exceeded {:?}", self.timeout);
                    return Err(ChatError::Timeout);
                }
                Ok(result) => result.map_err(map_provider_error)?,
            };

        let reply = completion.unwrap_or_else(|| {
            tracing::info!("[GATEWAY] Provider returned no completion text; using fallback");
            self.empty_completion_reply.clone()
        });

        self.memory.append(
            session,
            [Turn::user(user_message), Turn::assistant(reply.clone())],
        );
        Ok(reply)
    }
}

fn map_provider_error(e: ProviderError) -> ChatError {
    match e {
        ProviderError::Status { status, body } => {
            tracing::error!("[GATEWAY] Provider API error: {} {}", status, body);
            ChatError::Upstream { status, body }
        }
        ProviderError::Timeout => {
            tracing::warn!("[GATEWAY] Provider transport timed out");
            ChatError::Timeout
        }
        other => {
            tracing::error!("[GATEWAY] Provider call failed: {}", other);
            ChatError::Internal(other.to_string())
        }
    }
}
