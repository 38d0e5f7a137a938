//! Error taxonomy for the chat pipeline and for startup.

use thiserror::Error;

/// Everything that can stop a chat request. Each variant has a fixed,
/// user-facing reply in [`crate::content::Replies`]; the detail carried here
/// is for server-side logs only.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("message missing or not text")]
    MissingMessage,

    #[error("message is empty")]
    EmptyMessage,

    #[error("message too long: {len} chars (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("rate limit exceeded; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider API key is not configured")]
    MissingApiKey,

    #[error("provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("provider call timed out")]
    Timeout,

    #[error("internal: {0}")]
    Internal(String),
}

/// Coarse classification used by the HTTP layer and for log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientInput,
    PayloadTooLarge,
    RateLimit,
    Configuration,
    Upstream,
    Timeout,
    Internal,
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::MissingMessage | ChatError::EmptyMessage => ErrorKind::ClientInput,
            ChatError::MessageTooLong { .. } => ErrorKind::PayloadTooLarge,
            ChatError::RateLimited { .. } => ErrorKind::RateLimit,
            ChatError::MissingApiKey => ErrorKind::Configuration,
            ChatError::Upstream { .. } => ErrorKind::Upstream,
            ChatError::Timeout => ErrorKind::Timeout,
            ChatError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for failures the caller may simply resend.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Upstream | ErrorKind::Timeout | ErrorKind::RateLimit
        )
    }
}

/// Failures while loading configuration or content at startup.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("content file {path}: {source}")]
    ContentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("content parse: {0}")]
    ContentParse(#[from] toml::de::Error),

    #[error("content invalid: {0}")]
    ContentInvalid(String),

    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
