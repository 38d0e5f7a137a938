//! Server configuration: defaults, optional TOML file, then `FOXXY__*` environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | FOXXY_CONFIG | config/foxxy.toml | Path of the optional TOML file. |
//! | FOXXY__HOST | 0.0.0.0 | Bind address. |
//! | FOXXY__PORT / PORT | 3000 | Listen port. `PORT` wins (set by hosting platforms). |
//! | FOXXY__HARDENED | true | Stricter limits: rate limit, single CORS origin, 1 MB bodies, 40-turn memory. |
//! | FOXXY__ALLOWED_ORIGIN | https://spitfoxitservices.com | Only origin allowed to call `/chat` when hardened. |
//! | FOXXY__TRUST_PROXY | false | Key rate limits on the first `X-Forwarded-For` hop. Enable only behind a proxy that sets it. |
//! | FOXXY__PROVIDER_URL | Groq chat completions | OpenAI-compatible endpoint. |
//! | FOXXY__MODEL | llama-3.1-8b-instant | Model name sent to the provider. |
//! | FOXXY__UPSTREAM_TIMEOUT_SECS | 15 | Deadline for one provider call. |
//! | FOXXY__MAX_SESSIONS | 1024 | Conversation sessions kept in memory. |
//! | FOXXY__CONTENT_PATH | (embedded) | Product copy and knowledge TOML. |
//! | GROQ_API_KEY | (none) | Provider key. Never read from the file. |

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::provider::{DEFAULT_MODEL, GROQ_CHAT_URL};

pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://spitfoxitservices.com";
pub const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub hardened: bool,
    pub allowed_origin: String,
    pub trust_proxy: bool,
    pub provider_url: String,
    pub model: String,
    pub upstream_timeout_secs: u64,
    pub max_sessions: usize,
    #[serde(default)]
    pub content_path: Option<String>,
}

impl ServerConfig {
    /// Load config from file and environment. Precedence: `PORT` > `FOXXY__*` env > file > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("FOXXY_CONFIG").unwrap_or_else(|_| "config/foxxy.toml".to_string());
        let path = Path::new(&config_path);
        let builder = Self::defaults()?;
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(config::Environment::with_prefix("FOXXY").separator("__"))
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with a TOML document only; no environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("hardened", true)?
            .set_default("allowed_origin", DEFAULT_ALLOWED_ORIGIN)?
            .set_default("trust_proxy", false)?
            .set_default("provider_url", GROQ_CHAT_URL)?
            .set_default("model", DEFAULT_MODEL)?
            .set_default("upstream_timeout_secs", 15_i64)?
            .set_default("max_sessions", 1024_i64)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }

    pub fn limits(&self) -> Limits {
        if self.hardened {
            Limits::hardened()
        } else {
            Limits::simple()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            hardened: true,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            trust_proxy: false,
            provider_url: GROQ_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            upstream_timeout_secs: 15,
            max_sessions: 1024,
            content_path: None,
        }
    }
}

/// Provider key from the environment; blank counts as unset.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

/// Hardening profile. Both variants share one code path; only these numbers differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub memory_cap: usize,
    pub max_message_chars: usize,
    pub body_limit_bytes: usize,
    pub rate_limit: Option<RateLimitPolicy>,
    pub restrict_origin: bool,
    pub security_headers: bool,
    pub sanitize_input: bool,
}

impl Limits {
    pub fn hardened() -> Self {
        Self {
            memory_cap: 40,
            max_message_chars: MAX_MESSAGE_CHARS,
            body_limit_bytes: 1024 * 1024,
            rate_limit: Some(RateLimitPolicy {
                max_requests: 10,
                window: Duration::from_secs(30),
            }),
            restrict_origin: true,
            security_headers: true,
            sanitize_input: true,
        }
    }

    pub fn simple() -> Self {
        Self {
            memory_cap: 20,
            max_message_chars: MAX_MESSAGE_CHARS,
            body_limit_bytes: 2 * 1024 * 1024,
            rate_limit: None,
            restrict_origin: false,
            security_headers: false,
            sanitize_input: false,
        }
    }
}
