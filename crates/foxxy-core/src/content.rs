//! Product copy and knowledge, loaded from TOML.
//!
//! The wording of intents, canned replies and suggestions is data, not logic:
//! the embedded `assets/content.toml` is the default and a file at
//! `content_path` replaces it wholesale.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ChatError, SetupError};
use crate::intent::IntentRule;
use crate::knowledge::KnowledgeDocument;
use crate::suggestions::SuggestionRule;

const EMBEDDED_CONTENT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/content.toml"));

/// Fixed replies for every failure path plus the empty-completion fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Replies {
    pub missing_message: String,
    pub empty_message: String,
    pub too_long: String,
    pub rate_limited: String,
    pub missing_api_key: String,
    pub upstream: String,
    pub timeout: String,
    pub internal: String,
    pub empty_completion: String,
    pub out_of_scope: String,
}

impl Replies {
    pub fn for_error(&self, err: &ChatError) -> &str {
        match err {
            ChatError::MissingMessage => &self.missing_message,
            ChatError::EmptyMessage => &self.empty_message,
            ChatError::MessageTooLong { .. } => &self.too_long,
            ChatError::RateLimited { .. } => &self.rate_limited,
            ChatError::MissingApiKey => &self.missing_api_key,
            ChatError::Upstream { .. } => &self.upstream,
            ChatError::Timeout => &self.timeout,
            ChatError::Internal(_) => &self.internal,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    pub assistant_name: String,
    pub company_name: String,
    pub booking_url: String,
    #[serde(default)]
    pub default_suggestions: Vec<String>,
    pub knowledge: KnowledgeDocument,
    pub replies: Replies,
    #[serde(default)]
    pub intents: Vec<IntentRule>,
    #[serde(default)]
    pub suggestions: Vec<SuggestionRule>,
}

impl Content {
    /// Content shipped with the binary.
    pub fn embedded() -> Result<Self, SetupError> {
        Self::parse(EMBEDDED_CONTENT)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SetupError::ContentRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// `from_path` when a path is configured, otherwise the embedded copy.
    pub fn load(path: Option<&str>) -> Result<Self, SetupError> {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => {
                tracing::info!("[CONTENT] Loading product copy from {}", p);
                Self::from_path(p)
            }
            None => Self::embedded(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, SetupError> {
        let content: Content = toml::from_str(text)?;
        content.validate()?;
        Ok(content)
    }

    fn validate(&self) -> Result<(), SetupError> {
        if self.knowledge.is_empty() {
            return Err(SetupError::ContentInvalid("knowledge document is empty".into()));
        }
        for rule in &self.intents {
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(SetupError::ContentInvalid(format!(
                    "intent '{}' has no keywords",
                    rule.kind.as_str()
                )));
            }
            if rule.reply.trim().is_empty() {
                return Err(SetupError::ContentInvalid(format!(
                    "intent '{}' has an empty reply",
                    rule.kind.as_str()
                )));
            }
        }
        let mut kinds: Vec<_> = self.intents.iter().map(|r| r.kind).collect();
        kinds.sort();
        kinds.dedup();
        if kinds.len() != self.intents.len() {
            return Err(SetupError::ContentInvalid("duplicate intent kind".into()));
        }
        if self.default_suggestions.is_empty() {
            return Err(SetupError::ContentInvalid("default_suggestions is empty".into()));
        }
        Ok(())
    }
}
