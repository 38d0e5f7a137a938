//! Foxxy: core library for the Spitfox IT Services chat assistant.
//! Knowledge, intents, conversation memory and the model gateway behind `POST /chat`.

pub mod chat;
pub mod config;
pub mod content;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod knowledge;
pub mod memory;
pub mod prompt;
pub mod provider;
pub mod suggestions;

pub use chat::{ChatReply, ChatService, ServiceOptions};
pub use config::{api_key_from_env, Limits, RateLimitPolicy, ServerConfig};
pub use content::{Content, Replies};
pub use error::{ChatError, ErrorKind, SetupError};
pub use gateway::ModelGateway;
pub use intent::{Intent, IntentClassifier, IntentRule};
pub use knowledge::{KnowledgeDocument, Topic};
pub use memory::{session_key, MemoryStore, Role, Turn, DEFAULT_SESSION};
pub use provider::{ChatMessage, ChatProvider, OpenAiCompatibleProvider, ProviderError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
