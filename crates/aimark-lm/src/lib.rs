//! aimark-lm — Language-model endpoint client.
//!
//! Implements the `ChatModel` trait over any OpenAI-compatible
//! chat-completions endpoint, with a process-local reply cache and TOML
//! endpoint configuration.

pub mod cache;
pub mod chat;
pub mod config;
pub mod mock;

pub use cache::ReplyCache;
pub use chat::Lm;
pub use config::{create_lm, load_config, load_config_from, AimarkConfig, EndpointConfig};
pub use mock::MockModel;
