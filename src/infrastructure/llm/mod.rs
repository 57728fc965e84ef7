//! LLM provider integration for the chat assistant.

pub mod client;
pub mod types;

pub use client::{AnthropicClient, LlmError};
pub use types::{ChatTurn, Role};
