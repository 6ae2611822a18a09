//! System prompt for the chat assistant
//!
//! The prompt instructs the model to embed a query directive (see
//! `chat::directive`) in its reply when a question is answerable from the
//! user's data. Embedded at compile time so the binary is self-contained.

/// Assistant system prompt (compiled into binary)
pub const ASSISTANT_SYSTEM: &str = include_str!("../../../prompts/assistant.md");
