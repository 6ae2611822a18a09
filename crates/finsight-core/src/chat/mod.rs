//! Pluggable LLM backend abstraction and the chat pipeline
//!
//! This module provides a backend-agnostic interface for the one model
//! operation the assistant needs: completing a conversation into text that
//! may embed a query directive. All backends run locally (no cloud APIs).
//!
//! # Architecture
//!
//! - `ChatBackend` trait: defines the completion interface
//! - `ChatClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//! - `ChatPipeline`: one call per chat turn (complete, extract, query, format)
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Default model name (default: llama3.2)

pub mod directive;
mod mock;
mod ollama;
mod pipeline;

pub use directive::{extract_directive, QueryDirective};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use pipeline::{ChatPipeline, ChatTurn};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single conversation message passed to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Trait defining the interface for all LLM backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Complete a conversation into the model's full reply text
    ///
    /// The reply is treated downstream as an opaque accumulation of the
    /// model's streamed output; any embedded directive is extracted from it
    /// after the fact.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete chat client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ChatClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ChatClient {
    /// Create a chat client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(ChatClient::Ollama),
            "mock" => Some(ChatClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(ChatClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        ChatClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ChatClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            ChatClient::Ollama(b) => ChatClient::Ollama(b.with_model(model)),
            ChatClient::Mock(b) => ChatClient::Mock(b.clone()),
        }
    }
}

// Implement ChatBackend for ChatClient by delegating to the inner backend
#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        match self {
            ChatClient::Ollama(b) => b.complete(system_prompt, messages).await,
            ChatClient::Mock(b) => b.complete(system_prompt, messages).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ChatClient::Ollama(b) => b.health_check().await,
            ChatClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ChatClient::Ollama(b) => b.model(),
            ChatClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ChatClient::Ollama(b) => b.host(),
            ChatClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_client_mock() {
        let client = ChatClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = ChatClient::mock();
        assert!(client.health_check().await);
    }
}
