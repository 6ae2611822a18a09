//! Ollama backend implementation
//!
//! HTTP client for the Ollama API. The conversation is flattened into a
//! single prompt for `/api/generate`; the full (non-streamed) reply text is
//! returned for directive extraction.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{ChatBackend, Message};

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    ///
    /// Used for runtime model override (e.g., user selects a different model).
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    /// Flatten the system prompt and conversation into a single prompt
    fn render_prompt(system_prompt: &str, messages: &[Message]) -> String {
        let mut prompt = String::new();
        prompt.push_str(system_prompt);
        prompt.push_str("\n\n");
        for message in messages {
            match message.role.as_str() {
                "assistant" => {
                    prompt.push_str("Assistant: ");
                }
                _ => {
                    prompt.push_str("User: ");
                }
            }
            prompt.push_str(&message.content);
            prompt.push('\n');
        }
        prompt.push_str("Assistant:");
        prompt
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: Self::render_prompt(system_prompt, messages),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(
            model = %self.model,
            chars = ollama_response.response.len(),
            "Ollama completion received"
        );

        Ok(ollama_response.response)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt_flattens_history() {
        let messages = vec![
            Message::user("How much did I spend on rent?"),
            Message::assistant("You spent ₹22,000 on rent."),
            Message::user("And groceries?"),
        ];
        let prompt = OllamaBackend::render_prompt("You are a finance assistant.", &messages);

        assert!(prompt.starts_with("You are a finance assistant."));
        assert!(prompt.contains("User: How much did I spend on rent?"));
        assert!(prompt.contains("Assistant: You spent ₹22,000 on rent."));
        assert!(prompt.ends_with("Assistant:"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
    }
}
