//! Mock backend for testing
//!
//! Returns scripted replies without any network access. Tests push replies
//! onto a queue; once the queue is empty a plain canned reply is returned.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Result;

use super::{ChatBackend, Message};

/// Scriptable in-memory backend
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply to return from the next `complete` call
    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply.into());
        }
    }

    /// Builder-style variant of `push_reply`
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push_reply(reply);
        self
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, _system_prompt: &str, messages: &[Message]) -> Result<String> {
        if let Ok(mut replies) = self.replies.lock() {
            if let Some(reply) = replies.pop_front() {
                return Ok(reply);
            }
        }

        let last = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(format!("I heard: {}", last))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
