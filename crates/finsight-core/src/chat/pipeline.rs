//! Chat turn pipeline
//!
//! One call per inbound message: complete the conversation with the model,
//! scan the reply for a query directive, execute it, format the result, and
//! persist both sides of the turn. Exactly one query and one formatting pass
//! per turn; a failed query fails the turn and persists nothing.

use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::format::{format_response, FormattedResponse};
use crate::models::ChatRole;
use crate::prompts;
use crate::query::QueryExecutor;

use super::directive::{extract_directive, QueryDirective};
use super::{ChatBackend, ChatClient, Message};

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The formatted payload to send to the caller
    pub response: FormattedResponse,
    /// Updated conversation history for the session
    pub messages: Vec<Message>,
    /// The directive the model embedded, if any
    pub directive: Option<QueryDirective>,
}

/// Runs chat turns against a backend, executor, and message store
#[derive(Clone)]
pub struct ChatPipeline {
    client: ChatClient,
    executor: QueryExecutor,
    db: Database,
}

impl ChatPipeline {
    pub fn new(db: Database, client: ChatClient) -> Self {
        Self {
            executor: QueryExecutor::new(db.clone()),
            db,
            client,
        }
    }

    /// Get the underlying chat client
    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Run one chat turn for a user
    ///
    /// `history` is the prior conversation (user/assistant text pairs). The
    /// returned turn carries the updated history; the caller owns keeping it
    /// between requests.
    pub async fn run_turn(
        &self,
        user_id: &str,
        message: &str,
        history: &[Message],
    ) -> Result<ChatTurn> {
        let mut messages = history.to_vec();
        messages.push(Message::user(message));

        let reply = self
            .client
            .complete(prompts::ASSISTANT_SYSTEM, &messages)
            .await?;

        let directive = extract_directive(&reply);

        let response = match &directive {
            Some(d) => {
                debug!(user_id, entity = %d.entity, "Directive found, executing query");
                let result = self.executor.execute(user_id, &d.descriptor())?;
                format_response(d.query_type, &result, d.chart_type, &d.explanation)
            }
            // No directive: the whole reply is the answer
            None => FormattedResponse::text(reply.trim()),
        };

        // The session history keeps the conversational text, not payloads
        let assistant_text = match &directive {
            Some(d) if !d.explanation.is_empty() => d.explanation.clone(),
            _ => reply.trim().to_string(),
        };
        messages.push(Message::assistant(assistant_text));

        self.persist_turn(user_id, message, &response)?;

        Ok(ChatTurn {
            response,
            messages,
            directive,
        })
    }

    /// Persist both sides of a successful turn
    fn persist_turn(
        &self,
        user_id: &str,
        user_message: &str,
        response: &FormattedResponse,
    ) -> Result<()> {
        self.db
            .insert_chat_message(user_id, ChatRole::User, None, user_message)?;

        let content = match response {
            FormattedResponse::Text { content } => content.clone(),
            other => serde_json::to_string(other)?,
        };
        self.db.insert_chat_message(
            user_id,
            ChatRole::Assistant,
            Some(response.response_type()),
            &content,
        )?;
        Ok(())
    }
}
