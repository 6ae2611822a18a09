//! Chat handlers - conversational financial queries
//!
//! Runs the chat pipeline per message and keeps multi-turn conversation
//! context in in-memory sessions. The rendered payload is persisted by the
//! pipeline; sessions only carry the text history handed back to the model.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::{get_user_id, AppError, AppState, MAX_HISTORY_LIMIT};
use finsight_core::chat::Message;
use finsight_core::error::Error;
use finsight_core::models::StoredChatMessage;
use finsight_core::FormattedResponse;

/// Session timeout (30 minutes of inactivity)
const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Maximum messages to keep in history (to limit context size)
const MAX_HISTORY_MESSAGES: usize = 20;

/// A chat session with conversation history
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Session creation time
    pub created_at: Instant,
    /// Last activity time
    pub last_activity: Instant,
    /// Conversation history (user/assistant pairs)
    pub messages: Vec<Message>,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            created_at: Instant::now(),
            last_activity: Instant::now(),
            messages: Vec::new(),
        }
    }

    fn is_expired(&self) -> bool {
        self.last_activity.elapsed() > SESSION_TIMEOUT
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn add_messages(&mut self, new_messages: Vec<Message>) {
        self.messages = new_messages;
        // Trim if too long (keep most recent)
        if self.messages.len() > MAX_HISTORY_MESSAGES {
            let start = self.messages.len() - MAX_HISTORY_MESSAGES;
            self.messages = self.messages[start..].to_vec();
        }
        self.touch();
    }
}

/// In-memory session manager
#[derive(Debug, Default)]
pub struct ChatSessionManager {
    sessions: RwLock<HashMap<String, ChatSession>>,
}

impl ChatSessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new session and return its ID
    pub async fn create_session(&self) -> String {
        // Generate a unique session ID from the current timestamp
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_le_bytes());
        let hash = hasher.finalize();
        let session_id = format!("chat_{:x}", hash)[..21].to_string();

        let mut sessions = self.sessions.write().await;

        // Clean up expired sessions while we're here
        sessions.retain(|_, s| !s.is_expired());

        sessions.insert(session_id.clone(), ChatSession::new());
        session_id
    }

    /// Get a session's messages (returns empty if not found or expired)
    pub async fn get_messages(&self, session_id: &str) -> Vec<Message> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| !s.is_expired())
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// Update a session's messages
    pub async fn update_session(&self, session_id: &str, messages: Vec<Message>) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            session.add_messages(messages);
        } else {
            // Create session if it doesn't exist
            let mut session = ChatSession::new();
            session.add_messages(messages);
            sessions.insert(session_id.to_string(), session);
        }
    }

    /// Delete a session
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    /// Get session info
    pub async fn get_session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| !s.is_expired())
            .map(|s| SessionInfo {
                session_id: session_id.to_string(),
                message_count: s.messages.len(),
                created_at_secs_ago: s.created_at.elapsed().as_secs(),
                last_activity_secs_ago: s.last_activity.elapsed().as_secs(),
            })
    }
}

/// Request to the chat assistant
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Optional session ID for conversation continuity
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional model override (uses default if not specified)
    #[serde(default)]
    pub model: Option<String>,
}

/// Response from the chat assistant
///
/// The formatted payload flattens in with its `responseType` tag; TABLE and
/// CHART turns carry the `table`/`chart` payload verbatim.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub payload: FormattedResponse,
    pub processing_time_ms: u64,
    /// Session ID for follow-up queries
    pub session_id: String,
    /// Model used for this query
    pub model: String,
}

/// Session info response
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub message_count: usize,
    pub created_at_secs_ago: u64,
    pub last_activity_secs_ago: u64,
}

/// POST /api/chat/session - Create a new chat session
pub async fn create_chat_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionInfo>, AppError> {
    let session_id = state.sessions.create_session().await;

    debug!(session_id = %session_id, "Created chat session");

    Ok(Json(SessionInfo {
        session_id,
        message_count: 0,
        created_at_secs_ago: 0,
        last_activity_secs_ago: 0,
    }))
}

/// DELETE /api/chat/session/:id - Delete a chat session
pub async fn delete_chat_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.sessions.delete_session(&session_id).await;

    debug!(session_id = %session_id, deleted = deleted, "Deleted chat session");

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// GET /api/chat/session/:id - Get session info
pub async fn get_chat_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    let info = state
        .sessions
        .get_session_info(&session_id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found or expired"))?;

    Ok(Json(info))
}

/// POST /api/chat - Send a message to the assistant
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let start = Instant::now();
    let user_id = get_user_id(&headers);

    if payload.message.trim().is_empty() {
        return Err(AppError::bad_request("Message must not be empty"));
    }

    // Check if the chat pipeline is configured
    let pipeline = state.pipeline.as_ref().ok_or_else(|| {
        AppError::bad_request("Chat requires an AI backend. Set OLLAMA_HOST and OLLAMA_MODEL.")
    })?;

    // Get or create session
    let session_id = match &payload.session_id {
        Some(id) => id.clone(),
        None => state.sessions.create_session().await,
    };

    // Get existing conversation history
    let prior_messages = state.sessions.get_messages(&session_id).await;

    debug!(
        session_id = %session_id,
        user_id = %user_id,
        history_len = prior_messages.len(),
        "Processing chat message"
    );

    // Use model override if specified, otherwise use default
    let effective_pipeline;
    let pipeline_ref = if let Some(ref model) = payload.model {
        effective_pipeline = finsight_core::ChatPipeline::new(
            state.db.clone(),
            pipeline.client().with_model(model),
        );
        &effective_pipeline
    } else {
        pipeline
    };

    use finsight_core::chat::ChatBackend;
    let model_name = pipeline_ref.client().model().to_string();

    let turn = pipeline_ref
        .run_turn(&user_id, &payload.message, &prior_messages)
        .await
        .map_err(|e| {
            error!(error = %e, "Chat turn failed");
            match e {
                Error::UnknownEntity(ref entity) => AppError::bad_request(&format!(
                    "The assistant asked for an unknown record kind: {}",
                    entity
                )),
                Error::Http(_) => AppError::internal(
                    "Cannot reach the AI backend. Is Ollama running at the configured host?",
                ),
                other => AppError::internal(&format!("Chat turn failed: {}", other)),
            }
        })?;

    // Update session with new messages
    state
        .sessions
        .update_session(&session_id, turn.messages)
        .await;

    debug!(
        response_type = turn.response.response_type(),
        directive = turn.directive.is_some(),
        "Chat turn completed"
    );

    Ok(Json(ChatResponse {
        payload: turn.response,
        processing_time_ms: start.elapsed().as_millis() as u64,
        session_id,
        model: model_name,
    }))
}

/// Query parameters for chat history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of messages (most recent), default 50
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    50
}

/// GET /api/chat/history - List stored chat messages
pub async fn get_chat_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredChatMessage>>, AppError> {
    let user_id = get_user_id(&headers);
    let limit = params.limit.clamp(1, MAX_HISTORY_LIMIT);

    let messages = state.db.list_chat_messages(&user_id, limit)?;
    Ok(Json(messages))
}

/// DELETE /api/chat/history - Clear stored chat messages
pub async fn clear_chat_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = get_user_id(&headers);
    let deleted = state.db.clear_chat_messages(&user_id)?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
