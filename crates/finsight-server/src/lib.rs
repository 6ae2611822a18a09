//! Finsight Web Server
//!
//! Axum-based REST API for the Finsight personal finance assistant.
//!
//! Authentication is handled by whatever fronts this server; the user
//! identity arrives as an opaque header and every data access is scoped by
//! it. With no header present requests fall back to the single-user `local`
//! identity, which suits self-hosted deployments.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use finsight_core::chat::{ChatBackend, ChatClient, ChatPipeline};
use finsight_core::db::Database;

mod handlers;

pub use handlers::ChatSessionManager;

/// Maximum number of stored chat messages returned per request
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// Header carrying the authenticated user id (set by the fronting proxy)
const USER_ID_HEADER: &str = "x-finsight-user";

/// Fallback identity for single-user local deployments
const DEFAULT_USER_ID: &str = "local";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Chat pipeline; None when no AI backend is configured
    pub pipeline: Option<ChatPipeline>,
    /// Session manager for multi-turn conversations
    pub sessions: ChatSessionManager,
}

/// Resolve the user identity for a request
pub fn get_user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
    ai_configured: bool,
}

/// GET /api/health - service liveness plus collaborator status
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.db.conn().is_ok();
    Json(HealthResponse {
        status: "ok",
        database,
        ai_configured: state.pipeline.is_some(),
    })
}

/// Build the application router
pub fn create_router(db: Database, chat_client: Option<ChatClient>, config: ServerConfig) -> Router {
    let pipeline = chat_client.map(|client| ChatPipeline::new(db.clone(), client));

    let state = Arc::new(AppState {
        db,
        pipeline,
        sessions: ChatSessionManager::new(),
    });

    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/chat", post(handlers::post_chat))
        .route("/chat/session", post(handlers::create_chat_session))
        .route(
            "/chat/session/:id",
            get(handlers::get_chat_session).delete(handlers::delete_chat_session),
        )
        .route(
            "/chat/history",
            get(handlers::get_chat_history).delete(handlers::clear_chat_history),
        );

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let chat_client = check_ai_connection().await;

    let app = create_router(db, chat_client, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection() -> Option<ChatClient> {
    match ChatClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
            Some(client)
        }
        None => {
            info!("ℹ️  AI backend not configured (set OLLAMA_HOST to enable chat)");
            None
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
