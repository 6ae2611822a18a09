//! Finsight Core Library
//!
//! Shared functionality for the Finsight personal finance assistant:
//! - Database access and migrations
//! - Query executor for structured, user-scoped data queries
//! - Response formatter (text / table / chart payloads)
//! - Query directive extraction from model replies
//! - Pluggable local LLM backends (Ollama, mock)
//! - Chat turn pipeline tying the above together

pub mod chat;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod prompts;
pub mod query;

pub use chat::{
    extract_directive, ChatBackend, ChatClient, ChatPipeline, ChatTurn, Message, MockBackend,
    OllamaBackend, QueryDirective,
};
pub use db::Database;
pub use error::{Error, Result};
pub use format::{
    format_response, ChartKind, ChartPayload, FormattedResponse, PresentationType, TablePayload,
};
pub use query::{Aggregation, Entity, GroupBy, QueryDescriptor, QueryExecutor, QueryResult};
