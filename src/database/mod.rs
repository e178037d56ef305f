//! # Storage
//!
//! Conversation persistence and ad-hoc queries behind the `Repository`
//! capability set. Backends are picked at construction time and passed to
//! consumers explicitly; nothing here is process-global.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Added in-memory backend
//! - 1.0.0: Initial release with sqlite backend

pub mod memory;
pub mod sqlite_repo;

pub use memory::MemoryRepository;
pub use sqlite_repo::SqliteRepository;

use crate::features::completion::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One result row, keyed by column name
pub type QueryRow = serde_json::Map<String, serde_json::Value>;

/// A persisted conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRecord {
    pub fn new(id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            id: id.into(),
            messages,
            updated_at: Utc::now(),
        }
    }
}

/// Load and save conversations by id
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// `Ok(None)` when no conversation has this id
    async fn find_chat_by_id(&self, id: &str) -> Result<Option<ChatRecord>>;

    /// Insert or replace the conversation
    async fn save_chat(&self, record: &ChatRecord) -> Result<()>;
}

/// Full storage capability set: conversations plus raw queries
#[async_trait]
pub trait Repository: ConversationStore {
    async fn execute_query(&self, query: &str) -> Result<Vec<QueryRow>>;
}
