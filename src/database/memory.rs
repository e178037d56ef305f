//! In-process repository for tests and throwaway sessions

use super::{ChatRecord, ConversationStore, QueryRow, Repository};
use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Collection name that `execute_query` lists conversations from
pub const CHATS_COLLECTION: &str = "chats";

#[derive(Default)]
pub struct MemoryRepository {
    chats: RwLock<HashMap<String, ChatRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.chats.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chats.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for MemoryRepository {
    async fn find_chat_by_id(&self, id: &str) -> Result<Option<ChatRecord>> {
        Ok(self.chats.read().await.get(id).cloned())
    }

    async fn save_chat(&self, record: &ChatRecord) -> Result<()> {
        self.chats
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        debug!("Saved chat {} in memory", record.id);
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    /// Only the `chats` collection is queryable; anything else yields no rows
    async fn execute_query(&self, query: &str) -> Result<Vec<QueryRow>> {
        if query.trim() != CHATS_COLLECTION {
            return Ok(Vec::new());
        }

        let chats = self.chats.read().await;
        let mut records: Vec<&ChatRecord> = chats.values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));

        records
            .into_iter()
            .map(|record| match serde_json::to_value(record)? {
                serde_json::Value::Object(row) => Ok(row),
                _ => Ok(QueryRow::new()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::completion::ChatMessage;

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let repo = MemoryRepository::new();
        assert!(repo.find_chat_by_id("x").await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let repo = MemoryRepository::new();
        let mut record = ChatRecord::new("a", vec![ChatMessage::system("s")]);
        repo.save_chat(&record).await.unwrap();
        record.messages.push(ChatMessage::user("u"));
        repo.save_chat(&record).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let loaded = repo.find_chat_by_id("a").await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_query_lists_chats_sorted() {
        let repo = MemoryRepository::new();
        repo.save_chat(&ChatRecord::new("b", vec![])).await.unwrap();
        repo.save_chat(&ChatRecord::new("a", vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        let rows = repo.execute_query("chats").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], serde_json::json!("a"));
        assert_eq!(
            rows[0]["messages"],
            serde_json::json!([{"role": "user", "content": "hi"}])
        );
    }

    #[tokio::test]
    async fn test_query_other_collection_is_empty() {
        let repo = MemoryRepository::new();
        repo.save_chat(&ChatRecord::new("a", vec![])).await.unwrap();
        assert!(repo.execute_query("SELECT * FROM users").await.unwrap().is_empty());
    }
}
