//! sqlite-backed repository

use super::{ChatRecord, ConversationStore, QueryRow, Repository};
use crate::core::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde_json::Value as JsonValue;
use sqlite::{Connection, State, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS chats (
        id TEXT PRIMARY KEY,
        messages TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

#[derive(Clone)]
pub struct SqliteRepository {
    connection: Arc<Mutex<Connection>>,
    path: String,
}

impl SqliteRepository {
    /// Open (or create) the database file and ensure the schema exists
    pub async fn open(path: &str) -> Result<Self> {
        let connection =
            sqlite::open(path).with_context(|| format!("Failed to open database {path}"))?;
        connection
            .execute(SCHEMA)
            .context("Failed to initialise chats table")?;
        info!("Opened sqlite repository at {path}");

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            path: path.to_string(),
        })
    }

    /// Open the database at `config.database_path`
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.database_path).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        Self::open(":memory:").await
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn read_chat(connection: &Connection, id: &str) -> Result<Option<ChatRecord>> {
    let mut statement =
        connection.prepare("SELECT id, messages, updated_at FROM chats WHERE id = ?")?;
    statement.bind((1, id))?;

    if statement.next()? != State::Row {
        return Ok(None);
    }

    let messages_json = statement.read::<String, _>("messages")?;
    let updated_at = statement.read::<String, _>("updated_at")?;

    Ok(Some(ChatRecord {
        id: statement.read::<String, _>("id")?,
        messages: serde_json::from_str(&messages_json)
            .with_context(|| format!("Corrupt message list stored for chat {id}"))?,
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .with_context(|| format!("Corrupt timestamp stored for chat {id}"))?
            .with_timezone(&Utc),
    }))
}

fn write_chat(connection: &Connection, record: &ChatRecord) -> Result<()> {
    let messages_json = serde_json::to_string(&record.messages)?;
    let updated_at = record.updated_at.to_rfc3339();

    let mut statement = connection
        .prepare("INSERT OR REPLACE INTO chats (id, messages, updated_at) VALUES (?, ?, ?)")?;
    statement.bind((1, record.id.as_str()))?;
    statement.bind((2, messages_json.as_str()))?;
    statement.bind((3, updated_at.as_str()))?;
    while statement.next()? != State::Done {}
    Ok(())
}

fn run_query(connection: &Connection, query: &str) -> Result<Vec<QueryRow>> {
    let mut statement = connection
        .prepare(query)
        .with_context(|| format!("Invalid query: {query}"))?;
    let columns = statement.column_names().to_vec();

    let mut rows = Vec::new();
    while statement.next()? == State::Row {
        let mut row = QueryRow::new();
        for (index, column) in columns.iter().enumerate() {
            let value = statement.read::<Value, _>(index)?;
            row.insert(column.clone(), to_json(value));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(i),
        Value::Float(f) => JsonValue::from(f),
        Value::String(s) => JsonValue::String(s),
        Value::Binary(bytes) => JsonValue::String(format!("<{} bytes>", bytes.len())),
    }
}

#[async_trait]
impl ConversationStore for SqliteRepository {
    async fn find_chat_by_id(&self, id: &str) -> Result<Option<ChatRecord>> {
        let connection = self.connection.lock().await;
        let record = read_chat(&connection, id)?;
        debug!("Chat {} {}", id, if record.is_some() { "found" } else { "not found" });
        Ok(record)
    }

    async fn save_chat(&self, record: &ChatRecord) -> Result<()> {
        let connection = self.connection.lock().await;
        write_chat(&connection, record)
            .with_context(|| format!("Failed to save chat {}", record.id))?;
        debug!("Saved chat {} ({} messages)", record.id, record.messages.len());
        Ok(())
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn execute_query(&self, query: &str) -> Result<Vec<QueryRow>> {
        let connection = self.connection.lock().await;
        let rows = run_query(&connection, query)?;
        debug!("Query returned {} row(s)", rows.len());
        Ok(rows)
    }
}
