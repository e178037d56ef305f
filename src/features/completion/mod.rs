//! # Feature: Completion Client
//!
//! Provider-neutral request/response types for chat completions and the
//! `CompletionClient` trait implemented by the OpenAI-backed client.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added `n` and `stop` for plugin requests
//! - 1.0.0: Initial release

pub mod openai_client;

pub use openai_client::OpenAiClient;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(anyhow!("Invalid message role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Shape the model is asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    Text,
    #[default]
    JsonObject,
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseFormat::Text => write!(f, "text"),
            ResponseFormat::JsonObject => write!(f, "json_object"),
        }
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "" => Ok(ResponseFormat::Text),
            "json_object" | "json" => Ok(ResponseFormat::JsonObject),
            _ => Err(anyhow!("Invalid response format: {}", s)),
        }
    }
}

pub const DEFAULT_MAX_TOKENS: u64 = 400;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_TOP_P: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
    pub max_tokens: u64,
    pub temperature: f32,
    pub top_p: f32,
    /// Number of candidate responses
    pub n: u8,
    pub stop: Vec<String>,
}

impl CompletionRequest {
    /// Single-turn request; an empty system message is omitted
    pub fn message(message: &str, system_message: Option<&str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_message.filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(message));
        Self::chat(messages)
    }

    /// Multi-turn request sending `history` as-is
    pub fn chat(history: Vec<ChatMessage>) -> Self {
        Self {
            messages: history,
            response_format: ResponseFormat::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            n: 1,
            stop: Vec::new(),
        }
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_n(mut self, n: u8) -> Self {
        self.n = n;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Candidate responses returned for one request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    pub choices: Vec<String>,
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn choice(&self, index: usize) -> Result<&str> {
        self.choices.get(index).map(String::as_str).ok_or_else(|| {
            anyhow!(
                "Choice {} requested but the model returned {} choice(s)",
                index,
                self.choices.len()
            )
        })
    }
}

/// Sends assembled prompts to a hosted language model
///
/// Failures are returned to the caller and never retried here.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued replies and records every request it receives
    #[derive(Default)]
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<std::result::Result<Completion, String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, choices: &[&str]) -> Self {
            self.replies.lock().unwrap().push_back(Ok(Completion {
                choices: choices.iter().map(|c| c.to_string()).collect(),
                usage: None,
            }));
            self
        }

        pub fn fail(self, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Ok(completion)) => Ok(completion),
                Some(Err(message)) => Err(anyhow!(message)),
                None => Err(anyhow!("No scripted reply left")),
            }
        }
    }
}
