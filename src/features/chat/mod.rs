//! # Feature: Chat Sessions
//!
//! Multi-turn conversations persisted through a `ConversationStore`. A
//! session keeps its history in memory; `commit` writes it back.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Added `from_config` reading the `chat` section of the prompt file
//! - 1.2.0: Added `reply` answering with the configured error response on failure
//! - 1.1.0: Added `plugin_run` to route a turn through a prompt plugin
//! - 1.0.0: Initial release

use crate::core::{sections, Config, ConfigSource};
use crate::database::{ChatRecord, ConversationStore};
use crate::features::assistant::{DEFAULT_ERROR_RESPONSE, DEFAULT_INITIAL_PROMPT};
use crate::features::completion::{
    ChatMessage, Completion, CompletionClient, CompletionRequest, OpenAiClient, ResponseFormat,
};
use crate::features::plugins::Plugin;
use crate::features::prompts::{PromptError, PromptInput};
use anyhow::Result;
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

const CHAT_MAX_TOKENS: u64 = 200;
const CHAT_TEMPERATURE: f32 = 0.5;
const CHAT_TOP_P: f32 = 1.0;

/// One conversation's in-memory history
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    id: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Fresh session opened with `initial_prompt` as its system message
    pub fn new(id: impl Into<String>, initial_prompt: impl Into<PromptInput>) -> Result<Self, PromptError> {
        let system = initial_prompt.into().resolve()?;
        Ok(Self {
            id: id.into(),
            messages: vec![ChatMessage::system(system)],
        })
    }

    pub fn from_record(record: ChatRecord) -> Self {
        Self {
            id: record.id,
            messages: record.messages,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    fn to_record(&self) -> ChatRecord {
        ChatRecord::new(self.id.clone(), self.messages.clone())
    }
}

pub struct ChatAssistant {
    client: Arc<dyn CompletionClient>,
    store: Arc<dyn ConversationStore>,
    initial_prompt: String,
    error_response: String,
}

impl ChatAssistant {
    pub fn new(
        settings: &ConfigSource,
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            client,
            store,
            initial_prompt: settings
                .get_or(sections::CHAT, "initial_prompt", DEFAULT_INITIAL_PROMPT)
                .to_string(),
            error_response: settings
                .get_or(sections::CHAT, "error_response", DEFAULT_ERROR_RESPONSE)
                .to_string(),
        }
    }

    /// Chat assistant on the OpenAI endpoint described by `config`
    ///
    /// Settings come from `config.prompt_config_path`; a missing file means defaults.
    pub fn from_config(config: &Config, store: Arc<dyn ConversationStore>) -> Result<Self> {
        let settings = ConfigSource::load_or_default(config.prompt_config_path.as_deref())?;
        Ok(Self::new(
            &settings,
            Arc::new(OpenAiClient::from_config(config)),
            store,
        ))
    }

    /// Replace the configured initial prompt, rendering structured prompts once
    pub fn with_initial_prompt(mut self, prompt: impl Into<PromptInput>) -> Result<Self, PromptError> {
        self.initial_prompt = prompt.into().resolve()?;
        Ok(self)
    }

    pub fn initial_prompt(&self) -> &str {
        &self.initial_prompt
    }

    pub fn error_response(&self) -> &str {
        &self.error_response
    }

    fn fresh_session(&self, id: String) -> ChatSession {
        ChatSession {
            id,
            messages: vec![ChatMessage::system(self.initial_prompt.clone())],
        }
    }

    /// Load the conversation `id`, or start a new one
    ///
    /// With no id a random one is assigned. An unknown id starts a new
    /// conversation under that id; store failures are returned.
    pub async fn open_chat(&self, id: Option<String>) -> Result<ChatSession> {
        let Some(id) = id else {
            let id = Uuid::new_v4().to_string();
            info!("Starting chat {}", id);
            return Ok(self.fresh_session(id));
        };

        match self.store.find_chat_by_id(&id).await? {
            Some(record) => {
                info!("Resuming chat {} ({} messages)", id, record.messages.len());
                Ok(ChatSession::from_record(record))
            }
            None => {
                warn!("Chat {} not found, starting a new one", id);
                Ok(self.fresh_session(id))
            }
        }
    }

    /// Open a conversation and persist it right away
    pub async fn init_chat(&self, id: Option<String>) -> Result<ChatSession> {
        let session = self.open_chat(id).await?;
        self.commit(&session).await?;
        Ok(session)
    }

    pub async fn commit(&self, session: &ChatSession) -> Result<()> {
        self.store.save_chat(&session.to_record()).await
    }

    /// Append `message`, ask the model with the whole history and append its answer
    ///
    /// On failure the user message stays in the session and nothing else is added.
    pub async fn send(&self, session: &mut ChatSession, message: &str) -> Result<(Completion, String)> {
        session.messages.push(ChatMessage::user(message));

        let request = CompletionRequest::chat(session.messages.clone())
            .with_response_format(ResponseFormat::Text)
            .with_max_tokens(CHAT_MAX_TOKENS)
            .with_temperature(CHAT_TEMPERATURE)
            .with_top_p(CHAT_TOP_P);

        let completion = match self.client.complete(&request).await {
            Ok(completion) => completion,
            Err(e) => {
                error!("Chat {} completion failed: {:#}", session.id, e);
                return Err(e);
            }
        };

        let answer = match completion.choice(0) {
            Ok(answer) => answer.to_string(),
            Err(e) => {
                error!("Chat {} got no usable answer: {:#}", session.id, e);
                return Err(e);
            }
        };
        session.messages.push(ChatMessage::assistant(answer.clone()));
        Ok((completion, answer))
    }

    /// Like `send`, answering with the error response on failure
    pub async fn reply(&self, session: &mut ChatSession, message: &str) -> String {
        match self.send(session, message).await {
            Ok((_, answer)) => answer,
            Err(e) => {
                warn!("Answering chat {} with the error response: {:#}", session.id, e);
                self.error_response.clone()
            }
        }
    }

    /// Route `message` through `plugin` and record candidate `choice` as the answer
    pub async fn plugin_run(
        &self,
        session: &mut ChatSession,
        message: &str,
        plugin: &dyn Plugin,
        choice: usize,
    ) -> Result<String> {
        let completion = plugin.run(message).await?;
        let answer = completion.choice(choice)?.to_string();
        info!("Plugin {} answered in chat {}", plugin.name(), session.id);
        session.messages.push(ChatMessage::assistant(answer.clone()));
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigOverrides;
    use crate::database::MemoryRepository;
    use crate::features::completion::testing::ScriptedClient;
    use crate::features::completion::Role;
    use crate::features::prompts::PromptBuilder;
    use async_trait::async_trait;

    fn assistant(client: Arc<ScriptedClient>, store: Arc<MemoryRepository>) -> ChatAssistant {
        let settings = ConfigSource::default()
            .with_value("chat", "initial_prompt", "You are a chat bot")
            .with_value("chat", "error_response", "Sorry");
        ChatAssistant::new(&settings, client, store)
    }

    struct EchoPlugin;

    #[async_trait]
    impl Plugin for EchoPlugin {
        fn name(&self) -> &str {
            "Echo"
        }

        async fn run(&self, input: &str) -> Result<Completion> {
            Ok(Completion {
                choices: vec![format!("a:{input}"), format!("b:{input}")],
                usage: None,
            })
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ConversationStore for BrokenStore {
        async fn find_chat_by_id(&self, _id: &str) -> Result<Option<ChatRecord>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn save_chat(&self, _record: &ChatRecord) -> Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_open_without_id_assigns_uuid() {
        let chat = assistant(Arc::new(ScriptedClient::new()), Arc::new(MemoryRepository::new()));
        let session = chat.open_chat(None).await.unwrap();
        assert!(Uuid::parse_str(session.id()).is_ok());
        assert_eq!(session.messages(), &[ChatMessage::system("You are a chat bot")]);
    }

    #[tokio::test]
    async fn test_open_unknown_id_starts_fresh() {
        let store = Arc::new(MemoryRepository::new());
        let chat = assistant(Arc::new(ScriptedClient::new()), store.clone());
        let session = chat.open_chat(Some("abc".to_string())).await.unwrap();
        assert_eq!(session.id(), "abc");
        assert_eq!(session.messages().len(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_open_propagates_store_errors() {
        let chat = ChatAssistant::new(
            &ConfigSource::default(),
            Arc::new(ScriptedClient::new()),
            Arc::new(BrokenStore),
        );
        let err = chat.open_chat(Some("x".to_string())).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(chat.initial_prompt(), DEFAULT_INITIAL_PROMPT);
    }

    #[tokio::test]
    async fn test_send_appends_both_turns() {
        let client = Arc::new(ScriptedClient::new().reply(&["Hello!"]));
        let chat = assistant(client.clone(), Arc::new(MemoryRepository::new()));
        let mut session = chat.open_chat(None).await.unwrap();

        let (completion, answer) = chat.send(&mut session, "hi").await.unwrap();
        assert_eq!(answer, "Hello!");
        assert_eq!(completion.choices.len(), 1);
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.last_message(), Some(&ChatMessage::assistant("Hello!")));

        let requests = client.requests();
        let request = &requests[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1], ChatMessage::user("hi"));
        assert_eq!(request.max_tokens, 200);
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.top_p, 1.0);
        assert_eq!(request.response_format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn test_send_failure_keeps_user_message() {
        let client = Arc::new(ScriptedClient::new().fail("boom"));
        let chat = assistant(client, Arc::new(MemoryRepository::new()));
        let mut session = chat.open_chat(None).await.unwrap();

        assert!(chat.send(&mut session, "hi").await.is_err());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.last_message().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_reply_falls_back_to_error_response() {
        let client = Arc::new(ScriptedClient::new().fail("boom"));
        let chat = assistant(client, Arc::new(MemoryRepository::new()));
        let mut session = chat.open_chat(None).await.unwrap();
        assert_eq!(chat.reply(&mut session, "hi").await, "Sorry");
    }

    #[tokio::test]
    async fn test_send_without_choices_is_error() {
        let client = Arc::new(ScriptedClient::new().reply(&[]));
        let chat = assistant(client, Arc::new(MemoryRepository::new()));
        let mut session = chat.open_chat(None).await.unwrap();

        let err = chat.send(&mut session, "hi").await.unwrap_err();
        assert!(err.to_string().contains("returned 0 choice(s)"));
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_reply_empty_completion_uses_error_response() {
        let client = Arc::new(ScriptedClient::new().reply(&[]));
        let chat = assistant(client, Arc::new(MemoryRepository::new()));
        let mut session = chat.open_chat(None).await.unwrap();
        assert_eq!(chat.reply(&mut session, "hi").await, "Sorry");
        assert_eq!(session.last_message().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_from_config_reads_chat_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.yaml");
        std::fs::write(&path, "chat:\n  initial_prompt: You are a librarian\n").unwrap();

        let mut config = Config::from_lookup(
            ConfigOverrides {
                api_key: Some("sk-test".to_string()),
                ..ConfigOverrides::default()
            },
            |_| None,
        )
        .unwrap();
        config.prompt_config_path = Some(path);

        let chat = ChatAssistant::from_config(&config, Arc::new(MemoryRepository::new())).unwrap();
        assert_eq!(chat.initial_prompt(), "You are a librarian");
        assert_eq!(chat.error_response(), DEFAULT_ERROR_RESPONSE);
        let session = chat.open_chat(None).await.unwrap();
        assert_eq!(session.messages()[0].content, "You are a librarian");
    }

    #[tokio::test]
    async fn test_commit_and_resume() {
        let store = Arc::new(MemoryRepository::new());
        let client = Arc::new(ScriptedClient::new().reply(&["first"]));
        let chat = assistant(client, store.clone());

        let mut session = chat.init_chat(Some("c1".to_string())).await.unwrap();
        assert_eq!(store.len().await, 1);
        chat.send(&mut session, "one").await.unwrap();
        chat.commit(&session).await.unwrap();

        let resumed = chat.open_chat(Some("c1".to_string())).await.unwrap();
        assert_eq!(resumed, session);
        assert_eq!(resumed.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_uncommitted_turns_are_not_persisted() {
        let store = Arc::new(MemoryRepository::new());
        let client = Arc::new(ScriptedClient::new().reply(&["x"]));
        let chat = assistant(client, store.clone());

        let mut session = chat.init_chat(Some("c2".to_string())).await.unwrap();
        chat.send(&mut session, "hi").await.unwrap();

        let stored = store.find_chat_by_id("c2").await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_plugin_run_records_choice() {
        let chat = assistant(Arc::new(ScriptedClient::new()), Arc::new(MemoryRepository::new()));
        let mut session = chat.open_chat(None).await.unwrap();

        let answer = chat
            .plugin_run(&mut session, "users", &EchoPlugin, 1)
            .await
            .unwrap();
        assert_eq!(answer, "b:users");
        assert_eq!(session.last_message(), Some(&ChatMessage::assistant("b:users")));
        assert!(chat.plugin_run(&mut session, "users", &EchoPlugin, 5).await.is_err());
    }

    #[test]
    fn test_session_renders_structured_prompt() {
        let prompt = PromptBuilder::new().with_role("Guide");
        let session = ChatSession::new("s", prompt).unwrap();
        assert_eq!(session.messages(), &[ChatMessage::system("Role: Guide\n")]);
    }

    #[tokio::test]
    async fn test_with_initial_prompt_override() {
        let chat = assistant(Arc::new(ScriptedClient::new()), Arc::new(MemoryRepository::new()))
            .with_initial_prompt(PromptBuilder::new().with_role("Tutor"))
            .unwrap();
        let session = chat.open_chat(None).await.unwrap();
        assert_eq!(session.messages()[0].content, "Role: Tutor\n");
    }
}
