// Core layer - configuration, settings and logging
pub mod core;

// Features layer - prompts, completion client, assistants and plugins
pub mod features;

// Storage layer - conversation persistence and queries
pub mod database;

pub use core::{init_logging, Config, ConfigOverrides, ConfigSource, LogSettings};

pub use features::{
    // Assistants
    ChatAssistant, ChatSession, CompletionAssistant, CompletionOptions,
    // Completion
    ChatMessage, Completion, CompletionClient, CompletionRequest, OpenAiClient, ResponseFormat, Role,
    Usage,
    // Plugins
    NlToSql, Plugin, PluginDefinition, PluginRegistry, PluginSettings,
    // Prompts
    Bindings, ParamValue, PromptBuilder, PromptError, PromptInput,
};

pub use database::{ChatRecord, ConversationStore, MemoryRepository, QueryRow, Repository, SqliteRepository};
