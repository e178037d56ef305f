//! # Features
//!
//! Prompt assembly, model access, and the assistants built on top of them.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Added plugins feature
//! - 1.1.0: Added chat sessions
//! - 1.0.0: Initial release with prompts, completion and assistant

pub mod assistant;
pub mod chat;
pub mod completion;
pub mod plugins;
pub mod prompts;

pub use assistant::{CompletionAssistant, CompletionOptions};
pub use chat::{ChatAssistant, ChatSession};
pub use completion::{
    ChatMessage, Completion, CompletionClient, CompletionRequest, OpenAiClient, ResponseFormat, Role,
    Usage,
};
pub use plugins::{NlToSql, Plugin, PluginDefinition, PluginRegistry, PluginSettings};
pub use prompts::{Bindings, ParamValue, PromptBuilder, PromptError, PromptInput};
