//! # Feature: Prompt Assembly
//!
//! Sectioned instruction prompts (role, introduction, objectives, parameters,
//! approach, restrictions, output format, content) rendered through a
//! configurable output template with `{{name}}` placeholder bindings.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added `PromptInput` to resolve raw and structured prompts at the boundary
//! - 1.0.0: Initial release

pub mod builder;
pub mod placeholders;
pub mod template;

pub use builder::{Connectors, Delimiters, PromptBuilder, CONTENT_PREFIX, DEFAULT_ERROR_RESPONSE};
pub use placeholders::{placeholder_names, Bindings, ParamValue};
pub use template::{PromptError, DEFAULT_OUTPUT_TEMPLATE, TEMPLATE_FIELDS};

/// A prompt as handed to an assistant: plain text or a structured builder
#[derive(Debug, Clone, PartialEq)]
pub enum PromptInput {
    Raw(String),
    Structured(PromptBuilder),
}

impl PromptInput {
    /// Final prompt text; structured prompts render with no trailing content
    pub fn resolve(&self) -> Result<String, PromptError> {
        match self {
            PromptInput::Raw(text) => Ok(text.clone()),
            PromptInput::Structured(builder) => builder.render(None),
        }
    }
}

impl From<&str> for PromptInput {
    fn from(text: &str) -> Self {
        PromptInput::Raw(text.to_string())
    }
}

impl From<String> for PromptInput {
    fn from(text: String) -> Self {
        PromptInput::Raw(text)
    }
}

impl From<PromptBuilder> for PromptInput {
    fn from(builder: PromptBuilder) -> Self {
        PromptInput::Structured(builder)
    }
}
