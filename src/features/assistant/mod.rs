//! # Feature: Completion Assistant
//!
//! Single-shot completions: a prompt (raw or structured) goes out with the
//! configured initial prompt as system message and one candidate comes back.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: `from_config` loads settings from the configured prompt file
//! - 1.1.0: Added `generate_completion_or_fallback` returning the configured error response
//! - 1.0.0: Initial release

use crate::core::{sections, Config, ConfigSource};
use crate::features::completion::{CompletionClient, CompletionRequest, OpenAiClient, ResponseFormat};
use crate::features::prompts::PromptInput;
use anyhow::Result;
use log::{debug, error, warn};
use std::sync::Arc;

pub const DEFAULT_INITIAL_PROMPT: &str = "Default initial prompt";
pub const DEFAULT_ERROR_RESPONSE: &str = "Default error response";

/// Caller-side sampling settings, used when the config does not set them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub response_format: ResponseFormat,
    pub max_tokens: u64,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            response_format: ResponseFormat::JsonObject,
            max_tokens: 200,
            temperature: 0.0,
            top_p: 0.1,
        }
    }
}

pub struct CompletionAssistant {
    client: Arc<dyn CompletionClient>,
    settings: ConfigSource,
    initial_prompt: String,
    error_response: String,
}

impl CompletionAssistant {
    pub fn new(settings: ConfigSource, client: Arc<dyn CompletionClient>) -> Self {
        let initial_prompt = settings
            .get_or(sections::COMPLETION, "initial_prompt", DEFAULT_INITIAL_PROMPT)
            .to_string();
        let error_response = settings
            .get_or(sections::COMPLETION, "error_response", DEFAULT_ERROR_RESPONSE)
            .to_string();

        Self {
            client,
            settings,
            initial_prompt,
            error_response,
        }
    }

    /// Assistant talking to the OpenAI endpoint described by `config`
    ///
    /// Settings come from `config.prompt_config_path`; a missing file means defaults.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = ConfigSource::load_or_default(config.prompt_config_path.as_deref())?;
        Ok(Self::new(settings, Arc::new(OpenAiClient::from_config(config))))
    }

    pub fn initial_prompt(&self) -> &str {
        &self.initial_prompt
    }

    pub fn error_response(&self) -> &str {
        &self.error_response
    }

    /// Config values win over `options`
    fn resolve_options(&self, options: CompletionOptions) -> CompletionOptions {
        let section = sections::COMPLETION;
        let response_format = match self.settings.get(section, "type") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}; using {}", e, options.response_format);
                options.response_format
            }),
            None => options.response_format,
        };

        CompletionOptions {
            response_format,
            max_tokens: self.settings.get_u64(section, "max_tokens", options.max_tokens),
            temperature: self.settings.get_f32(section, "temp", options.temperature),
            top_p: self.settings.get_f32(section, "top_p", options.top_p),
        }
    }

    /// Send `prompt` and return the content of candidate `option`
    pub async fn generate_completion(
        &self,
        prompt: impl Into<PromptInput>,
        option: usize,
        options: CompletionOptions,
    ) -> Result<String> {
        let text = prompt.into().resolve()?;
        let options = self.resolve_options(options);
        debug!(
            "Completion with {} format, max_tokens {}",
            options.response_format, options.max_tokens
        );

        let request = CompletionRequest::message(&text, Some(&self.initial_prompt))
            .with_response_format(options.response_format)
            .with_max_tokens(options.max_tokens)
            .with_temperature(options.temperature)
            .with_top_p(options.top_p);

        let completion = self.client.complete(&request).await?;
        Ok(completion.choice(option)?.to_string())
    }

    /// Like `generate_completion`, answering with the error response on failure
    pub async fn generate_completion_or_fallback(
        &self,
        prompt: impl Into<PromptInput>,
        option: usize,
        options: CompletionOptions,
    ) -> String {
        match self.generate_completion(prompt, option, options).await {
            Ok(text) => text,
            Err(e) => {
                error!("Completion failed: {:#}", e);
                self.error_response.clone()
            }
        }
    }
}
