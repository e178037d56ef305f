//! OpenAI chat completion client
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use super::{ChatMessage, Completion, CompletionClient, CompletionRequest, ResponseFormat, Role, Usage};
use crate::core::Config;
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use openai::chat::{
    ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole, ChatCompletionResponseFormat,
};
use openai::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// `CompletionClient` backed by an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    model: String,
    credentials: Credentials,
}

impl OpenAiClient {
    pub fn new(model: impl Into<String>, api_key: &str, endpoint: Option<&str>) -> Self {
        let base_url = endpoint.unwrap_or(DEFAULT_BASE_URL);
        Self {
            model: model.into(),
            credentials: Credentials::new(api_key, base_url),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        info!(
            "Using model {} at {}",
            config.deployment_id,
            config.endpoint.as_deref().unwrap_or(DEFAULT_BASE_URL)
        );
        Self::new(
            config.deployment_id.clone(),
            &config.api_key,
            config.endpoint.as_deref(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_openai_message(message: &ChatMessage) -> ChatCompletionMessage {
    let role = match message.role {
        Role::System => ChatCompletionMessageRole::System,
        Role::User => ChatCompletionMessageRole::User,
        Role::Assistant => ChatCompletionMessageRole::Assistant,
    };
    ChatCompletionMessage {
        role,
        content: Some(message.content.clone()),
        name: None,
        function_call: None,
        tool_call_id: None,
        tool_calls: None,
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let messages: Vec<ChatCompletionMessage> = request.messages.iter().map(to_openai_message).collect();

        let mut builder = ChatCompletion::builder(&self.model, messages)
            .credentials(self.credentials.clone())
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .top_p(request.top_p)
            .n(request.n);

        if !request.stop.is_empty() {
            builder = builder.stop(request.stop.clone());
        }
        if request.response_format == ResponseFormat::JsonObject {
            builder = builder.response_format(ChatCompletionResponseFormat::json_object());
        }

        debug!(
            "Requesting completion from {} ({} message(s), max_tokens {})",
            self.model,
            request.messages.len(),
            request.max_tokens
        );

        let chat_completion = builder
            .create()
            .await
            .map_err(|e| anyhow::anyhow!("OpenAI API error: {}", e))?;

        let usage = chat_completion.usage.as_ref().map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        if let Some(u) = &usage {
            debug!(
                "Completion usage: {} prompt + {} completion = {} tokens",
                u.prompt_tokens, u.completion_tokens, u.total_tokens
            );
        }

        Ok(Completion {
            choices: chat_completion
                .choices
                .into_iter()
                .map(|c| c.message.content.unwrap_or_default())
                .collect(),
            usage,
        })
    }
}
