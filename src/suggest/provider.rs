//! Generative suggestion provider behind a narrow async trait.

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TaskmindError};

/// Opaque generative-text collaborator.
///
/// Implementations return the raw structured-text body; parsing, validation
/// and timeouts are the blender's concern.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Request a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Configuration for the OpenAI-compatible chat provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key.
    pub api_key: String,
    /// Base URL of the chat-completions API.
    pub api_base: String,
    /// Model name.
    pub model: String,
    /// Max tokens for responses.
    pub max_tokens: u32,
    /// Temperature for sampling.
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiChatProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenAiChatProvider {
    /// Create a provider with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(TaskmindError::generative("OPENAI_API_KEY not set"));
        }
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Create a provider configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::default())
    }
}

#[async_trait]
impl SuggestionProvider for OpenAiChatProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, "requesting generative suggestion");

        let request = ChatRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a task management assistant helping users organize \
                              their to-do items."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TaskmindError::generative(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TaskmindError::generative(format!(
                "request failed with status {status}: {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| TaskmindError::generative(format!("failed to parse response: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TaskmindError::generative("empty response from provider"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_requires_api_key() {
        let config = ProviderConfig {
            api_key: String::new(),
            ..ProviderConfig::default()
        };
        assert!(OpenAiChatProvider::new(config).is_err());
    }

    #[test]
    fn test_provider_with_key() {
        let config = ProviderConfig {
            api_key: "test-key".to_string(),
            ..ProviderConfig::default()
        };
        assert!(OpenAiChatProvider::new(config).is_ok());
    }
}
