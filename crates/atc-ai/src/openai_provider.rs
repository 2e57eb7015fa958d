use crate::llm_provider::*;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use atc_core::{AtcError, Settings};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const REDACTED: &str = "[REDACTED]";

/// Configuration for the OpenAI chat-completions provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Bearer credential. Checked on every call, not at construction.
    pub api_key: Option<SecretString>,
    /// Base URL for API (default: https://api.openai.com/v1)
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Request timeout in seconds; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
    /// Retries after a failed request (0 = single attempt)
    pub max_retries: u32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: None,
            max_retries: 0,
        }
    }
}

impl OpenAIConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.secrets.openai_api_key.clone(),
            base_url: settings.llm.base_url.trim_end_matches('/').to_string(),
            model: settings.llm.model.clone(),
            timeout_secs: settings.llm.timeout_secs,
            max_retries: settings.llm.max_retries,
        }
    }
}

/// OpenAI LLM provider using the Chat Completions API
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// A missing API key is not an error here; each call reports it instead,
    /// so a misconfigured proxy still answers with a JSON error body.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(OpenAIConfig::from_settings(settings))
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().trim())
            .filter(|k| !k.is_empty())
    }

    /// Strip the credential out of an error before it can reach a client.
    fn scrub(&self, err: anyhow::Error) -> anyhow::Error {
        match self.api_key() {
            Some(key) => {
                let message = format!("{:#}", err);
                if message.contains(key) {
                    anyhow!(message.replace(key, REDACTED))
                } else {
                    err
                }
            }
            None => err,
        }
    }

    /// Send a request with retry logic
    async fn send_request(
        &self,
        api_key: &str,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<ChatCompletionsResponse> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_secs(2u64.saturating_pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            match self.try_request(api_key, messages, config).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        tracing::warn!(
                            "OpenAI request failed (attempt {}/{}), retrying...",
                            attempt + 1,
                            self.config.max_retries + 1
                        );
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("All retry attempts failed")))
    }

    /// Try a single request to the Chat Completions API
    async fn try_request(
        &self,
        api_key: &str,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<ChatCompletionsResponse> {
        let request = ChatCompletionsRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI Chat Completions API")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to read OpenAI Chat Completions API response body")?;

        tracing::debug!(
            model = %self.config.model,
            bytes = response_text.len(),
            "Raw OpenAI Chat Completions API response received"
        );

        serde_json::from_str::<ChatCompletionsResponse>(&response_text)
            .context("Failed to parse OpenAI Chat Completions API response")
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let Some(api_key) = self.api_key() else {
            return Err(AtcError::MissingCredential.into());
        };

        let response = self
            .send_request(api_key, messages, config)
            .await
            .map_err(|e| self.scrub(e))?;

        let first = response.choices.into_iter().next();
        let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());
        let content = first.and_then(|c| c.message).and_then(|m| m.content);

        Ok(LLMResponse {
            content,
            total_tokens: response.usage.as_ref().map(|u| u.total_tokens),
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
            finish_reason,
            model: response.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Chat Completions API request/response types

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}
