//! `OpenAI`-compatible chat-completions client.

use super::{LlmHttpConfig, LlmProvider, build_http_client};
use crate::config::LlmConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// `OpenAI` LLM client.
///
/// Works with any endpoint that speaks the `/chat/completions` protocol.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<String>,
    /// API base URL, without the `/chat/completions` suffix.
    endpoint: String,
    /// Model to use.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Completion token limit.
    max_tokens: u32,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Default completion token limit.
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    /// Creates a new client with the API key from `OPENAI_API_KEY`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            client: build_http_client(LlmHttpConfig::default()),
        }
    }

    /// Creates a client from the `[llm]` config section.
    ///
    /// Unset fields keep their defaults; the API key falls back to `OPENAI_API_KEY`.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut client = Self::new().with_http_config(LlmHttpConfig::from_config(config));
        if let Some(key) = &config.api_key {
            client = client.with_api_key(key.clone());
        }
        if let Some(base_url) = &config.base_url {
            client = client.with_endpoint(base_url.clone());
        }
        if let Some(model) = &config.model {
            client = client.with_model(model.clone());
        }
        if let Some(temperature) = config.temperature {
            client = client.with_temperature(temperature);
        }
        client
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the completion token limit.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Rebuilds the HTTP client with the given timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Validates that the client is configured.
    fn validate(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: "OPENAI_API_KEY not set".to_string(),
            });
        }
        Ok(())
    }

    /// Reasoning models take `max_completion_tokens` and only the default temperature.
    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with("gpt-5")
            || self.model.starts_with("o1")
            || self.model.starts_with("o3")
    }

    fn build_request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        if self.is_reasoning_model() {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: None,
                max_completion_tokens: Some(self.max_tokens),
                temperature: None,
            }
        } else {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: Some(self.max_tokens),
                max_completion_tokens: None,
                temperature: Some(self.temperature),
            }
        }
    }

    /// Makes a request to the chat-completions API.
    fn request(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.validate()?;

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::failed("openai_request", "API key not configured"))?;

        let request = self.build_request(messages);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| Error::failed("openai_request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::failed(
                "openai_request",
                format!("API returned status: {status} - {body}"),
            ));
        }

        let response: ChatCompletionResponse = response
            .json()
            .map_err(|e| Error::failed("openai_response", e))?;
        extract_content(response)
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(vec![ChatMessage::new("user", prompt)])
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(vec![
            ChatMessage::new("system", system),
            ChatMessage::new("user", user),
        ])
    }
}

fn extract_content(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| Error::failed("openai_response", "No choices in response"))
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    /// Token limit for non-reasoning models.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Token limit for reasoning models.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A request message.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn new(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

/// A response message; `content` is null for refusals and tool calls.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
