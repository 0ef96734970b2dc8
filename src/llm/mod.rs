//! LLM client abstraction.
//!
//! Provides a unified interface for chat-completion providers, plus a decorator
//! that records every interaction in the [`InteractionLog`](crate::storage::InteractionLog).

mod logged;
mod openai;

pub use logged::LoggedLlmProvider;
pub use openai::OpenAiClient;

use crate::Result;
use crate::config::LlmConfig;
use std::time::Duration;

/// Trait for LLM providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// The model requests are sent to.
    fn model(&self) -> &str;

    /// Sampling temperature used for requests.
    fn temperature(&self) -> f32;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Generates a completion with a system prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    ///
    /// Default implementation concatenates system and user prompts.
    /// Providers should override this to use native system prompt support.
    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        let combined = format!("{system}\n\n---\n\nUser message:\n{user}");
        self.complete(&combined)
    }
}

/// HTTP client configuration for LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from config file settings, then environment overrides.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut settings = Self::default();
        if let Some(timeout_ms) = config.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            settings.connect_timeout_ms = connect_timeout_ms;
        }
        settings.with_env_overrides()
    }

    /// Applies `AMEM_LLM_TIMEOUT_MS` and `AMEM_LLM_CONNECT_TIMEOUT_MS`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(timeout_ms) = env_millis("AMEM_LLM_TIMEOUT_MS") {
            self.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = env_millis("AMEM_LLM_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = connect_timeout_ms;
        }
        self
    }
}

fn env_millis(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Builds a blocking HTTP client for LLM requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        fn temperature(&self) -> f32 {
            0.0
        }

        fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    #[test]
    fn test_complete_with_system_default() {
        let out = EchoProvider
            .complete_with_system("Be brief.", "What did Melanie paint?")
            .unwrap();
        assert!(out.starts_with("Be brief."));
        assert!(out.ends_with("User message:\nWhat did Melanie paint?"));
    }

    #[test]
    fn test_http_config_from_config() {
        let config = LlmConfig {
            timeout_ms: Some(1_000),
            ..LlmConfig::default()
        };
        let http = LlmHttpConfig::from_config(&config);
        if std::env::var("AMEM_LLM_TIMEOUT_MS").is_err() {
            assert_eq!(http.timeout_ms, 1_000);
        }
        if std::env::var("AMEM_LLM_CONNECT_TIMEOUT_MS").is_err() {
            assert_eq!(http.connect_timeout_ms, 3_000);
        }
    }

    #[test]
    fn test_http_config_default() {
        let http = LlmHttpConfig::default();
        assert_eq!(http.timeout_ms, 30_000);
        assert_eq!(http.connect_timeout_ms, 3_000);
    }
}
