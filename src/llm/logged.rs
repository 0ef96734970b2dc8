//! Interaction-logging provider wrapper.

use super::LlmProvider;
use crate::Result;
use crate::storage::{InteractionLog, NewInteraction};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Wraps a provider and records every completion in an [`InteractionLog`].
///
/// Failed completions are logged too, with an empty response and the error in
/// the metadata. A failure to write the log is only a warning: the caller
/// always gets the provider's own result.
pub struct LoggedLlmProvider<P: LlmProvider> {
    inner: P,
    log: Arc<InteractionLog>,
}

impl<P: LlmProvider> LoggedLlmProvider<P> {
    /// Creates a logging wrapper around `inner`.
    #[must_use]
    pub const fn new(inner: P, log: Arc<InteractionLog>) -> Self {
        Self { inner, log }
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// The interaction log.
    #[must_use]
    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    fn execute<F>(&self, operation: &'static str, prompt: &str, call: F) -> Result<String>
    where
        F: FnOnce(&P) -> Result<String>,
    {
        let start = Instant::now();
        let result = call(&self.inner);
        let elapsed = start.elapsed();

        self.record_metrics(operation, elapsed, result.is_ok());

        let mut metadata = json!({
            "provider": self.inner.name(),
            "operation": operation,
        });
        if let Err(e) = &result {
            metadata["error"] = json!(e.to_string());
        }

        let interaction = NewInteraction {
            model: self.inner.model(),
            prompt,
            response: result.as_deref().unwrap_or_default(),
            temperature: self.inner.temperature(),
            metadata,
            execution_time: elapsed.as_secs_f64(),
        };
        match self.log.record(&interaction) {
            Ok(id) => debug!(id, provider = self.inner.name(), "Logged LLM interaction"),
            Err(e) => warn!(error = %e, "Failed to log LLM interaction"),
        }

        result
    }

    fn record_metrics(&self, operation: &'static str, elapsed: Duration, success: bool) {
        let provider = self.inner.name();
        let status = if success { "success" } else { "error" };
        ::metrics::counter!(
            "amem_llm_requests_total",
            "provider" => provider,
            "operation" => operation,
            "status" => status
        )
        .increment(1);
        ::metrics::histogram!(
            "amem_llm_request_duration_ms",
            "provider" => provider,
            "operation" => operation,
            "status" => status
        )
        .record(elapsed.as_secs_f64() * 1000.0);
    }
}

impl<P: LlmProvider> LlmProvider for LoggedLlmProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn temperature(&self) -> f32 {
        self.inner.temperature()
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.execute("complete", prompt, |inner| inner.complete(prompt))
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        let logged_prompt = format!("{system}\n\n{user}");
        self.execute("complete_with_system", &logged_prompt, |inner| {
            inner.complete_with_system(system, user)
        })
    }
}
