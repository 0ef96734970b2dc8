//! # amem
//!
//! Evaluation toolkit for agentic memory systems on the `LoCoMo` benchmark.
//!
//! An agentic memory system stores an LLM agent's conversation history as linked
//! notes and answers questions about it later. This crate does not implement such a
//! system. It measures one: it loads the `LoCoMo` long-conversation dataset, scores
//! the answers a memory system produced against the gold answers, aggregates the
//! scores per question category, and keeps a `SQLite` log of the LLM calls made on
//! the way.
//!
//! ## Features
//!
//! - `LoCoMo` loader with ASCII sanitization and image-caption merging
//! - Lexical QA metrics: exact match, token F1, ROUGE-1/2/L, BLEU-1..4, METEOR
//! - Embedding metrics (BERTScore-style matching, sentence similarity) behind the
//!   [`Embedder`] trait
//! - Per-category aggregation (mean, std, median, min, max, count)
//! - `SQLite` interaction log for LLM prompts and responses
//!
//! ## Example
//!
//! ```rust
//! use amem::metrics::{MetricsContext, calculate_metrics};
//!
//! let scores = calculate_metrics("7 May 2023", "7 May 2023", &MetricsContext::lexical());
//! assert!((scores.f1 - 1.0).abs() < f64::EPSILON);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod evaluation;
pub mod llm;
pub mod metrics;
pub mod observability;
pub mod storage;
pub mod text;

// Re-exports for convenience
pub use aggregate::{AggregateReport, MetricSummary, aggregate_metrics};
pub use config::AmemConfig;
pub use dataset::{Conversation, LocomoSample, Qa, Session, Turn, load_locomo_dataset};
pub use evaluation::{EvaluationOptions, EvaluationReport, Evaluator, Prediction};
pub use llm::{LlmProvider, LoggedLlmProvider};
pub use metrics::{Embedder, MetricsContext, QaMetrics, calculate_metrics};
pub use storage::InteractionLog;
pub use text::sanitize_text;

/// Error type for amem operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed dataset or prediction JSON, missing required keys, bad config values |
/// | `NotFound` | Dataset, predictions, or config file does not exist |
/// | `OperationFailed` | I/O errors, `SQLite` failures, HTTP failures, embedder failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A dataset sample is missing a required key (`qa`, `conversation`, ...)
    /// - A prediction refers to an unknown sample or QA index
    /// - A JSON or TOML document cannot be parsed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required file was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` database operations fail
    /// - Filesystem I/O errors occur
    /// - An LLM request or an embedder call fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn failed(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for amem operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::NotFound("data/locomo10.json".to_string());
        assert_eq!(err.to_string(), "not found: data/locomo10.json");

        let err = Error::failed("open_sqlite", "disk full");
        assert_eq!(err.to_string(), "operation 'open_sqlite' failed: disk full");
    }
}
