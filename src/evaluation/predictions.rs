//! Prediction files.
//!
//! A predictions file is either a JSON array of prediction objects or JSON Lines
//! with one object per line.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::instrument;

/// A predicted answer for one QA pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Sample id (string or integer in the file).
    #[serde(deserialize_with = "string_or_number")]
    pub sample_id: String,
    /// Index of the QA pair within the sample.
    pub qa_index: usize,
    /// The predicted answer.
    pub prediction: String,
}

impl Prediction {
    /// Creates a prediction.
    #[must_use]
    pub fn new(sample_id: impl Into<String>, qa_index: usize, prediction: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            qa_index,
            prediction: prediction.into(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Parses predictions from a JSON array or JSON Lines document.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the content is neither form, naming the
/// offending line for JSON Lines.
pub fn parse_predictions(content: &str) -> Result<Vec<Prediction>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| Error::InvalidInput(format!("invalid predictions array: {e}")));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::InvalidInput(format!("invalid prediction on line {}: {e}", i + 1)))
        })
        .collect()
}

/// Loads predictions from a file.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the file does not exist, or an error if it
/// cannot be read or parsed.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_predictions(path: &Path) -> Result<Vec<Prediction>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "predictions file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::failed("read_predictions", e))?;
    let predictions = parse_predictions(&content)?;
    tracing::info!(count = predictions.len(), "Loaded predictions");
    Ok(predictions)
}
