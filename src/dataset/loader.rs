//! `LoCoMo` JSON loader.
//!
//! The dataset file is a JSON array of samples. Conversations use dynamic keys
//! (`session_1`, `session_1_date_time`, ...), so parsing walks `serde_json::Value`
//! rather than deriving a fixed schema.

use super::models::{Conversation, EventSummary, LocomoSample, Observation, Qa, Session, Turn};
use crate::text::sanitize_text;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

const SESSION_PREFIX: &str = "session_";
const DATE_TIME_SUFFIX: &str = "_date_time";

/// A parsed dataset together with its load report.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// The samples, in file order.
    pub samples: Vec<LocomoSample>,
    /// Per-sample QA counts gathered while loading.
    pub report: LoadReport,
}

/// QA counts for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleLoadSummary {
    /// Sample id.
    pub sample_id: String,
    /// Number of QA pairs.
    pub qa_count: usize,
    /// Number of QA pairs whose evidence points at an image turn.
    pub image_qa_count: usize,
}

/// Statistics gathered while loading a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// One entry per sample.
    pub samples: Vec<SampleLoadSummary>,
}

impl LoadReport {
    /// Total QA pairs.
    #[must_use]
    pub fn total_qa(&self) -> usize {
        self.samples.iter().map(|s| s.qa_count).sum()
    }

    /// Total QA pairs with image evidence.
    #[must_use]
    pub fn total_image_qa(&self) -> usize {
        self.samples.iter().map(|s| s.image_qa_count).sum()
    }

    /// Average QA pairs per sample, `None` for an empty dataset.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_qa_per_sample(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.total_qa() as f64 / self.samples.len() as f64)
        }
    }

    /// Fewest QA pairs in a sample.
    #[must_use]
    pub fn min_qa(&self) -> Option<usize> {
        self.samples.iter().map(|s| s.qa_count).min()
    }

    /// Most QA pairs in a sample.
    #[must_use]
    pub fn max_qa(&self) -> Option<usize> {
        self.samples.iter().map(|s| s.qa_count).max()
    }
}

/// Loads the `LoCoMo` dataset from a JSON file.
///
/// Image turns are kept by merging their caption into the turn text. All strings
/// are sanitized to ASCII.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the file does not exist, and
/// [`Error::InvalidInput`] if it cannot be read as UTF-8 text, the JSON is
/// malformed, or a sample lacks a required key.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_locomo_dataset(path: &Path) -> Result<LoadedDataset> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "dataset file not found at {}",
            path.display()
        )));
    }

    info!("Loading dataset from {}", path.display());
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))?;

    let dataset = parse_locomo_dataset(&contents)?;
    log_report(&dataset.report);
    Ok(dataset)
}

/// Parses a `LoCoMo` dataset from a JSON string.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the JSON is malformed, the top level is not
/// an array, or a sample lacks a required key.
pub fn parse_locomo_dataset(json: &str) -> Result<LoadedDataset> {
    let data: Value = serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("dataset is not valid JSON: {e}")))?;
    let entries = data
        .as_array()
        .ok_or_else(|| Error::InvalidInput("dataset must be a JSON array of samples".into()))?;

    let mut samples = Vec::with_capacity(entries.len());
    let mut report = LoadReport::default();

    for (sample_idx, entry) in entries.iter().enumerate() {
        let (sample, image_qa_count) = parse_sample(sample_idx, entry)?;
        debug!(
            sample = sample_idx,
            qa_count = sample.qa.len(),
            image_qa_count,
            "parsed sample"
        );
        report.samples.push(SampleLoadSummary {
            sample_id: sample.sample_id.clone(),
            qa_count: sample.qa.len(),
            image_qa_count,
        });
        samples.push(sample);
    }

    Ok(LoadedDataset { samples, report })
}

fn log_report(report: &LoadReport) {
    for sample in &report.samples {
        info!(
            sample_id = %sample.sample_id,
            qa_count = sample.qa_count,
            image_qa_count = sample.image_qa_count,
            "Sample loaded"
        );
    }
    info!(
        total_qa = report.total_qa(),
        total_image_qa = report.total_image_qa(),
        average_qa = report.average_qa_per_sample().unwrap_or(0.0),
        min_qa = report.min_qa().unwrap_or(0),
        max_qa = report.max_qa().unwrap_or(0),
        "Dataset loaded"
    );
}

/// Parses one sample and returns it with its image-evidence QA count.
fn parse_sample(sample_idx: usize, entry: &Value) -> Result<(LocomoSample, usize)> {
    let context = format!("sample {sample_idx}");
    let obj = as_object(entry, &context)?;

    let raw_conversation = as_object(require(obj, "conversation", &context)?, &context)?;
    let raw_qa = require(obj, "qa", &context)?
        .as_array()
        .ok_or_else(|| Error::InvalidInput(format!("{context}: 'qa' must be an array")))?;

    let mut qa = Vec::with_capacity(raw_qa.len());
    let mut image_qa_count = 0;
    for (qa_idx, item) in raw_qa.iter().enumerate() {
        let qa_context = format!("sample {sample_idx}, QA pair {qa_idx}");
        let parsed = parse_qa(item, &qa_context)?;
        if has_image_evidence(&parsed.evidence, raw_conversation) {
            image_qa_count += 1;
        }
        qa.push(parsed);
    }

    let conversation = parse_conversation(raw_conversation, &context)?;
    let event_summary = EventSummary {
        events: parse_string_lists(require(obj, "event_summary", &context)?, &context)?,
    };
    let observation = Observation {
        observations: parse_observations(require(obj, "observation", &context)?, &context)?,
    };
    let session_summary = obj
        .get("session_summary")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| (sanitize_text(k), value_text(v)))
                .collect()
        })
        .unwrap_or_default();

    let sample = LocomoSample {
        sample_id: sample_idx.to_string(),
        qa,
        conversation,
        event_summary,
        observation,
        session_summary,
    };
    Ok((sample, image_qa_count))
}

fn parse_qa(item: &Value, context: &str) -> Result<Qa> {
    let obj = as_object(item, context)?;
    let question = value_text(require(obj, "question", context)?);
    let category = match obj.get("category") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| Error::InvalidInput(format!("{context}: invalid category {v}")))?,
        ),
    };
    let evidence = obj
        .get("evidence")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_text).collect())
        .unwrap_or_default();

    Ok(Qa {
        question,
        answer: optional_text(obj.get("answer")),
        evidence,
        category,
        adversarial_answer: optional_text(obj.get("adversarial_answer")),
    })
}

fn parse_conversation(obj: &Map<String, Value>, context: &str) -> Result<Conversation> {
    let mut sessions = BTreeMap::new();
    for (key, value) in obj {
        let Some(turns) = value.as_array() else {
            continue;
        };
        let Some(session_id) = key
            .strip_prefix(SESSION_PREFIX)
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        let Some(date_time) = obj
            .get(&format!("{key}{DATE_TIME_SUFFIX}"))
            .map(value_text)
            .filter(|d| !d.is_empty())
        else {
            continue;
        };

        let session = parse_session(turns, session_id, &date_time, context)?;
        if !session.turns.is_empty() {
            sessions.insert(session_id, session);
        }
    }

    Ok(Conversation {
        speaker_a: value_text(require(obj, "speaker_a", context)?),
        speaker_b: value_text(require(obj, "speaker_b", context)?),
        sessions,
    })
}

fn parse_session(turns: &[Value], session_id: u32, date_time: &str, context: &str) -> Result<Session> {
    let turns = turns
        .iter()
        .map(|turn| parse_turn(turn, context))
        .collect::<Result<Vec<_>>>()?;
    Ok(Session {
        session_id,
        date_time: date_time.to_string(),
        turns,
    })
}

fn parse_turn(turn: &Value, context: &str) -> Result<Turn> {
    let obj = as_object(turn, context)?;
    let mut text = obj.get("text").map(value_text).unwrap_or_default();
    if obj.contains_key("img_url") {
        if let Some(caption) = obj.get("blip_caption") {
            let caption_text = format!("[Image: {}]", value_text(caption));
            text = if text.is_empty() {
                caption_text
            } else {
                format!("{caption_text} {text}")
            };
        }
    }

    Ok(Turn {
        speaker: value_text(require(obj, "speaker", context)?),
        dia_id: value_text(require(obj, "dia_id", context)?),
        text,
    })
}

/// Returns true when any `X:Y` evidence id matches (by dialogue-id suffix) a turn
/// carrying an image.
fn has_image_evidence(evidence: &[String], conversation: &Map<String, Value>) -> bool {
    evidence.iter().any(|evidence_id| {
        let Some(turn_id) = evidence_id.split(':').nth(1) else {
            return false;
        };
        conversation
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_object)
            .any(|turn| {
                let dia_id = turn.get("dia_id").and_then(Value::as_str).unwrap_or("");
                dia_id.ends_with(turn_id)
                    && (turn.contains_key("img_url") || turn.contains_key("blip_caption"))
            })
    })
}

fn parse_string_lists(
    value: &Value,
    context: &str,
) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
    let outer = as_object(value, context)?;
    let mut result = BTreeMap::new();
    for (session_key, speakers) in outer {
        let speakers = as_object(speakers, context)?;
        let parsed = speakers
            .iter()
            .map(|(speaker, items)| (sanitize_text(speaker), text_list(items)))
            .collect();
        result.insert(sanitize_text(session_key), parsed);
    }
    Ok(result)
}

fn parse_observations(
    value: &Value,
    context: &str,
) -> Result<BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>> {
    let outer = as_object(value, context)?;
    let mut result = BTreeMap::new();
    for (session_key, speakers) in outer {
        let speakers = as_object(speakers, context)?;
        let parsed = speakers
            .iter()
            .map(|(speaker, entries)| {
                let entries = match entries {
                    Value::Array(items) => items.iter().map(text_list).collect(),
                    other => vec![text_list(other)],
                };
                (sanitize_text(speaker), entries)
            })
            .collect();
        result.insert(sanitize_text(session_key), parsed);
    }
    Ok(result)
}

/// Flattens a string or (nested) array of strings into sanitized text items.
fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(text_list).collect(),
        Value::Null => Vec::new(),
        other => vec![value_text(other)],
    }
}

fn require<'a>(obj: &'a Map<String, Value>, key: &str, context: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| Error::InvalidInput(format!("{context}: missing key '{key}'")))
}

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidInput(format!("{context}: expected a JSON object")))
}

/// Renders a JSON scalar as sanitized text. Numbers keep their JSON spelling.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => sanitize_text(s),
        Value::Null => String::new(),
        other => sanitize_text(&other.to_string()),
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(value_text(v)),
    }
}
