//! `LoCoMo` data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category number of adversarial questions, whose gold answer is the adversarial one.
pub const ADVERSARIAL_CATEGORY: u8 = 5;

/// A question-answer pair attached to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qa {
    /// The question text.
    pub question: String,
    /// The gold answer, if the question has one.
    pub answer: Option<String>,
    /// Dialogue ids (`D<session>:<turn>`) supporting the answer.
    pub evidence: Vec<String>,
    /// Question category (1-5 in `LoCoMo`).
    pub category: Option<u8>,
    /// Gold answer for adversarial questions.
    pub adversarial_answer: Option<String>,
}

impl Qa {
    /// Returns the answer predictions are scored against.
    ///
    /// Adversarial questions (category 5) are scored against the adversarial
    /// answer; every other question against the regular answer.
    #[must_use]
    pub fn final_answer(&self) -> Option<&str> {
        if self.category == Some(ADVERSARIAL_CATEGORY) {
            self.adversarial_answer.as_deref()
        } else {
            self.answer.as_deref()
        }
    }

    /// Returns true if this question is adversarial.
    #[must_use]
    pub fn is_adversarial(&self) -> bool {
        self.category == Some(ADVERSARIAL_CATEGORY)
    }
}

/// A single utterance in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker name.
    pub speaker: String,
    /// Dialogue id, e.g. `D1:3`.
    pub dia_id: String,
    /// Utterance text, with any image caption merged in.
    pub text: String,
}

/// One dated conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session number taken from the `session_<N>` key.
    pub session_id: u32,
    /// Free-form date/time string from `session_<N>_date_time`.
    pub date_time: String,
    /// Turns in order.
    pub turns: Vec<Turn>,
}

/// A two-speaker, multi-session conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// First speaker.
    pub speaker_a: String,
    /// Second speaker.
    pub speaker_b: String,
    /// Sessions keyed (and ordered) by session number.
    pub sessions: BTreeMap<u32, Session>,
}

impl Conversation {
    /// Total number of turns across all sessions.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.sessions.values().map(|s| s.turns.len()).sum()
    }
}

/// Per-session event summaries: session key → speaker → events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// The events.
    pub events: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// Per-session observations: session key → speaker → `[observation, evidence...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// The observations.
    pub observations: BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>,
}

/// A single sample of the `LoCoMo` dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocomoSample {
    /// Position of the sample in the dataset file, as text.
    pub sample_id: String,
    /// Questions about the conversation.
    pub qa: Vec<Qa>,
    /// The conversation itself.
    pub conversation: Conversation,
    /// Event summaries.
    pub event_summary: EventSummary,
    /// Observations.
    pub observation: Observation,
    /// Session summaries keyed by session key.
    pub session_summary: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa(category: Option<u8>) -> Qa {
        Qa {
            question: "When did Caroline go to the support group?".to_string(),
            answer: Some("7 May 2023".to_string()),
            evidence: vec!["D1:3".to_string()],
            category,
            adversarial_answer: Some("Not mentioned in the conversation".to_string()),
        }
    }

    #[test]
    fn test_final_answer_regular() {
        assert_eq!(qa(Some(2)).final_answer(), Some("7 May 2023"));
        assert_eq!(qa(None).final_answer(), Some("7 May 2023"));
    }

    #[test]
    fn test_final_answer_adversarial() {
        let q = qa(Some(5));
        assert!(q.is_adversarial());
        assert_eq!(
            q.final_answer(),
            Some("Not mentioned in the conversation")
        );
    }

    #[test]
    fn test_final_answer_adversarial_missing() {
        let mut q = qa(Some(5));
        q.adversarial_answer = None;
        assert_eq!(q.final_answer(), None);
    }
}
