//! Dataset-wide statistics.

use super::models::LocomoSample;
use serde::Serialize;

/// Basic counts over a loaded dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStatistics {
    /// Number of samples.
    pub num_samples: usize,
    /// Number of QA pairs.
    pub total_qa_pairs: usize,
    /// Number of sessions that survived loading.
    pub total_sessions: usize,
    /// Number of turns across all sessions.
    pub total_turns: usize,
    /// QA pairs that carry an adversarial answer.
    pub qa_with_adversarial: usize,
}

impl DatasetStatistics {
    /// Computes statistics for the given samples.
    #[must_use]
    pub fn from_samples(samples: &[LocomoSample]) -> Self {
        Self {
            num_samples: samples.len(),
            total_qa_pairs: samples.iter().map(|s| s.qa.len()).sum(),
            total_sessions: samples.iter().map(|s| s.conversation.sessions.len()).sum(),
            total_turns: samples.iter().map(|s| s.conversation.turn_count()).sum(),
            qa_with_adversarial: samples
                .iter()
                .flat_map(|s| &s.qa)
                .filter(|qa| qa.adversarial_answer.is_some())
                .count(),
        }
    }

    /// Returns `(name, value)` pairs in display order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("num_samples", self.num_samples),
            ("total_qa_pairs", self.total_qa_pairs),
            ("total_sessions", self.total_sessions),
            ("total_turns", self.total_turns),
            ("qa_with_adversarial", self.qa_with_adversarial),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_locomo_dataset;

    const TWO_SAMPLES: &str = r#"[
        {
            "qa": [
                {"question": "q1", "answer": "a1", "category": 1},
                {"question": "q2", "category": 5, "adversarial_answer": "adv"}
            ],
            "conversation": {
                "speaker_a": "A", "speaker_b": "B",
                "session_1_date_time": "d1",
                "session_1": [
                    {"speaker": "A", "dia_id": "D1:1", "text": "hi"},
                    {"speaker": "B", "dia_id": "D1:2", "text": "hello"}
                ]
            },
            "event_summary": {},
            "observation": {}
        },
        {
            "qa": [{"question": "q3", "answer": "a3", "category": 4}],
            "conversation": {
                "speaker_a": "C", "speaker_b": "D",
                "session_1_date_time": "d1",
                "session_1": [{"speaker": "C", "dia_id": "D1:1", "text": "yo"}],
                "session_2_date_time": "d2",
                "session_2": [{"speaker": "D", "dia_id": "D2:1", "text": "hey"}]
            },
            "event_summary": {},
            "observation": {}
        }
    ]"#;

    #[test]
    fn test_statistics() {
        let dataset = parse_locomo_dataset(TWO_SAMPLES).unwrap();
        let stats = DatasetStatistics::from_samples(&dataset.samples);
        assert_eq!(
            stats,
            DatasetStatistics {
                num_samples: 2,
                total_qa_pairs: 3,
                total_sessions: 3,
                total_turns: 4,
                qa_with_adversarial: 1,
            }
        );
    }

    #[test]
    fn test_empty_statistics() {
        assert_eq!(
            DatasetStatistics::from_samples(&[]),
            DatasetStatistics::default()
        );
    }

    #[test]
    fn test_report_min_max() {
        let dataset = parse_locomo_dataset(TWO_SAMPLES).unwrap();
        assert_eq!(dataset.report.min_qa(), Some(1));
        assert_eq!(dataset.report.max_qa(), Some(2));
        assert_eq!(dataset.report.average_qa_per_sample(), Some(1.5));
    }
}
