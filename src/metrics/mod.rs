//! QA answer metrics.
//!
//! Scores a predicted answer against a gold answer. Lexical metrics are computed
//! in-crate; embedding metrics go through the [`Embedder`] trait so any sentence
//! or token encoder can be plugged in.
//!
//! # Metrics
//!
//! | Name | Tokens | Notes |
//! |------|--------|-------|
//! | `exact_match` | whole string | case-insensitive, 0 or 1 |
//! | `f1` | [`simple_tokenize`](crate::text::simple_tokenize) sets | token-set F1 |
//! | `rouge1_f`, `rouge2_f`, `rougeL_f` | stemmed ROUGE tokens | F-measure |
//! | `bleu1` .. `bleu4` | Treebank-style tokens | smoothed sentence BLEU |
//! | `bert_precision`, `bert_recall`, `bert_f1` | embedder tokens | greedy cosine matching |
//! | `meteor` | whitespace tokens | exact + stem alignment |
//! | `sbert_similarity` | whole sentence | cosine similarity |

mod bleu;
mod lexical;
mod meteor;
mod rouge;
mod semantic;

pub use bleu::{BLEU_WEIGHTS, sentence_bleu};
pub use lexical::{exact_match, token_f1};
pub use meteor::meteor_score;
pub use rouge::{RougeScore, lcs_length, rouge_l, rouge_n};
pub use semantic::{BertScore, Embedder, bert_score, cosine_similarity, sentence_similarity};

use crate::text::{rouge_tokenize, word_tokenize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Scoring context shared across many `calculate_metrics` calls.
#[derive(Clone, Default)]
pub struct MetricsContext {
    embedder: Option<Arc<dyn Embedder>>,
}

impl MetricsContext {
    /// Context without an embedder: embedding metrics are reported as 0.
    #[must_use]
    pub const fn lexical() -> Self {
        Self { embedder: None }
    }

    /// Context that computes embedding metrics with the given embedder.
    #[must_use]
    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder: Some(embedder),
        }
    }

    /// Returns the configured embedder, if any.
    #[must_use]
    pub fn embedder(&self) -> Option<&dyn Embedder> {
        self.embedder.as_deref()
    }
}

impl std::fmt::Debug for MetricsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsContext")
            .field("embedder", &self.embedder.as_ref().map(|e| e.dimensions()))
            .finish()
    }
}

/// All metrics for one prediction/reference pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QaMetrics {
    /// 1.0 when prediction and reference match case-insensitively.
    pub exact_match: f64,
    /// Token-set F1.
    pub f1: f64,
    /// ROUGE-1 F-measure.
    pub rouge1_f: f64,
    /// ROUGE-2 F-measure.
    pub rouge2_f: f64,
    /// ROUGE-L F-measure.
    #[serde(rename = "rougeL_f")]
    pub rouge_l_f: f64,
    /// BLEU with unigram weights.
    pub bleu1: f64,
    /// BLEU up to bigrams.
    pub bleu2: f64,
    /// BLEU up to trigrams.
    pub bleu3: f64,
    /// BLEU up to 4-grams.
    pub bleu4: f64,
    /// BERTScore-style precision.
    pub bert_precision: f64,
    /// BERTScore-style recall.
    pub bert_recall: f64,
    /// BERTScore-style F1.
    pub bert_f1: f64,
    /// METEOR.
    pub meteor: f64,
    /// Sentence embedding cosine similarity.
    pub sbert_similarity: f64,
}

impl QaMetrics {
    /// Metric names in reporting order.
    pub const NAMES: [&'static str; 14] = [
        "exact_match",
        "f1",
        "rouge1_f",
        "rouge2_f",
        "rougeL_f",
        "bleu1",
        "bleu2",
        "bleu3",
        "bleu4",
        "bert_precision",
        "bert_recall",
        "bert_f1",
        "meteor",
        "sbert_similarity",
    ];

    /// Returns every metric as `(name, value)` in reporting order.
    #[must_use]
    pub const fn values(&self) -> [(&'static str, f64); 14] {
        [
            ("exact_match", self.exact_match),
            ("f1", self.f1),
            ("rouge1_f", self.rouge1_f),
            ("rouge2_f", self.rouge2_f),
            ("rougeL_f", self.rouge_l_f),
            ("bleu1", self.bleu1),
            ("bleu2", self.bleu2),
            ("bleu3", self.bleu3),
            ("bleu4", self.bleu4),
            ("bert_precision", self.bert_precision),
            ("bert_recall", self.bert_recall),
            ("bert_f1", self.bert_f1),
            ("meteor", self.meteor),
            ("sbert_similarity", self.sbert_similarity),
        ]
    }

    /// Iterates over `(name, value)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        self.values().into_iter()
    }
}

/// Calculates every QA metric for a prediction against a reference.
///
/// Both strings are trimmed. If either is empty afterwards, all metrics are zero.
///
/// # Examples
///
/// ```rust
/// use amem::metrics::{MetricsContext, calculate_metrics};
///
/// let m = calculate_metrics("a sunrise", "A sunrise", &MetricsContext::lexical());
/// assert!((m.exact_match - 1.0).abs() < f64::EPSILON);
/// assert!(m.sbert_similarity.abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn calculate_metrics(prediction: &str, reference: &str, ctx: &MetricsContext) -> QaMetrics {
    let prediction = prediction.trim();
    let reference = reference.trim();
    if prediction.is_empty() || reference.is_empty() {
        return QaMetrics::default();
    }

    let pred_rouge = rouge_tokenize(prediction, true);
    let ref_rouge = rouge_tokenize(reference, true);

    let pred_words = word_tokenize(&prediction.to_lowercase());
    let ref_words = word_tokenize(&reference.to_lowercase());
    let [bleu1, bleu2, bleu3, bleu4] =
        BLEU_WEIGHTS.map(|weights| sentence_bleu(&ref_words, &pred_words, &weights));

    let bert = ctx
        .embedder()
        .map(|embedder| bert_score(embedder, prediction, reference))
        .unwrap_or_default();
    let sbert_similarity = ctx
        .embedder()
        .map_or(0.0, |embedder| sentence_similarity(embedder, prediction, reference));

    QaMetrics {
        exact_match: exact_match(prediction, reference),
        f1: token_f1(prediction, reference),
        rouge1_f: rouge_n(&pred_rouge, &ref_rouge, 1).fmeasure,
        rouge2_f: rouge_n(&pred_rouge, &ref_rouge, 2).fmeasure,
        rouge_l_f: rouge_l(&pred_rouge, &ref_rouge).fmeasure,
        bleu1,
        bleu2,
        bleu3,
        bleu4,
        bert_precision: bert.precision,
        bert_recall: bert.recall,
        bert_f1: bert.f1,
        meteor: meteor_score(reference, prediction),
        sbert_similarity,
    }
}

/// Harmonic mean of precision and recall, 0 when both are 0.
pub(crate) fn fmeasure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let ctx = MetricsContext::lexical();
        assert_eq!(calculate_metrics("", "answer", &ctx), QaMetrics::default());
        assert_eq!(calculate_metrics("answer", "", &ctx), QaMetrics::default());
        assert_eq!(calculate_metrics("   ", "answer", &ctx), QaMetrics::default());
    }

    #[test]
    fn test_identical_answers() {
        let m = calculate_metrics("7 May 2023", "7 May 2023", &MetricsContext::lexical());
        assert!(approx(m.exact_match, 1.0));
        assert!(approx(m.f1, 1.0));
        assert!(approx(m.rouge1_f, 1.0));
        assert!(approx(m.rouge2_f, 1.0));
        assert!(approx(m.rouge_l_f, 1.0));
        assert!(approx(m.bleu1, 1.0));
        assert!(approx(m.bleu3, 1.0));
        // Three tokens: the 4-gram precision is smoothed to 0.1.
        assert!(approx(m.bleu4, 0.1_f64.powf(0.25)));
        assert!(approx(m.meteor, 1.0 - 0.5 / 27.0));
        assert!(approx(m.bert_f1, 0.0));
    }

    #[test]
    fn test_case_and_whitespace_insensitive_exact_match() {
        let m = calculate_metrics("  A Sunrise ", "a sunrise", &MetricsContext::lexical());
        assert!(approx(m.exact_match, 1.0));
    }

    #[test]
    fn test_partial_overlap() {
        let m = calculate_metrics(
            "She painted a sunrise",
            "A sunrise",
            &MetricsContext::lexical(),
        );
        assert!(approx(m.exact_match, 0.0));
        // pred {she, painted, a, sunrise}, ref {a, sunrise}: P = 0.5, R = 1.
        assert!(approx(m.f1, 2.0 / 3.0));
        assert!(m.rouge1_f > 0.0 && m.rouge1_f < 1.0);
        assert!(m.meteor > 0.0 && m.meteor < 1.0);
    }

    #[test]
    fn test_values_match_names() {
        let m = QaMetrics {
            f1: 0.5,
            ..QaMetrics::default()
        };
        let names: Vec<_> = m.iter().map(|(name, _)| name).collect();
        assert_eq!(names, QaMetrics::NAMES);
        assert!(m.iter().any(|(name, v)| name == "f1" && approx(v, 0.5)));
    }

    #[test]
    fn test_serializes_rouge_l_name() {
        let json = serde_json::to_value(QaMetrics::default()).unwrap();
        assert!(json.get("rougeL_f").is_some());
        assert_eq!(json.as_object().unwrap().len(), QaMetrics::NAMES.len());
    }

    #[test]
    fn test_fmeasure() {
        assert!(approx(fmeasure(0.0, 0.0), 0.0));
        assert!(approx(fmeasure(1.0, 1.0), 1.0));
        assert!(approx(fmeasure(0.5, 1.0), 2.0 / 3.0));
    }
}
