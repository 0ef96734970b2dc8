//! Embedding-based metrics.
//!
//! No model ships with the crate. Callers that want BERTScore or sentence
//! similarity supply an [`Embedder`]; without one these metrics are 0.

use super::fmeasure;
use crate::Result;
use serde::Serialize;
use tracing::warn;

/// Trait for embedding generators.
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Generates one embedding per token of `text`.
    ///
    /// The default splits on whitespace and embeds each word on its own.
    /// Contextual encoders should override this.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_tokens(&self, text: &str) -> Result<Vec<Vec<f32>>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        self.embed_batch(&words)
    }
}

/// Cosine similarity of two vectors; 0 for mismatched lengths or zero vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// BERTScore-style precision, recall and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BertScore {
    /// Mean best match of each candidate token in the reference.
    pub precision: f64,
    /// Mean best match of each reference token in the candidate.
    pub recall: f64,
    /// Harmonic mean.
    pub f1: f64,
}

#[allow(clippy::cast_precision_loss)]
fn greedy_match(from: &[Vec<f32>], to: &[Vec<f32>]) -> f64 {
    let total: f64 = from
        .iter()
        .map(|a| {
            to.iter()
                .map(|b| cosine_similarity(a, b))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .sum();
    total / from.len() as f64
}

/// Greedy token-embedding matching between candidate and reference.
///
/// Embedder failures are logged and score 0.
#[must_use]
pub fn bert_score(embedder: &dyn Embedder, candidate: &str, reference: &str) -> BertScore {
    let tokens = embedder
        .embed_tokens(candidate)
        .and_then(|c| embedder.embed_tokens(reference).map(|r| (c, r)));
    let (cand, refs) = match tokens {
        Ok(pair) => pair,
        Err(e) => {
            warn!("BERTScore embedding failed: {e}");
            return BertScore::default();
        },
    };
    if cand.is_empty() || refs.is_empty() {
        return BertScore::default();
    }

    let precision = greedy_match(&cand, &refs);
    let recall = greedy_match(&refs, &cand);
    BertScore {
        precision,
        recall,
        f1: fmeasure(precision, recall),
    }
}

/// Cosine similarity of whole-sentence embeddings.
///
/// Embedder failures are logged and score 0.
#[must_use]
pub fn sentence_similarity(embedder: &dyn Embedder, prediction: &str, reference: &str) -> f64 {
    match embedder.embed_batch(&[prediction, reference]) {
        Ok(vectors) if vectors.len() == 2 => cosine_similarity(&vectors[0], &vectors[1]),
        Ok(vectors) => {
            warn!(
                "Sentence embedding returned {} vectors for 2 inputs",
                vectors.len()
            );
            0.0
        },
        Err(e) => {
            warn!("Sentence embedding failed: {e}");
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// Bag-of-letters embedder: one dimension per ASCII letter.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn dimensions(&self) -> usize {
            26
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0; 26];
            for b in text.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                v[usize::from(b - b'a')] += 1.0;
            }
            Ok(v)
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            4
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::failed("embed", "model not loaded"))
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0], &[1.0, 1.0]).abs() < 1e-12);
    }

    #[test]
    fn test_bert_score_identical() {
        let score = bert_score(&LetterEmbedder, "blue sky", "blue sky");
        assert!((score.precision - 1.0).abs() < 1e-9);
        assert!((score.recall - 1.0).abs() < 1e-9);
        assert!((score.f1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bert_score_asymmetric() {
        // "sky" matches perfectly, "zzz" shares no letters with "sky".
        let score = bert_score(&LetterEmbedder, "sky zzz", "sky");
        assert!((score.precision - 0.5).abs() < 1e-9);
        assert!((score.recall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sentence_similarity() {
        let sim = sentence_similarity(&LetterEmbedder, "abc", "cba");
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_failing_embedder_scores_zero() {
        assert_eq!(
            bert_score(&FailingEmbedder, "a", "b"),
            BertScore::default()
        );
        assert!(sentence_similarity(&FailingEmbedder, "a", "b").abs() < f64::EPSILON);
    }
}
