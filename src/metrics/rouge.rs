//! ROUGE-N and ROUGE-L over pre-tokenized text.

use super::fmeasure;
use serde::Serialize;
use std::collections::HashMap;

/// Precision, recall and F-measure of one ROUGE variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RougeScore {
    /// Overlap over prediction size.
    pub precision: f64,
    /// Overlap over reference size.
    pub recall: f64,
    /// Harmonic mean.
    pub fmeasure: f64,
}

impl RougeScore {
    fn new(precision: f64, recall: f64) -> Self {
        Self {
            precision,
            recall,
            fmeasure: fmeasure(precision, recall),
        }
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// ROUGE-N with clipped n-gram overlap.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rouge_n(prediction: &[String], reference: &[String], n: usize) -> RougeScore {
    let pred_counts = ngram_counts(prediction, n);
    let ref_counts = ngram_counts(reference, n);

    let overlap: usize = ref_counts
        .iter()
        .map(|(gram, &count)| count.min(pred_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let pred_total: usize = pred_counts.values().sum();
    let ref_total: usize = ref_counts.values().sum();

    RougeScore::new(
        overlap as f64 / pred_total.max(1) as f64,
        overlap as f64 / ref_total.max(1) as f64,
    )
}

/// Length of the longest common subsequence of two token sequences.
#[must_use]
pub fn lcs_length(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    // Two rolling rows of the classic DP table.
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// ROUGE-L from the longest common subsequence.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rouge_l(prediction: &[String], reference: &[String]) -> RougeScore {
    if prediction.is_empty() || reference.is_empty() {
        return RougeScore::default();
    }
    let lcs = lcs_length(reference, prediction) as f64;
    RougeScore::new(
        lcs / prediction.len() as f64,
        lcs / reference.len() as f64,
    )
}
