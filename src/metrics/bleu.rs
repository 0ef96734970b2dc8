//! Sentence-level BLEU against a single reference.
//!
//! Zero n-gram matches are smoothed by adding 0.1 to the numerator over the
//! unreduced denominator ("method 1" of Chen & Cherry, 2014).

use std::collections::HashMap;

/// Weight vectors for BLEU-1 through BLEU-4.
pub const BLEU_WEIGHTS: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.5, 0.5, 0.0, 0.0],
    [0.33, 0.33, 0.33, 0.0],
    [0.25, 0.25, 0.25, 0.25],
];

const SMOOTHING_EPSILON: f64 = 0.1;

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut map = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *map.entry(gram).or_insert(0) += 1;
        }
    }
    map
}

/// Clipped n-gram matches and the hypothesis n-gram total (at least 1).
fn modified_precision(reference: &[String], hypothesis: &[String], n: usize) -> (usize, usize) {
    let hyp_counts = ngram_counts(hypothesis, n);
    let ref_counts = ngram_counts(reference, n);

    let clipped = hyp_counts
        .iter()
        .map(|(gram, &count)| count.min(ref_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let total: usize = hyp_counts.values().sum();
    (clipped, total.max(1))
}

/// Brevity penalty for hypothesis length `c` and reference length `r`.
#[allow(clippy::cast_precision_loss)]
fn brevity_penalty(r: usize, c: usize) -> f64 {
    if c > r {
        1.0
    } else if c == 0 {
        0.0
    } else {
        (1.0 - r as f64 / c as f64).exp()
    }
}

/// Sentence BLEU of `hypothesis` against one `reference`.
///
/// `weights[i]` weighs the (i+1)-gram precision. Returns 0 when no unigram of the
/// hypothesis appears in the reference.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sentence_bleu(reference: &[String], hypothesis: &[String], weights: &[f64]) -> f64 {
    let precisions: Vec<(usize, usize)> = (1..=weights.len())
        .map(|n| modified_precision(reference, hypothesis, n))
        .collect();

    if precisions.first().is_none_or(|&(matches, _)| matches == 0) {
        return 0.0;
    }

    let bp = brevity_penalty(reference.len(), hypothesis.len());
    let log_sum: f64 = weights
        .iter()
        .zip(&precisions)
        .map(|(w, &(matches, total))| {
            let p = if matches == 0 {
                SMOOTHING_EPSILON / total as f64
            } else {
                matches as f64 / total as f64
            };
            w * p.ln()
        })
        .sum();

    bp * log_sum.exp()
}
