//! Exact match and token-set F1.

use super::fmeasure;
use crate::text::simple_tokenize;
use std::collections::HashSet;

/// Returns 1.0 when the trimmed strings are equal ignoring case, else 0.0.
#[must_use]
pub fn exact_match(prediction: &str, reference: &str) -> f64 {
    if prediction.trim().to_lowercase() == reference.trim().to_lowercase() {
        1.0
    } else {
        0.0
    }
}

/// Token-set F1 between prediction and reference.
///
/// Duplicate tokens count once. Returns 0 when either side has no tokens.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn token_f1(prediction: &str, reference: &str) -> f64 {
    let pred: HashSet<String> = simple_tokenize(prediction).into_iter().collect();
    let reference: HashSet<String> = simple_tokenize(reference).into_iter().collect();
    if pred.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let common = pred.intersection(&reference).count() as f64;
    let precision = common / pred.len() as f64;
    let recall = common / reference.len() as f64;
    fmeasure(precision, recall)
}
