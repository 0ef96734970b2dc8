//! Property-based tests for text sanitization, metrics and aggregation.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Sanitized text is ASCII and sanitizing twice changes nothing
//! - Every metric stays within [0, 1]
//! - Identical answers score a perfect exact match and token F1
//! - Aggregate summaries are ordered and count every input

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use amem::aggregate::OVERALL;
use amem::metrics::{MetricsContext, QaMetrics, calculate_metrics, meteor_score};
use amem::text::{rouge_tokenize, simple_tokenize};
use amem::{MetricSummary, aggregate_metrics, sanitize_text};
use proptest::prelude::*;

/// Short answers built from a small vocabulary so overlaps are common.
fn answer() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "the", "park", "parks", "painting", "painted", "sunrise", "7", "May", "2023", "a",
            "dog", "Caroline", "went", "to", "support", "group", "can't", "it's", "yes,", "no.",
        ]),
        0..12,
    )
    .prop_map(|words| words.join(" "))
}

proptest! {
    /// Property: sanitized text contains only ASCII.
    #[test]
    fn prop_sanitize_is_ascii(s in "\\PC{0,64}") {
        prop_assert!(sanitize_text(&s).is_ascii());
    }

    /// Property: sanitizing is idempotent.
    #[test]
    fn prop_sanitize_idempotent(s in "\\PC{0,64}") {
        let once = sanitize_text(&s);
        prop_assert_eq!(sanitize_text(&once), once.clone());
    }

    /// Property: ASCII input passes through unchanged.
    #[test]
    fn prop_sanitize_preserves_ascii(s in "[ -~]{0,64}") {
        prop_assert_eq!(sanitize_text(&s), s);
    }

    /// Property: every metric is within [0, 1].
    #[test]
    fn prop_metrics_bounded(prediction in answer(), reference in answer()) {
        let metrics = calculate_metrics(&prediction, &reference, &MetricsContext::lexical());
        for (name, value) in metrics.iter() {
            prop_assert!((0.0..=1.0 + 1e-9).contains(&value), "{} = {}", name, value);
        }
    }

    /// Property: an answer matches itself exactly.
    #[test]
    fn prop_identical_answers_match(answer in answer()) {
        prop_assume!(!simple_tokenize(&answer).is_empty());
        let metrics = calculate_metrics(&answer, &answer, &MetricsContext::lexical());
        prop_assert!((metrics.exact_match - 1.0).abs() < 1e-12);
        prop_assert!((metrics.f1 - 1.0).abs() < 1e-12);
        if !rouge_tokenize(&answer, true).is_empty() {
            prop_assert!((metrics.rouge1_f - 1.0).abs() < 1e-12);
            prop_assert!((metrics.rouge_l_f - 1.0).abs() < 1e-12);
        }
    }

    /// Property: exact match, token F1 and ROUGE-1 are symmetric.
    #[test]
    fn prop_symmetric_metrics(a in answer(), b in answer()) {
        let ctx = MetricsContext::lexical();
        let ab = calculate_metrics(&a, &b, &ctx);
        let ba = calculate_metrics(&b, &a, &ctx);
        prop_assert!((ab.exact_match - ba.exact_match).abs() < 1e-12);
        prop_assert!((ab.f1 - ba.f1).abs() < 1e-12);
        prop_assert!((ab.rouge1_f - ba.rouge1_f).abs() < 1e-12);
    }

    /// Property: METEOR never exceeds 1.
    #[test]
    fn prop_meteor_bounded(reference in answer(), hypothesis in answer()) {
        let score = meteor_score(&reference, &hypothesis);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    /// Property: min <= median <= max and min <= mean <= max.
    #[test]
    fn prop_summary_ordered(values in prop::collection::vec(0.0f64..=1.0, 1..50)) {
        let summary = MetricSummary::from_values(&values).unwrap();
        prop_assert!(summary.min <= summary.median && summary.median <= summary.max);
        prop_assert!(summary.min - 1e-12 <= summary.mean && summary.mean <= summary.max + 1e-12);
        prop_assert!(summary.std >= 0.0);
        prop_assert_eq!(summary.count, values.len());
    }

    /// Property: the overall group counts every scored QA and category counts add up.
    #[test]
    fn prop_aggregate_counts(
        scored in prop::collection::vec((0.0f64..=1.0, prop::option::of(1u8..=5)), 1..40)
    ) {
        let input: Vec<(QaMetrics, Option<u8>)> = scored
            .iter()
            .map(|&(f1, category)| (QaMetrics { f1, ..QaMetrics::default() }, category))
            .collect();
        let report = aggregate_metrics(&input);

        prop_assert_eq!(report.groups[0].name.as_str(), OVERALL);
        let overall = report.overall().unwrap();
        for (_, summary) in &overall.metrics {
            prop_assert_eq!(summary.count, input.len());
        }

        let per_group: usize = report.groups[1..]
            .iter()
            .map(|g| g.metric("f1").unwrap().count)
            .sum();
        prop_assert_eq!(per_group, input.len());
    }
}
