//! Benchmarks for QA metric computation and aggregation.
//!
//! Run with: `cargo bench --bench metrics`

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use amem::metrics::{MetricsContext, QaMetrics, calculate_metrics, meteor_score};
use amem::text::{rouge_tokenize, word_tokenize};
use amem::{aggregate_metrics, sanitize_text};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Prediction/reference pairs shaped like `LoCoMo` answers.
const PAIRS: &[(&str, &str)] = &[
    ("7 May 2023", "7 May 2023"),
    ("She painted a sunrise", "A sunrise"),
    (
        "Caroline went to the LGBTQ support group the day before",
        "The day before 7 May 2023",
    ),
    (
        "Melanie has been running, pottery classes and camping with her kids this summer",
        "Pottery, camping, painting, swimming",
    ),
    ("Not mentioned in the conversation", "a dog"),
];

fn bench_calculate_metrics(c: &mut Criterion) {
    let ctx = MetricsContext::lexical();
    let mut group = c.benchmark_group("calculate_metrics");

    for (idx, (prediction, reference)) in PAIRS.iter().enumerate() {
        group.throughput(Throughput::Bytes((prediction.len() + reference.len()) as u64));
        group.bench_with_input(BenchmarkId::new("pair", idx), &idx, |b, _| {
            b.iter(|| calculate_metrics(black_box(prediction), black_box(reference), &ctx));
        });
    }

    group.finish();
}

fn bench_components(c: &mut Criterion) {
    let (prediction, reference) = PAIRS[3];
    let mut group = c.benchmark_group("components");

    group.bench_function("rouge_tokenize_stemmed", |b| {
        b.iter(|| rouge_tokenize(black_box(prediction), true));
    });
    group.bench_function("word_tokenize", |b| {
        b.iter(|| word_tokenize(black_box(prediction)));
    });
    group.bench_function("meteor", |b| {
        b.iter(|| meteor_score(black_box(reference), black_box(prediction)));
    });
    group.bench_function("sanitize_text", |b| {
        let text = "Great job! \u{1F600} Caf\u{e9} later \u{2764}\u{FE0F}".repeat(8);
        b.iter(|| sanitize_text(black_box(&text)));
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_metrics");
    let ctx = MetricsContext::lexical();

    for size in [100usize, 2000] {
        let scored: Vec<(QaMetrics, Option<u8>)> = (0..size)
            .map(|i| {
                let (prediction, reference) = PAIRS[i % PAIRS.len()];
                let category = u8::try_from(i % 5 + 1).unwrap();
                (calculate_metrics(prediction, reference, &ctx), Some(category))
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &scored, |b, scored| {
            b.iter(|| aggregate_metrics(black_box(scored)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_calculate_metrics,
    bench_components,
    bench_aggregate
);
criterion_main!(benches);
