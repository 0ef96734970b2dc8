//! Evaluation of predicted answers against the `LoCoMo` gold answers.
//!
//! Joins predictions with dataset QAs, scores each pair with every metric and
//! aggregates the results overall and per category.

mod predictions;
mod report;

pub use predictions::{Prediction, load_predictions, parse_predictions};
pub use report::{write_csv, write_json};

use crate::aggregate::{AggregateReport, aggregate_metrics};
use crate::dataset::{LocomoSample, Qa};
use crate::metrics::{MetricsContext, QaMetrics, calculate_metrics};
use crate::text::sanitize_text;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Options for an evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Categories whose QAs are skipped.
    pub exclude_categories: BTreeSet<u8>,
    /// Skip predictions that match no QA instead of failing.
    pub skip_unmatched: bool,
}

impl EvaluationOptions {
    /// Excludes a category from scoring.
    #[must_use]
    pub fn exclude_category(mut self, category: u8) -> Self {
        self.exclude_categories.insert(category);
        self
    }

    /// Sets whether unmatched predictions are skipped.
    #[must_use]
    pub const fn with_skip_unmatched(mut self, skip: bool) -> Self {
        self.skip_unmatched = skip;
        self
    }
}

/// Scores for one QA pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// Sample id.
    pub sample_id: String,
    /// Index of the QA pair within the sample.
    pub qa_index: usize,
    /// Question category.
    pub category: Option<u8>,
    /// The question.
    pub question: String,
    /// The answer scored against (empty when the QA has none).
    pub reference: String,
    /// The predicted answer, sanitized to ASCII.
    pub prediction: String,
    /// Every metric.
    pub metrics: QaMetrics,
}

/// Outcome of an evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Per-QA scores in prediction order.
    pub records: Vec<EvaluationRecord>,
    /// Aggregated scores.
    pub aggregate: AggregateReport,
    /// Number of predictions that were not scored.
    pub skipped: usize,
}

/// Scores predictions against a dataset.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    ctx: MetricsContext,
}

impl Evaluator {
    /// Creates an evaluator with the given metrics context.
    #[must_use]
    pub const fn new(ctx: MetricsContext) -> Self {
        Self { ctx }
    }

    /// Scores every prediction and aggregates the results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a prediction names an unknown sample or an
    /// out-of-range QA index and `options.skip_unmatched` is not set.
    #[instrument(skip_all, fields(samples = samples.len(), predictions = predictions.len()))]
    pub fn evaluate(
        &self,
        samples: &[LocomoSample],
        predictions: &[Prediction],
        options: &EvaluationOptions,
    ) -> Result<EvaluationReport> {
        let start = Instant::now();
        let by_id: HashMap<&str, &LocomoSample> =
            samples.iter().map(|s| (s.sample_id.as_str(), s)).collect();

        let mut records = Vec::with_capacity(predictions.len());
        let mut skipped = 0;

        for prediction in predictions {
            let qa = match lookup_qa(&by_id, prediction) {
                Ok(qa) => qa,
                Err(e) if options.skip_unmatched => {
                    warn!(error = %e, "Skipping unmatched prediction");
                    skipped += 1;
                    continue;
                },
                Err(e) => return Err(e),
            };

            if qa
                .category
                .is_some_and(|c| options.exclude_categories.contains(&c))
            {
                debug!(
                    sample_id = %prediction.sample_id,
                    qa_index = prediction.qa_index,
                    "Skipping excluded category"
                );
                skipped += 1;
                continue;
            }

            records.push(self.score(prediction, qa));
        }

        let scored: Vec<(QaMetrics, Option<u8>)> =
            records.iter().map(|r| (r.metrics, r.category)).collect();
        let aggregate = aggregate_metrics(&scored);

        info!(
            scored = records.len(),
            skipped,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Evaluation complete"
        );

        Ok(EvaluationReport {
            records,
            aggregate,
            skipped,
        })
    }

    /// Scores a single prediction against its QA.
    ///
    /// The prediction is sanitized the same way the dataset answers were on load.
    fn score(&self, prediction: &Prediction, qa: &Qa) -> EvaluationRecord {
        let reference = qa.final_answer().unwrap_or_default();
        let predicted = sanitize_text(&prediction.prediction);
        let metrics = if reference.is_empty() {
            QaMetrics::default()
        } else {
            calculate_metrics(&predicted, reference, &self.ctx)
        };
        ::metrics::counter!("amem_qa_scored_total").increment(1);

        EvaluationRecord {
            sample_id: prediction.sample_id.clone(),
            qa_index: prediction.qa_index,
            category: qa.category,
            question: qa.question.clone(),
            reference: reference.to_string(),
            prediction: predicted,
            metrics,
        }
    }
}

fn lookup_qa<'a>(by_id: &HashMap<&str, &'a LocomoSample>, prediction: &Prediction) -> Result<&'a Qa> {
    let sample = by_id.get(prediction.sample_id.as_str()).ok_or_else(|| {
        Error::InvalidInput(format!("unknown sample id: {}", prediction.sample_id))
    })?;
    sample.qa.get(prediction.qa_index).ok_or_else(|| {
        Error::InvalidInput(format!(
            "qa index {} out of range for sample {} ({} questions)",
            prediction.qa_index,
            prediction.sample_id,
            sample.qa.len()
        ))
    })
}
