//! Metric aggregation.
//!
//! Summarizes per-QA metrics overall and per question category. Groups are
//! reported in a fixed order: `overall`, then `category_<n>` by ascending `n`,
//! then `uncategorized`.

use crate::metrics::QaMetrics;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Name of the group holding every scored QA.
pub const OVERALL: &str = "overall";
/// Name of the group holding QAs without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Summary statistics for one metric within one group.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
pub struct MetricSummary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (0 for a single value).
    pub std: f64,
    /// Median (mean of the two middle values for an even count).
    pub median: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Number of values.
    pub count: usize,
}

impl MetricSummary {
    /// Summarizes a non-empty list of values; `None` when `values` is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = count / 2;
        let median = if count % 2 == 0 {
            f64::midpoint(sorted[mid - 1], sorted[mid])
        } else {
            sorted[mid]
        };

        Some(Self {
            mean,
            std,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            count,
        })
    }
}

/// Summaries of every metric for one group of QAs.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateGroup {
    /// Group name (`overall`, `category_<n>`, `uncategorized`).
    pub name: String,
    /// Metric summaries in reporting order.
    pub metrics: Vec<(&'static str, MetricSummary)>,
}

impl AggregateGroup {
    /// Looks up the summary of a metric by name.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics
            .iter()
            .find(|(metric, _)| *metric == name)
            .map(|(_, summary)| summary)
    }
}

impl Serialize for AggregateGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.metrics.len()))?;
        for (name, summary) in &self.metrics {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}

/// Aggregated metrics, overall and per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    /// Groups in reporting order.
    pub groups: Vec<AggregateGroup>,
}

impl AggregateReport {
    /// Returns true if nothing was aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&AggregateGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The `overall` group, if anything was aggregated.
    #[must_use]
    pub fn overall(&self) -> Option<&AggregateGroup> {
        self.group(OVERALL)
    }
}

impl Serialize for AggregateReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.name, group)?;
        }
        map.end()
    }
}

/// Returns the group name for a category.
#[must_use]
pub fn category_group_name(category: Option<u8>) -> String {
    category.map_or_else(|| UNCATEGORIZED.to_string(), |c| format!("category_{c}"))
}

/// Per-metric value lists for one group.
#[derive(Default)]
struct Collector {
    values: Vec<Vec<f64>>,
}

impl Collector {
    fn push(&mut self, metrics: &QaMetrics) {
        if self.values.is_empty() {
            self.values = vec![Vec::new(); QaMetrics::NAMES.len()];
        }
        for (slot, (_, value)) in self.values.iter_mut().zip(metrics.iter()) {
            slot.push(value);
        }
    }

    fn into_group(self, name: String) -> AggregateGroup {
        let metrics = QaMetrics::NAMES
            .iter()
            .zip(self.values)
            .filter_map(|(metric, values)| {
                MetricSummary::from_values(&values).map(|summary| (*metric, summary))
            })
            .collect();
        AggregateGroup { name, metrics }
    }
}

/// Aggregates per-QA metrics overall and per category.
///
/// Returns an empty report for empty input.
#[must_use]
pub fn aggregate_metrics(scored: &[(QaMetrics, Option<u8>)]) -> AggregateReport {
    if scored.is_empty() {
        return AggregateReport::default();
    }

    let mut overall = Collector::default();
    let mut categories: BTreeMap<u8, Collector> = BTreeMap::new();
    let mut uncategorized = Collector::default();

    for (metrics, category) in scored {
        overall.push(metrics);
        match category {
            Some(c) => categories.entry(*c).or_default().push(metrics),
            None => uncategorized.push(metrics),
        }
    }

    let mut groups = vec![overall.into_group(OVERALL.to_string())];
    groups.extend(
        categories
            .into_iter()
            .map(|(c, collector)| collector.into_group(category_group_name(Some(c)))),
    );
    if !uncategorized.values.is_empty() {
        groups.push(uncategorized.into_group(UNCATEGORIZED.to_string()));
    }

    AggregateReport { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_f1(f1: f64) -> QaMetrics {
        QaMetrics {
            f1,
            ..QaMetrics::default()
        }
    }

    #[test]
    fn test_summary_single_value() {
        let s = MetricSummary::from_values(&[0.4]).unwrap();
        assert!((s.mean - 0.4).abs() < 1e-12);
        assert!(s.std.abs() < 1e-12);
        assert!((s.median - 0.4).abs() < 1e-12);
        assert_eq!(s.count, 1);
    }

    #[test]
    fn test_summary_statistics() {
        let s = MetricSummary::from_values(&[1.0, 4.0, 2.0, 3.0]).unwrap();
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.min - 1.0).abs() < 1e-12);
        assert!((s.max - 4.0).abs() < 1e-12);
        // Sample variance: (2.25 + 0.25 + 0.25 + 2.25) / 3.
        assert!((s.std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.count, 4);
    }

    #[test]
    fn test_summary_empty() {
        assert!(MetricSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_metrics(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_groups_in_order() {
        let scored = vec![
            (with_f1(1.0), Some(4)),
            (with_f1(0.0), Some(1)),
            (with_f1(0.5), None),
            (with_f1(0.5), Some(4)),
        ];
        let report = aggregate_metrics(&scored);
        let names: Vec<_> = report.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["overall", "category_1", "category_4", "uncategorized"]
        );

        let overall_f1 = report.overall().unwrap().metric("f1").unwrap();
        assert_eq!(overall_f1.count, 4);
        assert!((overall_f1.mean - 0.5).abs() < 1e-12);

        let cat4 = report.group("category_4").unwrap().metric("f1").unwrap();
        assert_eq!(cat4.count, 2);
        assert!((cat4.mean - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_every_metric_summarized() {
        let report = aggregate_metrics(&[(with_f1(1.0), Some(2))]);
        assert_eq!(
            report.overall().unwrap().metrics.len(),
            QaMetrics::NAMES.len()
        );
    }

    #[test]
    fn test_serialization_preserves_order() {
        let report = aggregate_metrics(&[(with_f1(1.0), Some(2)), (with_f1(0.0), Some(10))]);
        let json = serde_json::to_string(&report).unwrap();
        let overall = json.find("\"overall\"").unwrap();
        let cat2 = json.find("\"category_2\"").unwrap();
        let cat10 = json.find("\"category_10\"").unwrap();
        assert!(overall < cat2 && cat2 < cat10);
        assert!(json.find("\"exact_match\"").unwrap() < json.find("\"sbert_similarity\"").unwrap());
    }
}
