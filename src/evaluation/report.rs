//! Evaluation report writers.

use super::{EvaluationRecord, EvaluationReport};
use crate::metrics::QaMetrics;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Leading CSV columns before the metric columns.
const RECORD_COLUMNS: [&str; 6] = [
    "sample_id",
    "qa_index",
    "category",
    "question",
    "reference",
    "prediction",
];

/// Writes the full report as pretty JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_json(report: &EvaluationReport, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::failed("create_report", e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| Error::failed("write_report", e))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| Error::failed("flush_report", e))?;
    info!(path = %path.display(), "Wrote evaluation report");
    Ok(())
}

/// Writes one CSV row per scored QA.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv(records: &[EvaluationRecord], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::failed("create_csv", e))?;
    write_records(records, file)?;
    info!(path = %path.display(), rows = records.len(), "Wrote per-question CSV");
    Ok(())
}

fn write_records<W: Write>(records: &[EvaluationRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let header = RECORD_COLUMNS.iter().chain(QaMetrics::NAMES.iter());
    csv_writer
        .write_record(header)
        .map_err(|e| Error::failed("write_csv_headers", e))?;

    for record in records {
        let mut row = vec![
            record.sample_id.clone(),
            record.qa_index.to_string(),
            record.category.map(|c| c.to_string()).unwrap_or_default(),
            record.question.clone(),
            record.reference.clone(),
            record.prediction.clone(),
        ];
        row.extend(record.metrics.iter().map(|(_, value)| value.to_string()));
        csv_writer
            .write_record(&row)
            .map_err(|e| Error::failed("write_csv", e))?;
    }

    csv_writer.flush().map_err(|e| Error::failed("flush_csv", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_metrics;

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            sample_id: "0".to_string(),
            qa_index: 3,
            category: Some(2),
            question: "Where did they go, in June?".to_string(),
            reference: "Paris".to_string(),
            prediction: "paris".to_string(),
            metrics: QaMetrics {
                exact_match: 1.0,
                ..QaMetrics::default()
            },
        }
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        write_records(&[record()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("sample_id,qa_index,category,question,reference,prediction,exact_match,f1"));
        assert!(header.ends_with("meteor,sbert_similarity"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("0,3,2,\"Where did they go, in June?\",Paris,paris,1,0"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let records = vec![record()];
        let aggregate = aggregate_metrics(&[(records[0].metrics, records[0].category)]);
        let report = EvaluationReport {
            records,
            aggregate,
            skipped: 0,
        };
        write_json(&report, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["records"][0]["metrics"]["exact_match"], 1.0);
        assert_eq!(value["aggregate"]["overall"]["exact_match"]["count"], 1);
        assert_eq!(value["skipped"], 0);
    }
}
