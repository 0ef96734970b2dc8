//! Dataset command handlers.

use std::path::PathBuf;

use amem::AmemConfig;
use amem::dataset::{DatasetStatistics, LoadedDataset, load_locomo_dataset};

use super::{OutputFormat, resolve_dataset, truncate};

/// Width of turn text in `dataset show`.
const TURN_TEXT_WIDTH: usize = 100;

/// Dataset stats command.
pub fn cmd_dataset_stats(
    config: &AmemConfig,
    path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_dataset(path, config)?;
    let LoadedDataset { samples, report } = load_locomo_dataset(&path)?;
    let stats = DatasetStatistics::from_samples(&samples);

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "dataset": path.display().to_string(),
                "samples": &report.samples,
                "total_qa": report.total_qa(),
                "total_image_qa": report.total_image_qa(),
                "average_qa_per_sample": report.average_qa_per_sample(),
                "min_qa": report.min_qa(),
                "max_qa": report.max_qa(),
                "statistics": stats,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
        OutputFormat::Table => {
            println!("Dataset: {}", path.display());
            for sample in &report.samples {
                println!();
                println!("Sample {}:", sample.sample_id);
                println!("  Total QAs: {}", sample.qa_count);
                println!("  QAs with image evidence: {}", sample.image_qa_count);
            }

            println!();
            println!("Overall Statistics:");
            println!("  Total QAs: {}", report.total_qa());
            println!("  Total QAs with image evidence: {}", report.total_image_qa());
            if let Some(avg) = report.average_qa_per_sample() {
                println!("  Average QAs per sample: {avg:.2}");
            }
            if let (Some(min), Some(max)) = (report.min_qa(), report.max_qa()) {
                println!("  Min QAs in a sample: {min}");
                println!("  Max QAs in a sample: {max}");
            }

            println!();
            println!("Dataset Statistics:");
            for (name, value) in stats.entries() {
                println!("  {name}: {value}");
            }
        },
    }

    Ok(())
}

/// Dataset show command.
pub fn cmd_dataset_show(
    config: &AmemConfig,
    path: Option<PathBuf>,
    sample_index: usize,
    turns: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_dataset(path, config)?;
    let dataset = load_locomo_dataset(&path)?;
    let sample = dataset.samples.get(sample_index).ok_or_else(|| {
        format!(
            "sample {sample_index} out of range (dataset has {} samples)",
            dataset.samples.len()
        )
    })?;

    let conversation = &sample.conversation;
    println!(
        "Sample {}: {} and {} ({} sessions, {} turns, {} questions)",
        sample.sample_id,
        conversation.speaker_a,
        conversation.speaker_b,
        conversation.sessions.len(),
        conversation.turn_count(),
        sample.qa.len()
    );

    for session in conversation.sessions.values() {
        println!();
        println!(
            "Session {} ({}), {} turns",
            session.session_id,
            session.date_time,
            session.turns.len()
        );
        for turn in session.turns.iter().take(turns) {
            println!(
                "  [{}] {}: {}",
                turn.dia_id,
                turn.speaker,
                truncate(&turn.text, TURN_TEXT_WIDTH)
            );
        }
        if let Some(summary) = sample
            .session_summary
            .get(&format!("session_{}_summary", session.session_id))
        {
            println!("  Summary: {}", truncate(summary, TURN_TEXT_WIDTH));
        }
    }

    Ok(())
}
