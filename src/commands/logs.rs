//! Interaction log command handlers.

use amem::{AmemConfig, InteractionLog};

use super::truncate;

/// Width of prompt and response previews.
const PREVIEW_WIDTH: usize = 60;

fn open_log(config: &AmemConfig) -> Result<InteractionLog, Box<dyn std::error::Error>> {
    let path = config.interaction_log_path();
    if !path.exists() {
        return Err(format!("interaction log not found: {}", path.display()).into());
    }
    Ok(InteractionLog::open(&path)?)
}

/// Logs list command.
pub fn cmd_logs_list(
    config: &AmemConfig,
    limit: usize,
    model: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_log(config)?;
    let records = log.recent(limit, model)?;

    if records.is_empty() {
        println!("No interactions logged.");
        return Ok(());
    }

    for record in records {
        println!(
            "#{} {} {} (t={:.2}, {:.2}s)",
            record.id, record.timestamp, record.model, record.temperature, record.execution_time
        );
        println!("  prompt:   {}", truncate(&record.prompt, PREVIEW_WIDTH));
        println!("  response: {}", truncate(&record.response, PREVIEW_WIDTH));
    }

    Ok(())
}

/// Logs stats command.
pub fn cmd_logs_stats(config: &AmemConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_log(config)?;
    let summary = log.summary()?;

    println!("Interaction log: {}", config.interaction_log_path().display());
    println!("Total interactions: {}", summary.count);
    if let Some(mean) = summary.mean_execution_time {
        println!("Mean execution time: {mean:.3}s");
    }
    if !summary.per_model.is_empty() {
        println!();
        println!("By model:");
        for (model, count) in &summary.per_model {
            println!("  {model:<30} {count}");
        }
    }

    Ok(())
}
