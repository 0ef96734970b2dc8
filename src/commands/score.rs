//! Score command handler.

use amem::metrics::{MetricsContext, calculate_metrics};

use super::OutputFormat;

/// Score command.
pub fn cmd_score(
    prediction: &str,
    reference: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = calculate_metrics(prediction, reference, &MetricsContext::lexical());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
        OutputFormat::Table => {
            for (name, value) in metrics.iter() {
                println!("{name:<18} {value:.4}");
            }
        },
    }

    Ok(())
}
