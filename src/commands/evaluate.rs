//! Evaluate command handler.

use std::collections::BTreeSet;
use std::path::PathBuf;

use amem::aggregate::AggregateReport;
use amem::evaluation::{
    EvaluationOptions, Evaluator, load_predictions, write_csv, write_json,
};
use amem::metrics::MetricsContext;
use amem::{AmemConfig, load_locomo_dataset};

use super::{OutputFormat, resolve_dataset};

/// Metrics shown in the summary table. All are lexical, since the CLI scores
/// without an embedder.
const SUMMARY_METRICS: [&str; 6] = ["exact_match", "f1", "rouge1_f", "rougeL_f", "bleu1", "meteor"];

/// Arguments of the evaluate command.
#[derive(Debug, clap::Args)]
pub struct EvaluateArgs {
    /// Dataset path (default: `dataset_path` from config).
    #[arg(short, long)]
    pub dataset: Option<PathBuf>,

    /// Predictions file (JSON array or JSON Lines).
    #[arg(short, long)]
    pub predictions: PathBuf,

    /// Write the full JSON report here.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write per-question scores as CSV here.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Skip questions of this category (repeatable).
    #[arg(long = "exclude-category", value_name = "N")]
    pub exclude_categories: Vec<u8>,

    /// Skip predictions that match no question instead of failing.
    #[arg(long)]
    pub skip_unmatched: bool,

    /// Output format of the printed summary.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Evaluate command.
pub fn cmd_evaluate(
    config: &AmemConfig,
    args: EvaluateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset_path = resolve_dataset(args.dataset, config)?;
    let dataset = load_locomo_dataset(&dataset_path)?;
    let predictions = load_predictions(&args.predictions)?;

    let options = EvaluationOptions {
        exclude_categories: args.exclude_categories.into_iter().collect::<BTreeSet<_>>(),
        skip_unmatched: args.skip_unmatched,
    };
    let report = Evaluator::new(MetricsContext::lexical()).evaluate(
        &dataset.samples,
        &predictions,
        &options,
    )?;

    if let Some(output) = &args.output {
        write_json(&report, output)?;
    }
    if let Some(csv) = &args.csv {
        write_csv(&report.records, csv)?;
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.aggregate)?),
        OutputFormat::Table => {
            println!(
                "Scored {} predictions ({} skipped)",
                report.records.len(),
                report.skipped
            );
            print_summary(&report.aggregate);
        },
    }

    Ok(())
}

fn print_summary(aggregate: &AggregateReport) {
    if aggregate.is_empty() {
        println!("No predictions were scored.");
        return;
    }

    println!();
    print!("{:<16} {:>6}", "group", "count");
    for metric in SUMMARY_METRICS {
        print!(" {metric:>11}");
    }
    println!();

    for group in &aggregate.groups {
        let count = group.metrics.first().map_or(0, |(_, s)| s.count);
        print!("{:<16} {count:>6}", group.name);
        for metric in SUMMARY_METRICS {
            let mean = group.metric(metric).map_or(0.0, |s| s.mean);
            print!(" {mean:>11.4}");
        }
        println!();
    }
}
