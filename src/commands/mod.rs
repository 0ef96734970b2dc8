//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `dataset.rs`: Dataset inspection (stats, show)
//! - `score.rs`: Metrics for a single prediction/reference pair
//! - `evaluate.rs`: Full evaluation of a predictions file
//! - `logs.rs`: Interaction log inspection
//! - `ask.rs`: One logged LLM completion
//! - `config.rs`: Configuration display

mod ask;
mod config;
mod dataset;
mod evaluate;
mod logs;
mod score;

use std::path::PathBuf;

use amem::AmemConfig;
use clap::{Subcommand, ValueEnum};

// Re-export command functions
pub use ask::cmd_ask;
pub use config::cmd_config;
pub use dataset::{cmd_dataset_show, cmd_dataset_stats};
pub use evaluate::{EvaluateArgs, cmd_evaluate};
pub use logs::{cmd_logs_list, cmd_logs_stats};
pub use score::cmd_score;

/// Output format for commands that print results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty JSON.
    Json,
}

/// Dataset subcommands.
#[derive(Subcommand)]
pub enum DatasetAction {
    /// Load a dataset and print its load report and statistics.
    Stats {
        /// Dataset path (default: `dataset_path` from config).
        path: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the sessions of one sample.
    Show {
        /// Dataset path (default: `dataset_path` from config).
        path: Option<PathBuf>,

        /// Sample index.
        #[arg(short, long, default_value = "0")]
        sample: usize,

        /// Turns to print per session.
        #[arg(short, long, default_value = "1")]
        turns: usize,
    },
}

/// Interaction log subcommands.
#[derive(Subcommand)]
pub enum LogsAction {
    /// List recent interactions, newest first.
    List {
        /// Maximum number of interactions.
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show interactions with this model.
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Summarize the interaction log.
    Stats,
}

/// Resolves a dataset path from the command line or the config.
fn resolve_dataset(
    path: Option<PathBuf>,
    config: &AmemConfig,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    path.or_else(|| config.dataset_path.clone()).ok_or_else(|| {
        "no dataset path given and no dataset_path configured".into()
    })
}

/// Shortens text to `max` characters for table output.
fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max {
        single_line
    } else {
        let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
