//! Binary entry point for amem.
//!
//! This binary provides the CLI for inspecting `LoCoMo` datasets, scoring
//! predicted answers and reviewing logged LLM interactions.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use amem::AmemConfig;
use amem::observability::{self, LoggingConfig};
use clap::{Parser, Subcommand};
use commands::{DatasetAction, EvaluateArgs, LogsAction, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;

/// amem - evaluate agentic memory systems on the `LoCoMo` benchmark.
#[derive(Parser)]
#[command(name = "amem")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Inspect a `LoCoMo` dataset.
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },

    /// Score one prediction against one reference answer.
    Score {
        /// The predicted answer.
        prediction: String,

        /// The reference answer.
        reference: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Score a predictions file against a dataset.
    Evaluate(EvaluateArgs),

    /// Inspect the LLM interaction log.
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },

    /// Send one prompt to the configured LLM and log the interaction.
    Ask {
        /// The prompt.
        prompt: String,

        /// Model override.
        #[arg(short, long)]
        model: Option<String>,

        /// Temperature override.
        #[arg(short, long)]
        temperature: Option<f32>,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is the common case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AmemConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(&config.logging, cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &AmemConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Dataset { action } => match action {
            DatasetAction::Stats { path, format } => {
                commands::cmd_dataset_stats(config, path, format)
            },
            DatasetAction::Show {
                path,
                sample,
                turns,
            } => commands::cmd_dataset_show(config, path, sample, turns),
        },

        Commands::Score {
            prediction,
            reference,
            format,
        } => commands::cmd_score(&prediction, &reference, format),

        Commands::Evaluate(args) => commands::cmd_evaluate(config, args),

        Commands::Logs { action } => match action {
            LogsAction::List { limit, model } => {
                commands::cmd_logs_list(config, limit, model.as_deref())
            },
            LogsAction::Stats => commands::cmd_logs_stats(config),
        },

        Commands::Ask {
            prompt,
            model,
            temperature,
        } => commands::cmd_ask(config, &prompt, model, temperature),

        Commands::Config { show } => commands::cmd_config(config, show),
    }
}
