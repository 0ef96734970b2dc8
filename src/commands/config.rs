//! Config command handler.

use amem::AmemConfig;
use amem::llm::OpenAiClient;

/// Config command.
pub fn cmd_config(config: &AmemConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !show {
        match &config.source {
            Some(source) => println!("Config file: {}", source.display()),
            None => println!("Config file: (none - using defaults)"),
        }
        println!("Use --show to display the effective configuration.");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Config File:");
    match &config.source {
        Some(source) => println!("  - {}", source.display()),
        None => println!("  (none - using defaults)"),
    }
    println!();

    println!("Data Directory: {}", config.data_dir.display());
    println!(
        "Dataset: {}",
        config
            .dataset_path
            .as_ref()
            .map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
    );
    println!("Interaction Log: {}", config.interaction_log_path().display());
    println!();

    println!("Logging:");
    println!(
        "  Level: {}",
        config.logging.level.as_deref().unwrap_or("(default)")
    );
    println!("  Format: {:?}", config.logging.format);
    println!(
        "  File: {}",
        config
            .logging
            .file
            .as_ref()
            .map_or_else(|| "(stderr)".to_string(), |p| p.display().to_string())
    );
    println!();

    println!("LLM Configuration:");
    println!(
        "  Model: {}",
        config.llm.model.as_deref().unwrap_or(OpenAiClient::DEFAULT_MODEL)
    );
    println!(
        "  Base URL: {}",
        config
            .llm
            .base_url
            .as_deref()
            .unwrap_or(OpenAiClient::DEFAULT_ENDPOINT)
    );
    let key_source = if config.llm.api_key.is_some() {
        "config"
    } else if std::env::var("OPENAI_API_KEY").is_ok() {
        "OPENAI_API_KEY"
    } else {
        "(not set)"
    };
    println!("  API Key: {key_source}");
    println!(
        "  Temperature: {}",
        config
            .llm
            .temperature
            .unwrap_or(OpenAiClient::DEFAULT_TEMPERATURE)
    );

    Ok(())
}
