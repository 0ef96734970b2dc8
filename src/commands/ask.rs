//! Ask command handler.

use std::sync::Arc;

use amem::llm::{LlmProvider, LoggedLlmProvider, OpenAiClient};
use amem::{AmemConfig, InteractionLog};

/// Ask command: one completion through the configured provider, logged.
pub fn cmd_ask(
    config: &AmemConfig,
    prompt: &str,
    model: Option<String>,
    temperature: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = OpenAiClient::from_config(&config.llm);
    if let Some(model) = model {
        client = client.with_model(model);
    }
    if let Some(temperature) = temperature {
        client = client.with_temperature(temperature);
    }

    let log = Arc::new(InteractionLog::open(config.interaction_log_path())?);
    let provider = LoggedLlmProvider::new(client, log);

    let response = provider.complete(prompt)?;
    println!("{response}");

    Ok(())
}
