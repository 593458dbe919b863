use std::sync::Arc;

use clean_check::channels::TelegramChannel;
use clean_check::checklist::SessionStore;
use clean_check::config::ChecklistConfig;
use clean_check::error::ConfigError;
use clean_check::llm::{DEFAULT_MODEL, OpenAiVisionGateway};
use clean_check::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ChecklistConfig::from_env()?;
    let bot_token = require_env("BOT_TOKEN")?;
    let api_key = require_env("OPENAI_API_KEY")?;
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    eprintln!("🧹 Clean Check v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Locations: {}", config.locations);
    eprintln!("   Checklist entries: {}", config.entries);
    eprintln!("   Model: {model}");
    eprintln!("   Send /start to the bot to begin.\n");

    let store = Arc::new(SessionStore::new(config.entries));
    let gateway = Arc::new(OpenAiVisionGateway::new(
        secrecy::SecretString::from(api_key),
        model,
    )?);
    let transport = Arc::new(TelegramChannel::new(secrecy::SecretString::from(bot_token)));

    let orchestrator = Orchestrator::new(config, store, gateway, transport);
    orchestrator.run().await?;

    Ok(())
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}
