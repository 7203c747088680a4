mod bot;
mod config;
mod dispatch;
mod platform;
mod replies;
mod temp_audio;
mod transcriber;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scribebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Endpoint: {}", config.transcription.endpoint_url);
    info!("  Timeout: {}s", config.transcription.timeout_secs);
    info!("  Temp dir: {}", config.transcription.temp_dir.display());

    let state = Arc::new(AppState::new(config)?);

    info!("Bot is starting...");
    platform::telegram::run(state).await?;

    Ok(())
}
