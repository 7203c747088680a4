use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const ENDPOINT_ENV: &str = "TRANSCRIBE_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attachments above this size are rejected before download.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u32,
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            timeout_secs: default_timeout_secs(),
            max_file_bytes: default_max_file_bytes(),
            temp_dir: default_temp_dir(),
        }
    }
}

impl TranscriptionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_endpoint_url() -> String {
    "https://saeedzou-nemo-asr.hf.space/transcribe".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

// Telegram bots cannot download files larger than 20 MB.
fn default_max_file_bytes() -> u32 {
    20 * 1024 * 1024
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("scribebot")
}

impl Config {
    /// Load the config file (defaults when it does not exist), apply
    /// environment overrides and validate the result.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Config::default()
        };

        let config = config.with_overrides(
            std::env::var(TOKEN_ENV).ok(),
            std::env::var(ENDPOINT_ENV).ok(),
        );
        config.validate()?;

        let temp_dir = &config.transcription.temp_dir;
        if !temp_dir.exists() {
            std::fs::create_dir_all(temp_dir).with_context(|| {
                format!("Failed to create temp directory: {}", temp_dir.display())
            })?;
        }

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Non-empty environment values win over the file.
    pub fn with_overrides(mut self, token: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.transcription.endpoint_url = endpoint.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!(
                "Telegram bot token is missing: set {} or [telegram] bot_token",
                TOKEN_ENV
            );
        }
        if self.transcription.endpoint_url.trim().is_empty() {
            anyhow::bail!("[transcription] endpoint_url must not be empty");
        }
        if self.transcription.timeout_secs == 0 {
            anyhow::bail!("[transcription] timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
