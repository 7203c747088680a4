//! scribebot setup wizard.
//!
//! Asks for the bot token and transcription settings in the terminal and
//! writes `config.toml` to the project root (`SCRIBEBOT_ROOT`, default the
//! current directory).

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_ENDPOINT: &str = "https://saeedzou-nemo-asr.hf.space/transcribe";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ── Config formatting ──────────────────────────────────────────────────────────

struct ConfigParams<'a> {
    tg_token: &'a str,
    endpoint_url: &'a str,
    timeout_secs: u64,
    temp_dir: &'a str,
}

/// Produces a valid config.toml string. Extracted so it can be unit-tested.
fn format_config(p: &ConfigParams<'_>) -> String {
    let token_line = if p.tg_token.is_empty() {
        "# bot_token = \"\"  # or set TELEGRAM_BOT_TOKEN".to_owned()
    } else {
        format!("bot_token = \"{}\"", p.tg_token)
    };

    let temp_line = if p.temp_dir.is_empty() {
        "# temp_dir = \"/tmp/scribebot\"".to_owned()
    } else {
        format!("temp_dir = \"{}\"", p.temp_dir)
    };

    let endpoint_url = p.endpoint_url;
    let timeout_secs = p.timeout_secs;

    format!(
        r#"[telegram]
{token_line}

[transcription]
endpoint_url = "{endpoint_url}"
timeout_secs = {timeout_secs}
{temp_line}
"#
    )
}

fn parse_timeout(input: &str) -> Result<u64> {
    if input.is_empty() {
        return Ok(DEFAULT_TIMEOUT_SECS);
    }
    let secs: u64 = input
        .parse()
        .with_context(|| format!("Invalid timeout: {input}"))?;
    if secs == 0 {
        anyhow::bail!("Timeout must be greater than zero");
    }
    Ok(secs)
}

// ── CLI mode ───────────────────────────────────────────────────────────────────

fn run_cli(project_root: &Path) -> Result<()> {
    println!("=== scribebot setup ===\n");

    let read_line = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_owned())
    };

    let or_default = |s: String, default: &str| {
        if s.is_empty() {
            default.to_owned()
        } else {
            s
        }
    };

    let tg_token = read_line("Telegram bot token (empty to use TELEGRAM_BOT_TOKEN): ")?;
    let endpoint_url = or_default(
        read_line(&format!("Transcription endpoint [{DEFAULT_ENDPOINT}]: "))?,
        DEFAULT_ENDPOINT,
    );
    let timeout_secs = parse_timeout(&read_line(&format!(
        "Request timeout in seconds [{DEFAULT_TIMEOUT_SECS}]: "
    ))?)?;
    let temp_dir = read_line("Temp directory for audio (empty for system default): ")?;

    let config = format_config(&ConfigParams {
        tg_token: &tg_token,
        endpoint_url: &endpoint_url,
        timeout_secs,
        temp_dir: &temp_dir,
    });

    let config_path = project_root.join("config.toml");
    std::fs::write(&config_path, &config)
        .with_context(|| format!("Could not write {}", config_path.display()))?;

    println!("\n✓  config.toml saved to {}", config_path.display());
    println!("   Run the bot with:  cargo run");
    Ok(())
}

fn main() -> Result<()> {
    let project_root =
        PathBuf::from(std::env::var("SCRIBEBOT_ROOT").unwrap_or_else(|_| ".".to_string()));
    run_cli(&project_root)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
