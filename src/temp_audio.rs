use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dispatch::file_extension;

const FALLBACK_EXTENSION: &str = "ogg";

/// Audio written to local disk for the duration of one request.
/// The file is removed when the guard is dropped, whatever the outcome.
#[derive(Debug)]
pub struct TempAudioFile {
    path: PathBuf,
}

impl TempAudioFile {
    /// Write `bytes` to a uniquely named file inside `dir`.
    pub async fn create(dir: &Path, extension: &str, bytes: &[u8]) -> Result<Self> {
        let path = dir.join(format!("audio-{}.{}", Uuid::new_v4(), extension));
        // Guard first so a partially written file is removed too.
        let file = Self { path };
        tokio::fs::write(&file.path, bytes)
            .await
            .with_context(|| format!("Failed to write temp audio: {}", file.path.display()))?;
        debug!("Wrote {} bytes to {}", bytes.len(), file.path.display());
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(FALLBACK_EXTENSION)
    }
}

impl Drop for TempAudioFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp audio {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temp audio {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Extension for the local copy: from the remote path, else the user's file
/// name, else `ogg`. Anything that is not a short alphanumeric token is
/// rejected so it cannot escape the file name.
pub fn pick_extension(remote_path: &str, file_name: Option<&str>) -> String {
    std::iter::once(remote_path)
        .chain(file_name)
        .filter_map(file_extension)
        .find(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
