use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dispatch::Route;
use crate::platform::{AudioSource, IncomingMessage};
use crate::replies::{self, Reply};
use crate::temp_audio::{pick_extension, TempAudioFile};
use crate::transcriber::{TranscriptionClient, TranscriptionOutcome};

/// Shared application state
pub struct AppState {
    pub config: Config,
    transcriber: TranscriptionClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriptionClient::new(&config.transcription)?;
        Ok(Self {
            config,
            transcriber,
        })
    }

    /// Run the handler selected by the dispatcher. `None` means no reply.
    pub async fn respond(
        &self,
        route: Route,
        msg: &IncomingMessage,
        files: &dyn AudioSource,
    ) -> Option<Reply> {
        match route {
            Route::Start => Some(replies::start()),
            Route::Help => Some(replies::help()),
            Route::About => Some(replies::about()),
            Route::Transcribe => Some(self.transcribe(msg, files).await),
            Route::Ignore => None,
        }
    }

    async fn transcribe(&self, msg: &IncomingMessage, files: &dyn AudioSource) -> Reply {
        match self.try_transcribe(msg, files).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    "Transcription failed for chat {} message {}: {:#}",
                    msg.chat_id, msg.message_id, e
                );
                Reply::plain(replies::PROCESSING_FAILED)
            }
        }
    }

    async fn try_transcribe(
        &self,
        msg: &IncomingMessage,
        files: &dyn AudioSource,
    ) -> Result<Reply> {
        let Some(attachment) = msg.attachment.as_ref() else {
            warn!("Transcription requested without an attachment");
            return Ok(Reply::plain(replies::EMPTY_FILE));
        };

        let max_bytes = self.config.transcription.max_file_bytes;
        if attachment.size > max_bytes {
            info!(
                "Rejecting {} of {} bytes (limit {})",
                attachment.kind, attachment.size, max_bytes
            );
            return Ok(replies::file_too_large(max_bytes));
        }

        let remote = files
            .fetch(&attachment.file_id)
            .await
            .with_context(|| format!("Failed to download {}", attachment.kind))?;
        if remote.bytes.is_empty() {
            return Ok(Reply::plain(replies::EMPTY_FILE));
        }

        let extension = pick_extension(&remote.path, attachment.file_name.as_deref());
        let audio = TempAudioFile::create(
            &self.config.transcription.temp_dir,
            &extension,
            &remote.bytes,
        )
        .await?;

        info!(
            "Transcribing {} ({} bytes) from chat {}",
            attachment.kind,
            remote.bytes.len(),
            msg.chat_id
        );

        let reply = match self.transcriber.transcribe(&audio).await? {
            TranscriptionOutcome::Text(text) => replies::transcription(Some(&text)),
            TranscriptionOutcome::Missing => replies::transcription(None),
            TranscriptionOutcome::Rejected { status, body } => {
                error!(
                    "Transcription service at {} returned {}: {}",
                    self.transcriber.endpoint_url(),
                    status,
                    body
                );
                Reply::plain(replies::SERVICE_ERROR)
            }
        };

        Ok(reply)
    }
}
