pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A message received from the platform, reduced to what the handlers need
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Platform-specific chat ID
    pub chat_id: i64,
    /// Platform-specific message ID
    pub message_id: i32,
    /// Sender, absent for channel posts
    pub user_id: Option<u64>,
    /// The message text, if any
    pub text: Option<String>,
    /// Attached media, if any
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Voice,
    Audio,
    Document,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Voice => write!(f, "voice"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Document => write!(f, "document"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: MediaKind,
    /// Opaque platform file ID, resolved through an [`AudioSource`]
    pub file_id: String,
    /// Original file name as sent by the user (audio and documents only)
    pub file_name: Option<String>,
    /// Declared size in bytes
    pub size: u32,
}

/// Downloaded attachment payload
#[derive(Debug, Clone)]
pub struct RemoteAudio {
    /// Path of the file on the platform's file server, e.g. `voice/file_12.oga`
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Resolves attachment file IDs to their contents.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<RemoteAudio>;
}
