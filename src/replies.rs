use crate::dispatch::ALLOWED_EXTENSIONS;

pub const START_TEXT: &str = "<b>Hi!</b> Send me a voice message or an audio file, \
and I'll transcribe it for you.";

pub const ABOUT_TEXT: &str = "<b>About</b>\n\n\
This bot forwards your audio to a speech recognition service and sends the \
transcript back to this chat.\n\n\
Audio is stored only while it is being transcribed and deleted right after.";

pub const NO_TRANSCRIPTION: &str = "No transcription found.";
pub const SERVICE_ERROR: &str = "Error transcribing the audio.";
pub const PROCESSING_FAILED: &str =
    "Something went wrong while processing your audio. Please try again later.";
pub const EMPTY_FILE: &str = "The file you sent is empty, there is nothing to transcribe.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Plain,
    Html,
}

/// Outbound message for the originating chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
    /// Attach the persistent Help/About keyboard
    pub menu_keyboard: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Plain,
            menu_keyboard: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Html,
            menu_keyboard: false,
        }
    }

    pub fn with_menu(mut self) -> Self {
        self.menu_keyboard = true;
        self
    }
}

pub fn start() -> Reply {
    Reply::html(START_TEXT).with_menu()
}

pub fn help() -> Reply {
    let formats = ALLOWED_EXTENSIONS.join(", ");
    Reply::html(format!(
        "<b>How to use</b>\n\n\
         • Record a voice message, or\n\
         • send an audio file, or\n\
         • send a document in one of these formats: {formats}\n\n\
         I'll reply with the transcribed text."
    ))
}

pub fn about() -> Reply {
    Reply::html(ABOUT_TEXT)
}

/// Reply for a successful call; blank or missing text gets the fallback.
pub fn transcription(text: Option<&str>) -> Reply {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => Reply::plain(format!("Transcription: {text}")),
        None => Reply::plain(NO_TRANSCRIPTION),
    }
}

pub fn file_too_large(max_bytes: u32) -> Reply {
    let mb = f64::from(max_bytes) / (1024.0 * 1024.0);
    Reply::plain(format!(
        "This file is too large. The maximum size is {mb:.0} MB."
    ))
}
