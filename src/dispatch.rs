use teloxide::utils::command::BotCommands;

use crate::platform::{Attachment, IncomingMessage, MediaKind};

/// Document extensions accepted for transcription
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// Menu keyboard labels, also accepted as plain text
pub const MENU_HELP: &str = "Help";
pub const MENU_ABOUT: &str = "About";

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "explain how to use the bot")]
    Help,
    #[command(description = "what this bot does")]
    About,
}

impl Command {
    /// Parse the leading `/command` of a message. A `@botname` suffix must
    /// name this bot when `bot_username` is known; arguments are ignored.
    pub fn from_text(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;
        let (name, addressee) = match token.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (token, None),
        };

        if let (Some(addressee), Some(me)) = (addressee, bot_username) {
            if !addressee.eq_ignore_ascii_case(me) {
                return None;
            }
        }

        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "about" => Some(Command::About),
            _ => None,
        }
    }
}

/// The single handler selected for an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Start,
    Help,
    About,
    Transcribe,
    Ignore,
}

impl From<Command> for Route {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Route::Start,
            Command::Help => Route::Help,
            Command::About => Route::About,
        }
    }
}

/// Commands first, then media, then the menu vocabulary.
pub fn route(msg: &IncomingMessage, bot_username: Option<&str>) -> Route {
    if let Some(command) = msg
        .text
        .as_deref()
        .and_then(|text| Command::from_text(text, bot_username))
    {
        return command.into();
    }

    if msg.attachment.as_ref().is_some_and(is_transcribable) {
        return Route::Transcribe;
    }

    match msg.text.as_deref() {
        Some(MENU_HELP) => Route::Help,
        Some(MENU_ABOUT) => Route::About,
        _ => Route::Ignore,
    }
}

/// Voice notes and audio files always qualify; documents only with an
/// allowed extension.
pub fn is_transcribable(attachment: &Attachment) -> bool {
    match attachment.kind {
        MediaKind::Voice | MediaKind::Audio => true,
        MediaKind::Document => attachment
            .file_name
            .as_deref()
            .and_then(file_extension)
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str())),
    }
}

/// Lowercased extension of a file name or path, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(t: &str) -> IncomingMessage {
        IncomingMessage {
            text: Some(t.to_string()),
            ..Default::default()
        }
    }

    fn media(kind: MediaKind, file_name: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            attachment: Some(Attachment {
                kind,
                file_id: "file-1".to_string(),
                file_name: file_name.map(str::to_string),
                size: 1024,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_commands() {
        assert_eq!(route(&text("/start"), None), Route::Start);
        assert_eq!(route(&text("/help"), None), Route::Help);
        assert_eq!(route(&text("/about"), None), Route::About);
    }

    #[test]
    fn test_command_arguments_are_ignored() {
        assert_eq!(route(&text("/help me please"), None), Route::Help);
    }

    #[test]
    fn test_command_addressed_to_this_bot() {
        assert_eq!(
            route(&text("/start@Scribe_Bot"), Some("scribe_bot")),
            Route::Start
        );
        assert_eq!(route(&text("/start@other_bot"), Some("scribe_bot")), Route::Ignore);
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        assert_eq!(route(&text("/settings"), None), Route::Ignore);
        assert_eq!(route(&text("/"), None), Route::Ignore);
    }

    #[test]
    fn test_menu_text_matches_exactly() {
        assert_eq!(route(&text("Help"), None), Route::Help);
        assert_eq!(route(&text("About"), None), Route::About);
        assert_eq!(route(&text("help"), None), Route::Ignore);
        assert_eq!(route(&text("Help "), None), Route::Ignore);
        assert_eq!(route(&text("hello there"), None), Route::Ignore);
    }

    #[test]
    fn test_voice_and_audio_always_transcribe() {
        assert_eq!(route(&media(MediaKind::Voice, None), None), Route::Transcribe);
        assert_eq!(route(&media(MediaKind::Audio, None), None), Route::Transcribe);
        assert_eq!(
            route(&media(MediaKind::Audio, Some("song.flac")), None),
            Route::Transcribe
        );
    }

    #[test]
    fn test_documents_with_allowed_extensions_transcribe() {
        for name in ["a.mp3", "b.wav", "c.ogg", "LOUD.MP3", "dots.in.name.Wav"] {
            assert_eq!(
                route(&media(MediaKind::Document, Some(name)), None),
                Route::Transcribe,
                "{name}"
            );
        }
    }

    #[test]
    fn test_other_documents_are_ignored() {
        for name in ["notes.txt", "clip.m4a", "video.mp4", "mp3", ".ogg", "archive.ogg.zip"] {
            assert_eq!(
                route(&media(MediaKind::Document, Some(name)), None),
                Route::Ignore,
                "{name}"
            );
        }
        assert_eq!(route(&media(MediaKind::Document, None), None), Route::Ignore);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("voice/file_12.oga").as_deref(), Some("oga"));
        assert_eq!(file_extension("Track.MP3").as_deref(), Some("mp3"));
        assert_eq!(file_extension("documents/noext"), None);
        assert_eq!(file_extension("dir.v2/noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_bot_command_descriptions() {
        let descriptions = Command::descriptions().to_string();
        assert!(descriptions.contains("/start"));
        assert!(descriptions.contains("/help"));
        assert!(descriptions.contains("/about"));
    }
}
