use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, FileId, KeyboardButton, KeyboardMarkup, Me, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::bot::AppState;
use crate::dispatch::{self, Command, Route, MENU_ABOUT, MENU_HELP};
use crate::platform::{Attachment, AudioSource, IncomingMessage, MediaKind, RemoteAudio};
use crate::replies::{Markup, Reply};

/// Telegram rejects messages above 4096 characters
const MAX_MESSAGE_LEN: usize = 4000;

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

/// Downloads attachments through the Bot API file endpoint
pub struct TelegramFiles {
    bot: Bot,
}

impl TelegramFiles {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl AudioSource for TelegramFiles {
    async fn fetch(&self, file_id: &str) -> Result<RemoteAudio> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .context("Failed to resolve Telegram file")?;

        let mut bytes = Vec::with_capacity(file.size as usize);
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .with_context(|| format!("Failed to download Telegram file {}", file.path))?;

        debug!("Downloaded {} ({} bytes)", file.path, bytes.len());
        Ok(RemoteAudio {
            path: file.path,
            bytes,
        })
    }
}

/// Run the Telegram bot platform
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let bot = Bot::new(&state.config.telegram.bot_token);

    info!("Starting Telegram platform...");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    me: Me,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let incoming = to_incoming(&msg);
    let route = dispatch::route(&incoming, me.user.username.as_deref());

    if route == Route::Ignore {
        debug!(
            "Ignoring message {} in chat {}",
            incoming.message_id, incoming.chat_id
        );
        return Ok(());
    }

    info!(
        "Message {} from user {} in chat {} routed to {:?}",
        incoming.message_id,
        incoming.user_id.unwrap_or_default(),
        incoming.chat_id,
        route
    );

    if route == Route::Transcribe {
        bot.send_chat_action(msg.chat.id, ChatAction::Typing)
            .await
            .ok();
    }

    let files = TelegramFiles::new(bot.clone());
    if let Some(reply) = state.respond(route, &incoming, &files).await {
        send_reply(&bot, msg.chat.id, reply).await?;
    }

    Ok(())
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let chunks = split_message(&reply.text, MAX_MESSAGE_LEN);
    let last = chunks.len().saturating_sub(1);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut request = bot.send_message(chat_id, chunk);
        if reply.markup == Markup::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if reply.menu_keyboard && i == last {
            request = request.reply_markup(menu_keyboard());
        }
        request.await?;
    }

    Ok(())
}

fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(MENU_HELP),
        KeyboardButton::new(MENU_ABOUT),
    ]])
    .resize_keyboard()
    .persistent()
}

fn to_incoming(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        user_id: msg.from.as_ref().map(|user| user.id.0),
        text: msg.text().map(str::to_string),
        attachment: attachment_of(msg),
    }
}

fn attachment_of(msg: &Message) -> Option<Attachment> {
    if let Some(voice) = msg.voice() {
        return Some(Attachment {
            kind: MediaKind::Voice,
            file_id: voice.file.id.to_string(),
            file_name: None,
            size: voice.file.size,
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(Attachment {
            kind: MediaKind::Audio,
            file_id: audio.file.id.to_string(),
            file_name: audio.file_name.clone(),
            size: audio.file.size,
        });
    }
    msg.document().map(|document| Attachment {
        kind: MediaKind::Document,
        file_id: document.file.id.to_string(),
        file_name: document.file_name.clone(),
        size: document.file.size,
    })
}
