//! Telegram adapter (teloxide).
//!
//! This crate implements the `psybot-core` MessagingPort over the Telegram Bot API and
//! runs the update loop that feeds the core dispatcher.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        BotCommand, BotCommandScope, InputFile, KeyboardButton, KeyboardMarkup, ParseMode,
        Recipient,
    },
};

pub mod handlers;
pub mod router;

use psybot_core::{
    commands::CommandDescriptor,
    domain::ChatId,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{MessagingCapabilities, ReplyKeyboard},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
    max_message_len: usize,
}

impl TelegramMessenger {
    pub fn new(bot: Bot, max_message_len: usize) -> Self {
        Self {
            bot,
            max_message_len: max_message_len.clamp(1, 4096),
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

pub(crate) fn to_keyboard_markup(keyboard: &ReplyKeyboard) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect())
        .collect();
    KeyboardMarkup::new(rows)
        .resize_keyboard(keyboard.resize)
        .selective(keyboard.selective)
}

pub(crate) fn to_bot_commands(commands: &[CommandDescriptor]) -> Vec<BotCommand> {
    commands
        .iter()
        .map(|c| BotCommand::new(c.bare_name(), c.description))
        .collect()
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: self.max_message_len,
        }
    }

    async fn send_text(&self, chat_id: ChatId, html: &str, keyboard: &ReplyKeyboard) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .reply_markup(to_keyboard_markup(keyboard))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, file_ref: &str) -> Result<()> {
        self.bot
            .send_audio(Self::tg_chat(chat_id), InputFile::file_id(file_ref.to_string()))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn register_menu(&self, chat_id: ChatId, commands: &[CommandDescriptor]) -> Result<()> {
        self.bot
            .set_my_commands(to_bot_commands(commands))
            .scope(BotCommandScope::Chat {
                chat_id: Recipient::Id(Self::tg_chat(chat_id)),
            })
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
