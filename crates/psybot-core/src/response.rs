//! Outbound payload assembly and best-effort delivery.

use tracing::{error, warn};

use crate::{
    commands::CommandDescriptor,
    domain::ChatId,
    formatting::split_message,
    messaging::{port::MessagingPort, types::ReplyKeyboard},
};

pub const AFFIRMATION_PREFIX: &str = "🤍";
pub const GET_AFFIRMATION_BUTTON: &str = "🤍 Get affirmation";
pub const GET_MUSIC_BUTTON: &str = "🎵 Get music track";

/// The persistent keyboard attached to every text reply.
pub fn main_keyboard() -> ReplyKeyboard {
    ReplyKeyboard::one_per_row(&[GET_AFFIRMATION_BUTTON, GET_MUSIC_BUTTON])
}

/// What a handler produced, before any transport concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// HTML text reply.
    Reply(String),
    /// A stored audio file, sent instead of any text.
    Audio(String),
    /// Nothing is sent, not even a menu update.
    Silent,
}

impl Outcome {
    pub fn reply(text: impl Into<String>) -> Self {
        Outcome::Reply(text.into())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Audio(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundResponse {
    pub chat_id: ChatId,
    pub body: Body,
    pub keyboard: ReplyKeyboard,
    pub menu: &'static [CommandDescriptor],
}

/// Build the outbound payload for `outcome`; `None` for silent outcomes.
pub fn assemble(
    chat_id: ChatId,
    outcome: Outcome,
    menu: &'static [CommandDescriptor],
) -> Option<OutboundResponse> {
    let body = match outcome {
        Outcome::Reply(text) => Body::Text(text),
        Outcome::Audio(file_ref) => Body::Audio(file_ref),
        Outcome::Silent => return None,
    };

    Some(OutboundResponse {
        chat_id,
        body,
        keyboard: main_keyboard(),
        menu,
    })
}

/// Register the sender's menu, then send the body. Failures are logged and dropped.
pub async fn deliver(messenger: &dyn MessagingPort, response: &OutboundResponse) {
    let chat_id = response.chat_id;

    if let Err(e) = messenger.register_menu(chat_id, response.menu).await {
        warn!(chat_id = chat_id.0, "failed to register command menu: {e}");
    }

    match &response.body {
        Body::Text(html) => {
            let limit = messenger.capabilities().max_message_len.max(1);
            for chunk in split_message(html, limit) {
                if let Err(e) = messenger
                    .send_text(chat_id, &chunk, &response.keyboard)
                    .await
                {
                    error!(chat_id = chat_id.0, "failed to send message: {e}");
                    break;
                }
            }
        }
        Body::Audio(file_ref) => {
            if let Err(e) = messenger.send_audio(chat_id, file_ref).await {
                error!(chat_id = chat_id.0, "failed to send audio: {e}");
            }
        }
    }
}
