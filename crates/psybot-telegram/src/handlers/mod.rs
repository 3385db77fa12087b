//! Telegram update handlers.
//!
//! Each message is converted into a classified `InboundEvent` and handed to the core
//! dispatcher; everything past that point is platform-agnostic.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::debug;

use psybot_core::{
    domain::{ChatId, Sender, UserId},
    messaging::types::{AudioAttachment, EventMeta, InboundEvent},
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(event) = to_event(&msg, state.bot_username.as_deref()) else {
        debug!(chat_id = msg.chat.id.0, "message without sender, skipping");
        return Ok(());
    };

    state
        .dispatcher
        .handle(state.messenger.as_ref(), event)
        .await;
    Ok(())
}

/// Convert a Telegram message into a classified event; `None` for messages without a sender
/// (channel posts). Commands addressed to another bot become `Ignore`.
pub fn to_event(msg: &Message, bot_username: Option<&str>) -> Option<InboundEvent> {
    let user = msg.from()?;

    let meta = EventMeta {
        chat_id: ChatId(msg.chat.id.0),
        sender: Sender {
            id: UserId(user.id.0 as i64),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        },
    };

    let audio = msg.audio().map(|a| AudioAttachment {
        file_id: a.file.id.clone(),
        performer: a.performer.clone(),
        title: a.title.clone(),
    });

    Some(InboundEvent::classify(meta, msg.text(), audio).addressed_to(bot_username))
}
