use crate::{
    commands::{self, COMMAND_MARKER},
    domain::{ChatId, Sender},
};

/// Reply keyboard (persistent buttons under the input field).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
    pub selective: bool,
}

impl ReplyKeyboard {
    /// Convenience for "one button per row" layouts.
    pub fn one_per_row(labels: &[&str]) -> Self {
        Self {
            rows: labels.iter().map(|l| vec![l.to_string()]).collect(),
            resize: true,
            selective: true,
        }
    }
}

/// Capabilities / limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}

/// Fields shared by every inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMeta {
    pub chat_id: ChatId,
    pub sender: Sender,
}

/// Audio attached to a message, with whatever tags the platform reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioAttachment {
    pub file_id: String,
    pub performer: Option<String>,
    pub title: Option<String>,
}

/// One inbound platform update, already classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    Command { meta: EventMeta, text: String },
    Audio { meta: EventMeta, audio: AudioAttachment },
    Text { meta: EventMeta, text: String },
    Ignore { meta: EventMeta },
}

impl InboundEvent {
    /// Classify a raw message: command marker first, then audio, then free text.
    pub fn classify(meta: EventMeta, text: Option<&str>, audio: Option<AudioAttachment>) -> Self {
        match (text, audio) {
            (Some(t), _) if t.starts_with(COMMAND_MARKER) => InboundEvent::Command {
                meta,
                text: t.to_string(),
            },
            (_, Some(audio)) => InboundEvent::Audio { meta, audio },
            (Some(t), None) => InboundEvent::Text {
                meta,
                text: t.to_string(),
            },
            (None, None) => InboundEvent::Ignore { meta },
        }
    }

    /// Turn a command addressed to a different bot (`/cmd@otherbot`) into `Ignore`.
    ///
    /// With no known bot username every command is kept.
    pub fn addressed_to(self, bot_username: Option<&str>) -> Self {
        match (self, bot_username) {
            (InboundEvent::Command { meta, text }, Some(me))
                if !commands::addressed_to(&text, me) =>
            {
                InboundEvent::Ignore { meta }
            }
            (event, _) => event,
        }
    }

    pub fn meta(&self) -> &EventMeta {
        match self {
            InboundEvent::Command { meta, .. }
            | InboundEvent::Audio { meta, .. }
            | InboundEvent::Text { meta, .. }
            | InboundEvent::Ignore { meta } => meta,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Command { .. } => "command",
            InboundEvent::Audio { .. } => "audio",
            InboundEvent::Text { .. } => "text",
            InboundEvent::Ignore { .. } => "ignore",
        }
    }
}
