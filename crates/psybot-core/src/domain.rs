use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Who sent an inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// A durable administrator record.
///
/// `id` is assigned by the store on save; it is `0` for records not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminRecord {
    pub id: i64,
    pub telegram_id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl AdminRecord {
    pub fn from_sender(sender: &Sender) -> Self {
        Self {
            id: 0,
            telegram_id: sender.id,
            username: sender.username.clone(),
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Affirmation {
    pub id: i64,
    pub text: String,
    pub author_id: UserId,
    pub author_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MusicTrack {
    pub id: i64,
    pub file_id: String,
    pub author_id: UserId,
    pub author_username: Option<String>,
    pub artist: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to store a new track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTrack {
    pub file_id: String,
    pub author_id: UserId,
    pub author_username: Option<String>,
    pub artist: String,
    pub title: String,
}
