//! Hexagonal ports for the durable collaborators.
//!
//! The SQLite adapter lives in `psybot-sqlite`; tests use in-memory fakes.

use async_trait::async_trait;

use crate::{
    domain::{AdminRecord, Affirmation, MusicTrack, NewTrack, UserId},
    Result,
};

/// Durable keyed collection of admin records, keyed by Telegram user id.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn exists(&self, telegram_id: UserId) -> Result<bool>;

    /// Persist `record`, returning it with its durable `id` assigned.
    async fn save(&self, record: AdminRecord) -> Result<AdminRecord>;

    async fn delete_by_telegram_id(&self, telegram_id: UserId) -> Result<()>;
}

#[async_trait]
pub trait AffirmationStore: Send + Sync {
    async fn add(
        &self,
        text: &str,
        author_id: UserId,
        author_username: Option<&str>,
    ) -> Result<Affirmation>;

    /// All affirmations, oldest first.
    async fn list_ordered_by_creation(&self) -> Result<Vec<Affirmation>>;

    async fn random(&self) -> Result<Option<Affirmation>>;

    /// Delete every affirmation, returning how many were removed.
    async fn delete_all(&self) -> Result<u64>;
}

#[async_trait]
pub trait TrackStore: Send + Sync {
    async fn add(&self, track: NewTrack) -> Result<MusicTrack>;

    async fn exists(&self, id: i64) -> Result<bool>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn random(&self) -> Result<Option<MusicTrack>>;

    async fn list_all(&self) -> Result<Vec<MusicTrack>>;
}
