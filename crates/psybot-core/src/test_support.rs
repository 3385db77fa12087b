//! In-memory fakes for the ports, shared by unit tests.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::{
    commands::CommandDescriptor,
    domain::{AdminRecord, Affirmation, ChatId, MusicTrack, NewTrack, Sender, UserId},
    messaging::{
        port::MessagingPort,
        types::{MessagingCapabilities, ReplyKeyboard},
    },
    ports::{AdminStore, AffirmationStore, TrackStore},
    Error, Result,
};

pub fn sender(id: i64) -> Sender {
    Sender {
        id: UserId(id),
        username: Some(format!("user{id}")),
        first_name: format!("First{id}"),
        last_name: None,
    }
}

fn failure() -> Error {
    Error::Store("injected failure".to_string())
}

// ============== Admin store ==============

#[derive(Default)]
pub struct MemAdminStore {
    records: Mutex<BTreeMap<i64, AdminRecord>>,
    next_id: AtomicUsize,
    exists_calls: AtomicUsize,
    save_calls: AtomicUsize,
    failing: AtomicBool,
    read_gate: Option<Semaphore>,
    save_gate: Option<Semaphore>,
}

impl MemAdminStore {
    /// A store whose `exists` answers are computed immediately but released only after
    /// `open_gate()`.
    pub fn gated() -> Self {
        Self {
            read_gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// A store whose `save` commits the row immediately but returns only after
    /// `open_save_gate()`.
    pub fn with_gated_saves() -> Self {
        Self {
            save_gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn insert(&self, id: UserId) {
        let rec = AdminRecord::from_sender(&sender(id.0));
        self.records.lock().unwrap().insert(id.0, rec);
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.records.lock().unwrap().contains_key(&id.0)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.read_gate {
            gate.add_permits(1024);
        }
    }

    pub fn open_save_gate(&self) {
        if let Some(gate) = &self.save_gate {
            gate.add_permits(1024);
        }
    }

    pub async fn wait_for_committed_save(&self, id: UserId) {
        while !self.contains(id) {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_pending_reads(&self, n: usize) {
        while self.exists_calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl AdminStore for MemAdminStore {
    async fn exists(&self, telegram_id: UserId) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        let answer = if self.failing.load(Ordering::SeqCst) {
            Err(failure())
        } else {
            Ok(self.contains(telegram_id))
        };
        if let Some(gate) = &self.read_gate {
            let _permit = gate.acquire().await.map_err(|_| failure())?;
        }
        answer
    }

    async fn save(&self, mut record: AdminRecord) -> Result<AdminRecord> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(failure());
        }
        record.id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.records
            .lock()
            .unwrap()
            .insert(record.telegram_id.0, record.clone());
        if let Some(gate) = &self.save_gate {
            let _permit = gate.acquire().await.map_err(|_| failure())?;
        }
        Ok(record)
    }

    async fn delete_by_telegram_id(&self, telegram_id: UserId) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(failure());
        }
        self.records.lock().unwrap().remove(&telegram_id.0);
        Ok(())
    }
}

// ============== Affirmation store ==============

#[derive(Default)]
pub struct MemAffirmationStore {
    items: Mutex<Vec<Affirmation>>,
    failing: AtomicBool,
}

impl MemAffirmationStore {
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.text.clone())
            .collect()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(failure());
        }
        Ok(())
    }
}

#[async_trait]
impl AffirmationStore for MemAffirmationStore {
    async fn add(
        &self,
        text: &str,
        author_id: UserId,
        author_username: Option<&str>,
    ) -> Result<Affirmation> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let n = items.len() as i64;
        let a = Affirmation {
            id: n + 1,
            text: text.to_string(),
            author_id,
            author_username: author_username.map(str::to_string),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(n),
        };
        items.push(a.clone());
        Ok(a)
    }

    async fn list_ordered_by_creation(&self) -> Result<Vec<Affirmation>> {
        self.check()?;
        let mut items = self.items.lock().unwrap().clone();
        items.sort_by_key(|a| (a.created_at, a.id));
        Ok(items)
    }

    async fn random(&self) -> Result<Option<Affirmation>> {
        self.check()?;
        Ok(self.items.lock().unwrap().last().cloned())
    }

    async fn delete_all(&self) -> Result<u64> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let n = items.len() as u64;
        items.clear();
        Ok(n)
    }
}

// ============== Track store ==============

#[derive(Default)]
pub struct MemTrackStore {
    items: Mutex<Vec<MusicTrack>>,
    delete_calls: AtomicUsize,
}

impl MemTrackStore {
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn tracks(&self) -> Vec<MusicTrack> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackStore for MemTrackStore {
    async fn add(&self, track: NewTrack) -> Result<MusicTrack> {
        let mut items = self.items.lock().unwrap();
        let id = items.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let t = MusicTrack {
            id,
            file_id: track.file_id,
            author_id: track.author_id,
            author_username: track.author_username,
            artist: track.artist,
            title: track.title,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        items.push(t.clone());
        Ok(t)
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.items.lock().unwrap().iter().any(|t| t.id == id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.items.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn random(&self) -> Result<Option<MusicTrack>> {
        Ok(self.items.lock().unwrap().first().cloned())
    }

    async fn list_all(&self) -> Result<Vec<MusicTrack>> {
        Ok(self.items.lock().unwrap().clone())
    }
}

// ============== Messenger ==============

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Menu(ChatId, Vec<&'static str>),
    Text(ChatId, String),
    Audio(ChatId, String),
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    failing: AtomicBool,
    max_message_len: Option<usize>,
}

impl RecordingMessenger {
    pub fn with_max_len(max_message_len: usize) -> Self {
        Self {
            max_message_len: Some(max_message_len),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(_, t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn audios(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Audio(_, f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn menus(&self) -> Vec<Vec<&'static str>> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Menu(_, m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&self, s: Sent) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::External("transport down".to_string()));
        }
        self.sent.lock().unwrap().push(s);
        Ok(())
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: self.max_message_len.unwrap_or(4096),
        }
    }

    async fn send_text(&self, chat_id: ChatId, html: &str, _keyboard: &ReplyKeyboard) -> Result<()> {
        self.record(Sent::Text(chat_id, html.to_string()))
    }

    async fn send_audio(&self, chat_id: ChatId, file_ref: &str) -> Result<()> {
        self.record(Sent::Audio(chat_id, file_ref.to_string()))
    }

    async fn register_menu(&self, chat_id: ChatId, commands: &[CommandDescriptor]) -> Result<()> {
        self.record(Sent::Menu(chat_id, commands.iter().map(|c| c.name).collect()))
    }
}
