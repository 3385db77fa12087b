//! Read-through authorization cache over the admin store.
//!
//! Each key is filled at most once at a time: concurrent misses for the same user share a
//! single store lookup and all observe its result. `promote`/`demote` write the cached value
//! directly after the store call commits, so an in-flight fill can never re-cache a stale
//! "not admin" after a successful promotion. Mutations of the same user are serialized, so
//! the last store write is also the last cache write.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::{
    domain::{AdminRecord, UserId},
    ports::AdminStore,
    Result,
};

enum Slot {
    Known(bool),
    Loading(Arc<OnceCell<bool>>),
}

pub struct AdminCache {
    store: Arc<dyn AdminStore>,
    slots: Mutex<HashMap<UserId, Slot>>,
    writers: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl AdminCache {
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
            writers: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_writer(&self, id: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.writers.lock().await;
            map.entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Whether `id` is currently an administrator. Never fails; store errors read as `false`
    /// and are not cached.
    pub async fn is_admin(&self, id: UserId) -> bool {
        let cell = {
            let mut slots = self.slots.lock().await;
            match slots.get(&id) {
                Some(Slot::Known(v)) => return *v,
                Some(Slot::Loading(cell)) => cell.clone(),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    slots.insert(id, Slot::Loading(cell.clone()));
                    cell
                }
            }
        };

        *cell.get_or_init(|| self.fill(id, &cell)).await
    }

    async fn fill(&self, id: UserId, cell: &Arc<OnceCell<bool>>) -> bool {
        let loaded = self.store.exists(id).await;

        let mut slots = self.slots.lock().await;
        let ours = matches!(slots.get(&id), Some(Slot::Loading(c)) if Arc::ptr_eq(c, cell));

        if !ours {
            // Overwritten while the lookup was in flight: a direct write wins.
            if let Some(Slot::Known(v)) = slots.get(&id) {
                return *v;
            }
            // Reset mid-flight; answer without caching.
            return loaded.unwrap_or(false);
        }

        match loaded {
            Ok(v) => {
                debug!(user_id = id.0, is_admin = v, "admin cache filled");
                slots.insert(id, Slot::Known(v));
                v
            }
            Err(e) => {
                warn!(user_id = id.0, "admin lookup failed: {e}");
                slots.remove(&id);
                false
            }
        }
    }

    /// Persist `record` as an administrator, then mark it admin in the cache.
    pub async fn promote(&self, record: AdminRecord) -> Result<AdminRecord> {
        let _writer = self.lock_writer(record.telegram_id).await;
        let saved = self.store.save(record).await?;
        self.slots
            .lock()
            .await
            .insert(saved.telegram_id, Slot::Known(true));
        Ok(saved)
    }

    /// Remove the durable admin record, then mark the user non-admin in the cache.
    pub async fn demote(&self, id: UserId) -> Result<()> {
        let _writer = self.lock_writer(id).await;
        self.store.delete_by_telegram_id(id).await?;
        self.slots.lock().await.insert(id, Slot::Known(false));
        Ok(())
    }

    /// Drop every cached entry; the next query per user re-reads the store.
    pub async fn reset(&self) {
        self.slots.lock().await.clear();
    }

    /// Settled cached value for `id`, if any.
    pub async fn cached(&self, id: UserId) -> Option<bool> {
        match self.slots.lock().await.get(&id) {
            Some(Slot::Known(v)) => Some(*v),
            _ => None,
        }
    }
}
