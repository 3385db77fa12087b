use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    commands::CommandDescriptor,
    domain::ChatId,
    messaging::{
        port::MessagingPort,
        types::{MessagingCapabilities, ReplyKeyboard},
    },
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between *any* Telegram API calls (global flood control).
    pub global_min_interval: Duration,
    /// Minimum spacing between calls per chat (Telegram 1 msg/sec style limits).
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    /// Telegram's documented limits: about 30 calls/sec overall, 1 message/sec per chat.
    fn default() -> Self {
        Self {
            global_min_interval: Duration::from_millis(40),
            per_chat_min_interval: Duration::from_millis(1050),
        }
    }
}

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before executing.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = if now >= self.next { now } else { self.next };
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that spaces outbound calls.
///
/// Calls are delayed, never retried or dropped. Only chat messages pay the per-chat
/// interval; menu registration is not a chat message and is spaced globally.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<i64, Arc<Mutex<IntervalLimiter>>>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    async fn limiter_for_chat(&self, chat_id: i64) -> Arc<Mutex<IntervalLimiter>> {
        let mut map = self.per_chat.lock().await;
        map.entry(chat_id)
            .or_insert_with(|| {
                Arc::new(Mutex::new(IntervalLimiter::new(
                    self.cfg.per_chat_min_interval,
                )))
            })
            .clone()
    }

    async fn throttle_global(&self) {
        let wait = { self.global.lock().await.reserve() };
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }

    async fn throttle_chat(&self, chat_id: ChatId) {
        let global_wait = { self.global.lock().await.reserve() };
        let chat_wait = {
            let lim = self.limiter_for_chat(chat_id.0).await;
            let mut guard = lim.lock().await;
            guard.reserve()
        };

        let wait = global_wait.max(chat_wait);
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        self.inner.capabilities()
    }

    async fn send_text(&self, chat_id: ChatId, html: &str, keyboard: &ReplyKeyboard) -> Result<()> {
        self.throttle_chat(chat_id).await;
        self.inner.send_text(chat_id, html, keyboard).await
    }

    async fn send_audio(&self, chat_id: ChatId, file_ref: &str) -> Result<()> {
        self.throttle_chat(chat_id).await;
        self.inner.send_audio(chat_id, file_ref).await
    }

    async fn register_menu(&self, chat_id: ChatId, commands: &[CommandDescriptor]) -> Result<()> {
        self.throttle_global().await;
        self.inner.register_menu(chat_id, commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin::AdminCache,
        commands::default_commands,
        dispatch::Dispatcher,
        messaging::types::{EventMeta, InboundEvent},
        test_support::{
            sender, MemAdminStore, MemAffirmationStore, MemTrackStore, RecordingMessenger,
        },
    };

    #[tokio::test(start_paused = true)]
    async fn spaces_calls_for_the_same_chat() {
        let inner = Arc::new(RecordingMessenger::default());
        let throttled = ThrottledMessenger::new(
            inner.clone(),
            ThrottleConfig {
                global_min_interval: Duration::from_millis(10),
                per_chat_min_interval: Duration::from_millis(500),
            },
        );
        let kb = ReplyKeyboard::one_per_row(&["a"]);

        let start = Instant::now();
        throttled.send_text(ChatId(1), "one", &kb).await.unwrap();
        throttled.send_text(ChatId(1), "two", &kb).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(inner.texts(), vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_chats_only_pay_the_global_interval() {
        let inner = Arc::new(RecordingMessenger::default());
        let throttled = ThrottledMessenger::new(
            inner.clone(),
            ThrottleConfig {
                global_min_interval: Duration::from_millis(10),
                per_chat_min_interval: Duration::from_millis(500),
            },
        );

        let start = Instant::now();
        throttled.send_audio(ChatId(1), "f1").await.unwrap();
        throttled.send_audio(ChatId(2), "f2").await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(inner.audios().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn menu_registration_does_not_delay_the_reply() {
        let inner = Arc::new(RecordingMessenger::default());
        let throttled = ThrottledMessenger::new(inner.clone(), ThrottleConfig::default());
        let kb = ReplyKeyboard::one_per_row(&["a"]);

        let start = Instant::now();
        throttled
            .register_menu(ChatId(1), default_commands())
            .await
            .unwrap();
        throttled.send_text(ChatId(1), "hi", &kb).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed < ThrottleConfig::default().per_chat_min_interval);
        assert!(elapsed >= ThrottleConfig::default().global_min_interval);
        assert_eq!(inner.menus().len(), 1);
        assert_eq!(inner.texts(), vec!["hi".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_command_is_answered_without_the_per_chat_wait() {
        let admins = Arc::new(MemAdminStore::default());
        let dispatcher = Dispatcher::new(
            Arc::new(AdminCache::new(admins)),
            Arc::new(MemAffirmationStore::default()),
            Arc::new(MemTrackStore::default()),
            "pw".to_string(),
        );
        let inner = Arc::new(RecordingMessenger::default());
        let throttled = ThrottledMessenger::new(inner.clone(), ThrottleConfig::default());
        let meta = EventMeta {
            chat_id: ChatId(10),
            sender: sender(1),
        };

        let start = Instant::now();
        dispatcher
            .handle(&throttled, InboundEvent::classify(meta, Some("/start"), None))
            .await;

        assert!(start.elapsed() < ThrottleConfig::default().per_chat_min_interval);
        assert_eq!(inner.menus().len(), 1);
        assert_eq!(inner.texts().len(), 1);
    }
}
