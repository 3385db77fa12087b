use std::sync::Arc;

use teloxide::{dispatching::Dispatcher as UpdateDispatcher, dptree, prelude::*};
use tracing::{info, warn};

use psybot_core::{
    commands::default_commands,
    config::Config,
    dispatch::Dispatcher,
    messaging::{
        port::MessagingPort,
        throttled::ThrottledMessenger,
    },
};

use crate::{handlers, to_bot_commands, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// This bot's username from `getMe`, used to drop `/cmd@otherbot`.
    pub bot_username: Option<String>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!(username = %me.username(), "psybot started");
            Some(me.username().to_string())
        }
        Err(e) => {
            warn!(error = %e, "getMe failed; continuing with polling");
            None
        }
    };
    info!(database = %cfg.database_path.display(), "storage ready");

    // Global menu for chats that have not sent anything yet; per-chat menus override it.
    if let Err(e) = bot
        .set_my_commands(to_bot_commands(default_commands()))
        .await
    {
        warn!(error = %e, "failed to register default command menu");
    }

    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(
        bot.clone(),
        cfg.telegram_safe_limit,
    ));
    let messenger: Arc<dyn MessagingPort> = if cfg.throttle_enabled {
        Arc::new(ThrottledMessenger::new(raw_messenger, cfg.throttle))
    } else {
        raw_messenger
    };

    let state = Arc::new(AppState {
        dispatcher,
        bot_username,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    UpdateDispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_| async {})
        .build()
        .dispatch()
        .await;

    info!("polling stopped");
    Ok(())
}
