use std::sync::Arc;

use tracing::info;

use psybot_core::{admin::AdminCache, config::Config, dispatch::Dispatcher, logging};
use psybot_sqlite::Database;

#[tokio::main]
async fn main() -> Result<(), psybot_core::Error> {
    logging::init("psybot")?;

    let cfg = Arc::new(Config::load()?);
    info!(
        token = %logging::mask_secret(&cfg.telegram_bot_token),
        database = %cfg.database_path.display(),
        "configuration loaded"
    );

    let db = Arc::new(Database::open(&cfg.database_path)?);

    let admins = Arc::new(AdminCache::new(db.clone()));
    let dispatcher = Arc::new(Dispatcher::new(
        admins,
        db.clone(),
        db,
        cfg.admin_password.clone(),
    ));

    psybot_telegram::router::run_polling(cfg, dispatcher)
        .await
        .map_err(|e| psybot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
