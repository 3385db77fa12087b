use async_trait::async_trait;
use rusqlite::params;

use psybot_core::{
    domain::{AdminRecord, UserId},
    ports::AdminStore,
    Result,
};

use crate::{store_err, Database};

#[async_trait]
impl AdminStore for Database {
    async fn exists(&self, telegram_id: UserId) -> Result<bool> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE telegram_id = ?1)",
            params![telegram_id.0],
            |row| row.get(0),
        )
        .map_err(store_err)
    }

    async fn save(&self, record: AdminRecord) -> Result<AdminRecord> {
        let conn = self.conn.lock().await;
        // Re-authenticating refreshes the profile fields instead of failing on the unique key.
        let id: i64 = conn
            .query_row(
                "INSERT INTO admins (telegram_id, username, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(telegram_id) DO UPDATE SET
                    username = excluded.username,
                    first_name = excluded.first_name,
                    last_name = excluded.last_name
                 RETURNING id",
                params![
                    record.telegram_id.0,
                    record.username,
                    record.first_name,
                    record.last_name
                ],
                |row| row.get(0),
            )
            .map_err(store_err)?;

        Ok(AdminRecord { id, ..record })
    }

    async fn delete_by_telegram_id(&self, telegram_id: UserId) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM admins WHERE telegram_id = ?1",
            params![telegram_id.0],
        )
        .map_err(store_err)?;
        Ok(())
    }
}
