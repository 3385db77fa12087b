use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use psybot_core::{
    domain::{Affirmation, UserId},
    ports::AffirmationStore,
    Result,
};

use crate::{store_err, Database};

const COLUMNS: &str = "id, text, author_id, author_username, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Affirmation> {
    Ok(Affirmation {
        id: row.get(0)?,
        text: row.get(1)?,
        author_id: UserId(row.get(2)?),
        author_username: row.get(3)?,
        created_at: row.get::<_, DateTime<Utc>>(4)?,
    })
}

#[async_trait]
impl AffirmationStore for Database {
    async fn add(
        &self,
        text: &str,
        author_id: UserId,
        author_username: Option<&str>,
    ) -> Result<Affirmation> {
        let created_at = Utc::now();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO affirmations (text, author_id, author_username, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![text, author_id.0, author_username, created_at],
        )
        .map_err(store_err)?;

        Ok(Affirmation {
            id: conn.last_insert_rowid(),
            text: text.to_string(),
            author_id,
            author_username: author_username.map(str::to_string),
            created_at,
        })
    }

    async fn list_ordered_by_creation(&self) -> Result<Vec<Affirmation>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM affirmations ORDER BY created_at, id"
            ))
            .map_err(store_err)?;
        let rows = stmt.query_map([], from_row).map_err(store_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)
    }

    async fn random(&self) -> Result<Option<Affirmation>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM affirmations ORDER BY RANDOM() LIMIT 1"
            ))
            .map_err(store_err)?;
        let mut rows = stmt.query_map([], from_row).map_err(store_err)?;
        rows.next().transpose().map_err(store_err)
    }

    async fn delete_all(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let n = conn
            .execute("DELETE FROM affirmations", [])
            .map_err(store_err)?;
        Ok(n as u64)
    }
}
