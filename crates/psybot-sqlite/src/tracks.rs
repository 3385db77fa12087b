use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use psybot_core::{
    domain::{MusicTrack, NewTrack, UserId},
    ports::TrackStore,
    Result,
};

use crate::{store_err, Database};

const COLUMNS: &str = "id, file_id, author_id, author_username, artist, title, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<MusicTrack> {
    Ok(MusicTrack {
        id: row.get(0)?,
        file_id: row.get(1)?,
        author_id: UserId(row.get(2)?),
        author_username: row.get(3)?,
        artist: row.get(4)?,
        title: row.get(5)?,
        created_at: row.get::<_, DateTime<Utc>>(6)?,
    })
}

#[async_trait]
impl TrackStore for Database {
    async fn add(&self, track: NewTrack) -> Result<MusicTrack> {
        let created_at = Utc::now();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO music_tracks (file_id, author_id, author_username, artist, title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                track.file_id,
                track.author_id.0,
                track.author_username,
                track.artist,
                track.title,
                created_at
            ],
        )
        .map_err(store_err)?;

        Ok(MusicTrack {
            id: conn.last_insert_rowid(),
            file_id: track.file_id,
            author_id: track.author_id,
            author_username: track.author_username,
            artist: track.artist,
            title: track.title,
            created_at,
        })
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM music_tracks WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )
        .map_err(store_err)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM music_tracks WHERE id = ?1", params![id])
            .map_err(store_err)?;
        Ok(())
    }

    async fn random(&self) -> Result<Option<MusicTrack>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM music_tracks ORDER BY RANDOM() LIMIT 1"
            ))
            .map_err(store_err)?;
        let mut rows = stmt.query_map([], from_row).map_err(store_err)?;
        rows.next().transpose().map_err(store_err)
    }

    async fn list_all(&self) -> Result<Vec<MusicTrack>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM music_tracks ORDER BY id"))
            .map_err(store_err)?;
        let rows = stmt.query_map([], from_row).map_err(store_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)
    }
}
