//! SQLite adapters for the psybot-core store ports.

mod admins;
mod affirmations;
mod tracks;

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

use psybot_core::{errors::Error, Result};

/// Thread-safe SQLite database implementing every store port.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::Store(format!("failed to open database {}: {e}", path.display()))
        })?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(store_err)?;

        // Run migrations on the raw connection before wrapping in Mutex.
        Self::run_migrations(&conn)?;

        info!("Database initialized at: {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_id INTEGER NOT NULL UNIQUE,
                username TEXT,
                first_name TEXT NOT NULL,
                last_name TEXT
            );

            CREATE TABLE IF NOT EXISTS affirmations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                author_username TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_affirmations_created
                ON affirmations(created_at, id);

            CREATE TABLE IF NOT EXISTS music_tracks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_id TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                author_username TEXT,
                artist TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )
        .map_err(store_err)?;
        Ok(())
    }
}

pub(crate) fn store_err(e: rusqlite::Error) -> Error {
    Error::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        Database::run_migrations(&conn).unwrap();
        Database::run_migrations(&conn).unwrap();
    }

    #[test]
    fn opens_file_database() {
        let path = std::env::temp_dir().join(format!("psybot-db-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        Database::open(&path).unwrap();
        Database::open(&path).unwrap();

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = std::env::temp_dir().join(format!("psybot-nested-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        Database::open(&dir.join("data").join("bot.db")).unwrap();
        assert!(dir.join("data").is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
