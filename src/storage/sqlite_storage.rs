use crate::{
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

/// SQLite-based storage keeping every key in a single `kv` table
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    pub const DATABASE_FILE: &'static str = "kanban.db";

    const SCHEMA: &'static str =
        "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)";

    /// Opens (or creates) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.as_ref().display(), "opening sqlite storage");
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private database that lives as long as this value
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection.execute(Self::SCHEMA, [])?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| KanbanError::Persistence("SQLite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        self.connection()?.execute(Self::SCHEMA, [])?;
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        let Ok(conn) = self.connection() else {
            return false;
        };
        conn.query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv'",
            [],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .unwrap_or(false)
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .connection()?
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        self.connection()?.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        debug!(key, "wrote key");
        Ok(())
    }

    async fn remove_raw(&self, key: &str) -> Result<bool> {
        let removed = self
            .connection()?
            .execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.connection()?;
        // instr avoids LIKE treating '_' in the prefix as a wildcard
        let mut stmt = conn.prepare("SELECT key FROM kv WHERE instr(key, ?1) = 1 ORDER BY key")?;
        let keys = stmt
            .query_map([prefix], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, BoardDraft, BoardId, UserId};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(storage.is_initialized().await);

        storage.set_raw("a", "1".to_string()).await.unwrap();
        storage.set_raw("a", "2".to_string()).await.unwrap();
        assert_eq!(storage.get_raw("a").await.unwrap(), Some("2".to_string()));

        assert!(storage.remove_raw("a").await.unwrap());
        assert!(!storage.remove_raw("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_prefix_underscore_is_literal() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage
            .set_raw("kanban_board_b1", "{}".to_string())
            .await
            .unwrap();
        storage
            .set_raw("kanbanXboardXb2", "{}".to_string())
            .await
            .unwrap();

        let keys = storage.keys_with_prefix("kanban_board_").await.unwrap();
        assert_eq!(keys, ["kanban_board_b1"]);
    }

    #[tokio::test]
    async fn test_board_persists_across_connections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SqliteStorage::DATABASE_FILE);
        let board = Board::new(
            BoardId::new("board_1"),
            BoardDraft::new("Board", UserId::new("user_1")),
            chrono::Utc::now(),
        );

        SqliteStorage::open(&path)
            .unwrap()
            .save_board(&board)
            .await
            .unwrap();

        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(reopened.load_board(&board.id).await.unwrap(), board);
        assert_eq!(reopened.list_board_ids().await.unwrap(), [board.id]);
    }
}
