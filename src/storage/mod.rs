use crate::{
    config::{StorageBackend, StorageConfig},
    domain::{Board, BoardId, EntityKind, User},
    error::{KanbanError, Result},
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
#[cfg(feature = "sqlite-storage")]
pub use sqlite_storage::SqliteStorage;

/// Key layout shared by every backend
pub mod keys {
    use crate::domain::BoardId;

    pub const BOARD_PREFIX: &str = "kanban_board_";
    pub const CURRENT_USER: &str = "kanban_user_current";
    pub const RECENT_BOARDS: &str = "kanban-recent-boards";
    pub const PREFERENCE_PREFIX: &str = "kanban_pref_";

    pub fn board(id: &BoardId) -> String {
        format!("{}{}", BOARD_PREFIX, id)
    }

    pub fn preference(name: &str) -> String {
        format!("{}{}", PREFERENCE_PREFIX, name)
    }
}

/// Key-value persistence for boards, the local user and preferences.
///
/// Backends implement the raw string operations; the typed operations are
/// provided on top of them and store JSON. Callers should expect every call
/// to be slow and must not assume it completes synchronously. Nothing here
/// retries on failure.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Prepares the backend (directories, tables)
    async fn initialize(&self) -> Result<()>;

    /// Checks if the backend has been initialized
    async fn is_initialized(&self) -> bool;

    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    async fn set_raw(&self, key: &str, value: String) -> Result<()>;

    /// Removes a key, returning whether it existed
    async fn remove_raw(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, sorted
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Saves the full board tree
    async fn save_board(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;
        self.set_raw(&keys::board(&board.id), json).await
    }

    /// Loads a board, failing with `NotFound` if it was never saved
    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        let raw = self
            .get_raw(&keys::board(id))
            .await?
            .ok_or_else(|| KanbanError::not_found(EntityKind::Board, id.as_str()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let keys = self.keys_with_prefix(keys::BOARD_PREFIX).await?;
        Ok(keys
            .iter()
            .filter_map(|key| key.strip_prefix(keys::BOARD_PREFIX))
            .map(BoardId::from)
            .collect())
    }

    async fn delete_board(&self, id: &BoardId) -> Result<bool> {
        self.remove_raw(&keys::board(id)).await
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.set_raw(keys::CURRENT_USER, json).await
    }

    async fn load_user(&self) -> Result<Option<User>> {
        match self.get_raw(keys::CURRENT_USER).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Most recently opened boards, newest first
    async fn load_recent_boards(&self) -> Result<Vec<BoardId>> {
        match self.get_raw(keys::RECENT_BOARDS).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_recent_boards(&self, ids: &[BoardId]) -> Result<()> {
        let json = serde_json::to_string(ids)?;
        self.set_raw(keys::RECENT_BOARDS, json).await
    }

    async fn save_preference(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(&keys::preference(name), json).await
    }

    async fn load_preference(&self, name: &str) -> Result<Option<serde_json::Value>> {
        match self.get_raw(&keys::preference(name)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn remove_preference(&self, name: &str) -> Result<bool> {
        self.remove_raw(&keys::preference(name)).await
    }
}

/// Builds the backend selected in the configuration
pub fn open(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(
            MemoryStorage::new().with_latency(config.latency()),
        )),
        #[cfg(feature = "file-storage")]
        StorageBackend::File => Ok(Arc::new(FileStorage::new(&config.path))),
        #[cfg(not(feature = "file-storage"))]
        StorageBackend::File => Err(KanbanError::Config(
            "the file backend requires the `file-storage` feature".to_string(),
        )),
        #[cfg(feature = "sqlite-storage")]
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStorage::open(
            config.path.join(SqliteStorage::DATABASE_FILE),
        )?)),
        #[cfg(not(feature = "sqlite-storage"))]
        StorageBackend::Sqlite => Err(KanbanError::Config(
            "the sqlite backend requires the `sqlite-storage` feature".to_string(),
        )),
    }
}
