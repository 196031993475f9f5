//! Application entry points tying boards to a persistence adapter.
//!
//! Board edits happen on a [`BoardAggregate`] in memory; the service only
//! loads and saves whole trees. A failed save leaves the caller's aggregate
//! untouched, so the caller decides whether to retry or discard.

use crate::{
    config::{BoardDefaults, KanbanConfig},
    domain::{
        Board, BoardAggregate, BoardDraft, BoardId, EntityKind, IdGenerator, User, UserDraft,
        UserId, UserPreferences, UuidGenerator,
    },
    error::{KanbanError, Result},
    storage::{self, Storage},
    validation::Validator,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct KanbanService {
    storage: Arc<dyn Storage>,
    ids: Arc<dyn IdGenerator>,
    validator: Validator,
    defaults: BoardDefaults,
}

impl KanbanService {
    pub fn new(storage: Arc<dyn Storage>, ids: Arc<dyn IdGenerator>, config: &KanbanConfig) -> Self {
        Self {
            storage,
            ids,
            validator: Validator::new(config.limits.clone()),
            defaults: config.board.clone(),
        }
    }

    /// Opens and initializes the configured backend with random ids
    pub async fn from_config(config: &KanbanConfig) -> Result<Self> {
        let storage = storage::open(&config.storage)?;
        storage.initialize().await?;
        debug!(backend = ?config.storage.backend, "storage initialized");
        Ok(Self::new(storage, Arc::new(UuidGenerator), config))
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Creates and saves a board.
    ///
    /// A draft without column titles gets the configured default columns.
    pub async fn create_board(&self, mut draft: BoardDraft) -> Result<BoardAggregate> {
        if draft.columns.is_none() {
            draft.columns = Some(self.defaults.default_columns.clone());
        }

        let aggregate = BoardAggregate::create(draft, self.ids.clone(), self.validator.clone())?;
        self.storage.save_board(aggregate.board()).await?;

        info!(
            board_id = %aggregate.id(),
            columns = aggregate.board().columns.len(),
            "board created"
        );
        Ok(aggregate)
    }

    /// Loads a board and moves it to the front of the recent list
    pub async fn open_board(&self, id: &BoardId) -> Result<BoardAggregate> {
        let board = self.storage.load_board(id).await?;
        debug!(board_id = %id, "board loaded");

        if let Err(error) = self.remember_recent(id).await {
            warn!(board_id = %id, %error, "failed to update recent boards");
        }

        Ok(self.wrap(board))
    }

    /// Wraps a board tree obtained elsewhere with this service's generator
    /// and validator
    pub fn wrap(&self, board: Board) -> BoardAggregate {
        BoardAggregate::new(board, self.ids.clone(), self.validator.clone())
    }

    pub async fn save_board(&self, aggregate: &BoardAggregate) -> Result<()> {
        self.storage.save_board(aggregate.board()).await?;
        debug!(board_id = %aggregate.id(), "board saved");
        Ok(())
    }

    /// Every stored board; entries that no longer decode are skipped
    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        let mut boards = Vec::new();
        for id in self.storage.list_board_ids().await? {
            match self.storage.load_board(&id).await {
                Ok(board) => boards.push(board),
                Err(KanbanError::Serialization(error)) => {
                    warn!(board_id = %id, %error, "skipping unreadable board");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(boards)
    }

    /// Deletes a board, returning whether it existed
    pub async fn delete_board(&self, id: &BoardId) -> Result<bool> {
        let existed = self.storage.delete_board(id).await?;
        if existed {
            info!(board_id = %id, "board deleted");
        }

        if let Err(error) = self.forget_recent(id).await {
            warn!(board_id = %id, %error, "failed to update recent boards");
        }
        Ok(existed)
    }

    pub async fn recent_boards(&self) -> Result<Vec<BoardId>> {
        self.storage.load_recent_boards().await
    }

    async fn remember_recent(&self, id: &BoardId) -> Result<()> {
        let mut recent = self.storage.load_recent_boards().await?;
        recent.retain(|existing| existing != id);
        recent.insert(0, id.clone());
        recent.truncate(self.defaults.recent_boards_max);
        self.storage.save_recent_boards(&recent).await
    }

    async fn forget_recent(&self, id: &BoardId) -> Result<()> {
        let mut recent = self.storage.load_recent_boards().await?;
        let before = recent.len();
        recent.retain(|existing| existing != id);
        if recent.len() != before {
            self.storage.save_recent_boards(&recent).await?;
        }
        Ok(())
    }

    /// Creates the local user, replacing any previous one
    pub async fn create_user(&self, draft: UserDraft) -> Result<User> {
        self.validator.validate_user(&draft).into_result()?;

        let id = UserId::new(self.ids.next_id(EntityKind::User));
        let user = User::new(id, draft, self.ids.now());
        self.storage.save_user(&user).await?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.storage.load_user().await
    }

    pub async fn update_preferences(&self, preferences: UserPreferences) -> Result<User> {
        let mut user = self
            .storage
            .load_user()
            .await?
            .ok_or_else(|| KanbanError::not_found(EntityKind::User, "current"))?;

        user.set_preferences(preferences, self.ids.now());
        self.storage.save_user(&user).await?;
        Ok(user)
    }

    pub async fn save_preference<T: Serialize + Sync>(&self, name: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.storage.save_preference(name, &value).await
    }

    /// Reads a preference, falling back to `default` when it is missing or
    /// stored in a shape `T` cannot read
    pub async fn preference<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T> {
        let Some(value) = self.storage.load_preference(name).await? else {
            return Ok(default);
        };

        match serde_json::from_value(value) {
            Ok(parsed) => Ok(parsed),
            Err(error) => {
                warn!(preference = name, %error, "ignoring unreadable preference");
                Ok(default)
            }
        }
    }
}
