use crate::domain::ids::EntityKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("User {user_id} is not allowed to {action}")]
    PermissionDenied { user_id: String, action: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "sqlite-storage")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KanbanError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the error came from the persistence adapter rather than the
    /// in-memory board.
    pub fn is_persistence(&self) -> bool {
        match self {
            Self::Persistence(_) | Self::Io(_) | Self::Serialization(_) => true,
            #[cfg(feature = "sqlite-storage")]
            Self::Sqlite(_) => true,
            _ => false,
        }
    }

    /// Violated rules for a validation failure, empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<figment::Error> for KanbanError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}
