use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use uuid::Uuid;

/// Kind of entity an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Board,
    Column,
    Card,
    User,
}

impl EntityKind {
    /// Prefix used for generated identifiers of this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "col",
            Self::Card => "card",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => write!(f, "Board"),
            Self::Column => write!(f, "Column"),
            Self::Card => write!(f, "Card"),
            Self::User => write!(f, "User"),
        }
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a board
    BoardId
);
entity_id!(
    /// Identifier of a column, unique across boards
    ColumnId
);
entity_id!(
    /// Identifier of a card, unique across columns
    CardId
);
entity_id!(
    /// Identifier of a user
    UserId
);

/// Source of fresh identifiers and timestamps for newly created entities.
///
/// Injected into the board aggregate and the service so tests can swap in a
/// deterministic implementation.
pub trait IdGenerator: Send + Sync {
    /// Returns an identifier that has never been handed out before
    fn next_id(&self, kind: EntityKind) -> String;

    /// Current timestamp used for `created_at` / `updated_at`
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random identifiers of the form `card_4f1c...`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self, kind: EntityKind) -> String {
        format!("{}_{}", kind.prefix(), Uuid::new_v4().simple())
    }
}

/// Counter-based identifiers of the form `card_1`, `card_2`, ...
///
/// A single counter is shared by every entity kind.
#[derive(Debug)]
pub struct SequentialGenerator {
    next: AtomicU64,
}

impl SequentialGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialGenerator {
    fn next_id(&self, kind: EntityKind) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", kind.prefix(), n)
    }
}
