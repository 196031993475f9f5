//! # Kanban Core
//!
//! Board, column and card model for a local-first kanban board, with the
//! ordering engine that keeps positions dense through every move, reorder
//! and delete.
//!
//! Edits go through [`BoardAggregate`], which owns one board tree and
//! validates input before mutating anything. Persistence sits behind the
//! async [`Storage`] trait, and [`KanbanService`] ties the two together.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::KanbanConfig;
pub use domain::{
    Board, BoardAggregate, BoardDraft, BoardId, Card, CardDraft, CardId, CardPatch, Column,
    ColumnDraft, ColumnId, ColumnPatch, Priority, User, UserDraft, UserId,
};
pub use error::{KanbanError, Result};
pub use service::KanbanService;
pub use storage::Storage;
pub use validation::{Limits, Validator};
