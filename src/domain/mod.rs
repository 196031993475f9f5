pub mod aggregate;
pub mod board;
pub mod card;
pub mod column;
pub mod drag;
pub mod ids;
pub mod ordering;
pub mod sorting;
pub mod user;

pub use aggregate::BoardAggregate;
pub use board::{
    Board, BoardDraft, BoardMember, BoardRole, BoardSettings, CardTemplate, Theme, WorkflowRule,
};
pub use card::{Attachment, Card, CardDraft, CardPatch, Comment, DueStatus, Priority};
pub use column::{Column, ColumnDraft, ColumnPatch};
pub use drag::{DragItem, DragState, DropTarget};
pub use ids::{
    BoardId, CardId, ColumnId, EntityKind, IdGenerator, SequentialGenerator, UserId, UuidGenerator,
};
pub use ordering::{Positioned, Reparent};
pub use sorting::{sort_cards, SortField, SortOrder};
pub use user::{BoardView, NotificationSettings, User, UserDraft, UserPreferences, UserRole};
