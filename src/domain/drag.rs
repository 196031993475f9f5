use crate::{
    domain::{
        aggregate::BoardAggregate,
        ids::{CardId, ColumnId},
    },
    error::{KanbanError, Result},
};
use serde::{Deserialize, Serialize};

/// What the user picked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DragItem {
    Card {
        id: CardId,
        source_column_id: ColumnId,
        source_index: usize,
    },
    Column {
        id: ColumnId,
        source_index: usize,
    },
}

/// Where the user let go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DropTarget {
    Card {
        target_column_id: ColumnId,
        target_index: isize,
    },
    Column {
        target_index: isize,
    },
}

/// Tracks a single in-flight drag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    item: Option<DragItem>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_drag(&mut self, item: DragItem) {
        self.item = Some(item);
    }

    pub fn end_drag(&mut self) {
        self.item = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.item.is_some()
    }

    pub fn item(&self) -> Option<&DragItem> {
        self.item.as_ref()
    }

    /// Applies the drop to the board and ends the drag, whatever the outcome.
    ///
    /// A card may only be dropped on a card target and a column on a column
    /// target.
    pub fn handle_drop(&mut self, board: &mut BoardAggregate, target: DropTarget) -> Result<()> {
        let Some(item) = self.item.take() else {
            return Err(KanbanError::Validation(vec![
                "Nothing is being dragged".to_string(),
            ]));
        };

        match (item, target) {
            (
                DragItem::Card {
                    id,
                    source_column_id,
                    ..
                },
                DropTarget::Card {
                    target_column_id,
                    target_index,
                },
            ) => board.move_card(&id, &source_column_id, &target_column_id, target_index),
            (DragItem::Column { id, .. }, DropTarget::Column { target_index }) => {
                board.move_column(&id, target_index)
            }
            _ => Err(KanbanError::Validation(vec![
                "Drop target does not match the dragged item".to_string(),
            ])),
        }
    }
}
