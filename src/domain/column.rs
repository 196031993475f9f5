use crate::domain::{
    card::Card,
    ids::{BoardId, CardId, ColumnId},
    ordering::{index_of, Positioned},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for creating a column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_cards: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ColumnDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_cards(mut self, max_cards: u32) -> Self {
        self.max_cards = Some(max_cards);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl From<&Column> for ColumnDraft {
    fn from(column: &Column) -> Self {
        Self {
            title: column.title.clone(),
            description: column.description.clone(),
            max_cards: column.max_cards,
            color: column.color.clone(),
        }
    }
}

/// Partial update of a column's own fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub max_cards: Option<Option<u32>>,
    pub color: Option<Option<String>>,
    pub is_archived: Option<bool>,
}

impl ColumnPatch {
    pub fn merge_into(&self, draft: &mut ColumnDraft) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(max_cards) = self.max_cards {
            draft.max_cards = max_cards;
        }
        if let Some(color) = &self.color {
            draft.color = color.clone();
        }
    }
}

/// A column of cards on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub position: usize,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cards: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(
        id: ColumnId,
        board_id: BoardId,
        draft: ColumnDraft,
        position: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            board_id,
            title: draft.title,
            description: draft.description,
            position,
            cards: Vec::new(),
            max_cards: draft.max_cards,
            color: draft.color,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields with the draft's values
    pub fn apply(&mut self, draft: ColumnDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.max_cards = draft.max_cards;
        self.color = draft.color;
        self.updated_at = now;
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }

    pub fn card_index(&self, id: &CardId) -> Option<usize> {
        index_of(&self.cards, id.as_str())
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|card| card.id.clone()).collect()
    }

    /// Whether the column has reached its own card limit
    pub fn is_full(&self) -> bool {
        self.max_cards
            .map(|max| self.cards.len() >= max as usize)
            .unwrap_or(false)
    }
}

impl Positioned for Column {
    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}
