use crate::domain::{
    card::{Card, Priority},
    column::Column,
    ids::{BoardId, CardId, ColumnId, UserId},
    ordering::{index_of, is_dense},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Colour scheme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// Defaults applied to cards created from the board's template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub default_priority: Priority,
    #[serde(default)]
    pub default_tags: Vec<String>,
    #[serde(default)]
    pub required_fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    Priority,
    Assignee,
    DueDate,
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCondition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowActionKind {
    MoveCard,
    ChangePriority,
    AssignUser,
    AddTag,
    SendNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAction {
    #[serde(rename = "type")]
    pub kind: WorkflowActionKind,
    pub value: serde_json::Value,
}

/// Automation rule stored with the board. Carried as data only; nothing in
/// this crate evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRule {
    pub id: String,
    pub name: String,
    pub condition: WorkflowCondition,
    pub action: WorkflowAction,
    pub is_active: bool,
}

/// Per-board settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSettings {
    #[serde(default)]
    pub theme: Theme,
    pub allow_comments: bool,
    pub allow_attachments: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cards_per_column: Option<u32>,
    #[serde(default)]
    pub auto_archive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_template: Option<CardTemplate>,
    #[serde(default)]
    pub workflow_rules: Vec<WorkflowRule>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            allow_comments: true,
            allow_attachments: true,
            max_cards_per_column: None,
            auto_archive: false,
            card_template: None,
            workflow_rules: Vec::new(),
        }
    }
}

/// Role of a member on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl BoardRole {
    /// Whether the role may change the board's structure
    pub fn can_edit(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Member)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMember {
    pub user_id: UserId,
    pub role: BoardRole,
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDraft {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub is_public: bool,
    pub settings: BoardSettings,
    /// Titles of the columns to seed; `None` means the configured defaults
    pub columns: Option<Vec<String>>,
}

impl BoardDraft {
    pub fn new(title: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            title: title.into(),
            description: None,
            owner_id,
            is_public: false,
            settings: BoardSettings::default(),
            columns: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn with_columns<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(titles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_settings(mut self, settings: BoardSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A kanban board and everything on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_id: UserId,
    pub is_public: bool,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub members: Vec<BoardMember>,
    #[serde(default)]
    pub settings: BoardSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates an empty board owned by the draft's owner.
    ///
    /// Seed columns in `draft.columns` are not created here; the aggregate
    /// adds them so they get identifiers from the injected generator.
    pub fn new(id: BoardId, draft: BoardDraft, now: DateTime<Utc>) -> Self {
        let owner = BoardMember {
            user_id: draft.owner_id.clone(),
            role: BoardRole::Owner,
            joined_at: now,
        };

        Self {
            id,
            title: draft.title,
            description: draft.description,
            owner_id: draft.owner_id,
            is_public: draft.is_public,
            columns: Vec::new(),
            members: vec![owner],
            settings: draft.settings,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| &column.id == id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        index_of(&self.columns, id.as_str())
    }

    pub fn column_by_position(&self, position: usize) -> Option<&Column> {
        self.columns.iter().find(|column| column.position == position)
    }

    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|column| column.id.clone()).collect()
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.find_card(id).map(|(_, card)| card)
    }

    /// The card and the column currently holding it
    pub fn find_card(&self, id: &CardId) -> Option<(&Column, &Card)> {
        self.columns
            .iter()
            .find_map(|column| column.card(id).map(|card| (column, card)))
    }

    pub fn total_cards(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }

    pub fn member(&self, user_id: &UserId) -> Option<&BoardMember> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn role_of(&self, user_id: &UserId) -> Option<BoardRole> {
        self.member(user_id).map(|m| m.role)
    }

    /// Owners, admins and members may edit; viewers and outsiders may not
    pub fn can_edit(&self, user_id: &UserId) -> bool {
        self.role_of(user_id)
            .map(|role| role.can_edit())
            .unwrap_or(false)
    }

    /// Public boards are visible to anyone, private ones to members only
    pub fn can_view(&self, user_id: &UserId) -> bool {
        self.is_public || self.member(user_id).is_some()
    }

    /// Checks the structural invariants of the tree: dense positions at both
    /// levels, correct back-references, and no identifier held twice.
    pub fn is_consistent(&self) -> bool {
        if !is_dense(&self.columns) {
            return false;
        }

        let mut seen_columns = HashSet::new();
        let mut seen_cards = HashSet::new();
        self.columns.iter().all(|column| {
            column.board_id == self.id
                && seen_columns.insert(&column.id)
                && is_dense(&column.cards)
                && column
                    .cards
                    .iter()
                    .all(|card| card.column_id == column.id && seen_cards.insert(&card.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::column::ColumnDraft;

    fn board() -> Board {
        let now = Utc::now();
        let mut board = Board::new(
            BoardId::new("board_1"),
            BoardDraft::new("My Kanban Board", UserId::new("user_1")),
            now,
        );
        for (position, title) in ["To Do", "In Progress", "Done"].iter().enumerate() {
            let id = ColumnId::new(format!("col_{}", position + 1));
            let mut column = Column::new(
                id.clone(),
                board.id.clone(),
                ColumnDraft::new(*title),
                position,
                now,
            );
            column.cards.push(Card::new(
                CardId::new(format!("card_{}", position + 1)),
                id,
                format!("Task {}", position + 1),
                0,
                now,
            ));
            board.columns.push(column);
        }
        board
    }

    #[test]
    fn test_board_creation_adds_owner_member() {
        let board = board();
        assert_eq!(board.members.len(), 1);
        assert_eq!(board.role_of(&UserId::new("user_1")), Some(BoardRole::Owner));
        assert!(!board.is_public);
        assert_eq!(board.settings, BoardSettings::default());
    }

    #[test]
    fn test_lookups() {
        let board = board();
        assert_eq!(board.total_cards(), 3);
        assert_eq!(board.column_index(&ColumnId::new("col_2")), Some(1));
        assert_eq!(board.column_by_position(2).unwrap().title, "Done");
        assert!(board.column_by_position(3).is_none());

        let (column, card) = board.find_card(&CardId::new("card_2")).unwrap();
        assert_eq!(column.title, "In Progress");
        assert_eq!(card.title, "Task 2");
        assert!(board.card(&CardId::new("card_9")).is_none());
    }

    #[test]
    fn test_permissions() {
        let mut board = board();
        let now = Utc::now();
        board.members.push(BoardMember {
            user_id: UserId::new("user_2"),
            role: BoardRole::Viewer,
            joined_at: now,
        });
        board.members.push(BoardMember {
            user_id: UserId::new("user_3"),
            role: BoardRole::Member,
            joined_at: now,
        });

        assert!(board.can_edit(&UserId::new("user_1")));
        assert!(!board.can_edit(&UserId::new("user_2")));
        assert!(board.can_edit(&UserId::new("user_3")));
        assert!(!board.can_edit(&UserId::new("stranger")));

        assert!(board.can_view(&UserId::new("user_2")));
        assert!(!board.can_view(&UserId::new("stranger")));
        board.is_public = true;
        assert!(board.can_view(&UserId::new("stranger")));
    }

    #[test]
    fn test_consistency_check() {
        let mut board = board();
        assert!(board.is_consistent());

        board.columns[1].cards[0].column_id = ColumnId::new("col_1");
        assert!(!board.is_consistent());

        let mut board = self::board();
        board.columns[2].position = 5;
        assert!(!board.is_consistent());

        let mut board = self::board();
        let duplicate = board.columns[0].cards[0].clone();
        let mut moved = duplicate;
        moved.column_id = board.columns[1].id.clone();
        moved.position = 1;
        board.columns[1].cards.push(moved);
        assert!(!board.is_consistent());
    }

    #[test]
    fn test_board_json_round_trip() {
        let board = board();
        let json = serde_json::to_string_pretty(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
        assert!(json.contains("\"role\": \"owner\""));
    }

    #[test]
    fn test_workflow_rule_deserialization() {
        let json = r#"{
            "id": "rule_1",
            "name": "Escalate overdue",
            "condition": { "field": "due_date", "operator": "less_than", "value": "2024-01-01T00:00:00Z" },
            "action": { "type": "change_priority", "value": "urgent" },
            "is_active": true
        }"#;

        let rule: WorkflowRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.condition.field, ConditionField::DueDate);
        assert_eq!(rule.action.kind, WorkflowActionKind::ChangePriority);
        assert!(rule.is_active);
    }
}
