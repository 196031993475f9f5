use crate::{
    domain::{
        ids::{CardId, ColumnId, UserId},
        ordering::{Positioned, Reparent},
    },
    error::{KanbanError, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Priority of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Ordering weight, low = 0 through urgent = 3
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Urgent => write!(f, "Urgent"),
        }
    }
}

impl FromStr for Priority {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| KanbanError::Validation(vec!["Invalid priority level".to_string()]))
    }
}

/// File attached to a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uploaded_by: UserId,
    pub uploaded_at: DateTime<Utc>,
}

/// Comment left on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How close a card's due date is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    Today,
    Tomorrow,
    /// Due within the coming week
    InDays(i64),
    Later,
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => write!(f, "Overdue"),
            Self::Today => write!(f, "Today"),
            Self::Tomorrow => write!(f, "Tomorrow"),
            Self::InDays(days) => write!(f, "In {} days", days),
            Self::Later => write!(f, "Later"),
        }
    }
}

/// Unvalidated input for creating or updating a card.
///
/// `priority` is kept as raw text so that an unknown value is reported as a
/// validation failure alongside the other rule violations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_estimate: Option<u32>,
}

impl CardDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default().as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority.as_str().to_string();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee_id = Some(assignee);
        self
    }
}

impl From<&Card> for CardDraft {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone(),
            priority: card.priority.as_str().to_string(),
            tags: card.tags.clone(),
            assignee_id: card.assignee_id.clone(),
            due_date: card.due_date,
            time_estimate: card.time_estimate,
        }
    }
}

/// Partial update of a card. `None` leaves a field unchanged; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
    pub assignee_id: Option<Option<UserId>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub time_estimate: Option<Option<u32>>,
    pub time_spent: Option<Option<u32>>,
}

impl CardPatch {
    /// Overlays the patch on a draft of the current card
    pub fn merge_into(&self, draft: &mut CardDraft) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(priority) = &self.priority {
            draft.priority = priority.clone();
        }
        if let Some(tags) = &self.tags {
            draft.tags = tags.clone();
        }
        if let Some(assignee) = &self.assignee_id {
            draft.assignee_id = assignee.clone();
        }
        if let Some(due) = self.due_date {
            draft.due_date = due;
        }
        if let Some(estimate) = self.time_estimate {
            draft.time_estimate = estimate;
        }
    }
}

/// A kanban card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a card with medium priority and nothing else filled in
    pub fn new(
        id: CardId,
        column_id: ColumnId,
        title: impl Into<String>,
        position: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            column_id,
            title: title.into(),
            description: None,
            priority: Priority::default(),
            tags: Vec::new(),
            position,
            assignee_id: None,
            due_date: None,
            attachments: Vec::new(),
            comments: Vec::new(),
            time_estimate: None,
            time_spent: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a card from a draft, failing if the priority is unknown
    pub fn from_draft(
        id: CardId,
        column_id: ColumnId,
        draft: CardDraft,
        position: usize,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut card = Self::new(id, column_id, String::new(), position, now);
        card.apply(draft, now)?;
        Ok(card)
    }

    /// Replaces the editable fields with the draft's values
    pub fn apply(&mut self, draft: CardDraft, now: DateTime<Utc>) -> Result<()> {
        let priority = draft.priority.parse::<Priority>()?;

        self.title = draft.title;
        self.description = draft.description;
        self.priority = priority;
        self.tags = draft.tags;
        self.assignee_id = draft.assignee_id;
        self.due_date = draft.due_date;
        self.time_estimate = draft.time_estimate;
        self.updated_at = now;
        Ok(())
    }

    /// Classifies the due date relative to `now`, `None` if no due date
    pub fn due_status(&self, now: DateTime<Utc>) -> Option<DueStatus> {
        let days = self.days_until_due(now)?;
        let status = match days {
            d if d < 0 => DueStatus::Overdue,
            0 => DueStatus::Today,
            1 => DueStatus::Tomorrow,
            d if d <= 7 => DueStatus::InDays(d),
            _ => DueStatus::Later,
        };
        Some(status)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.map(|due| due < now).unwrap_or(false)
    }

    /// Due within the next three days (including today)
    pub fn is_due_soon(&self, now: DateTime<Utc>) -> bool {
        self.days_until_due(now)
            .map(|days| (0..=3).contains(&days))
            .unwrap_or(false)
    }

    // Partial days round up, so anything due later today counts as 1.
    fn days_until_due(&self, now: DateTime<Utc>) -> Option<i64> {
        let due = self.due_date?;
        let millis = (due - now).num_milliseconds() as f64;
        Some((millis / MILLIS_PER_DAY).ceil() as i64)
    }
}

impl Positioned for Card {
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

impl Reparent for Card {
    type Owner = ColumnId;

    fn reparent(&mut self, owner: &ColumnId, at: DateTime<Utc>) {
        self.column_id = owner.clone();
        self.updated_at = at;
    }
}
