use crate::domain::{board::Theme, ids::UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application-wide role of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Member,
    Viewer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardView {
    #[default]
    Kanban,
    List,
    Calendar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub mentions: bool,
    pub due_date_reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            mentions: true,
            due_date_reminders: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub theme: Theme,
    pub language: String,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub board_view: BoardView,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            language: "en".to_string(),
            notifications: NotificationSettings::default(),
            board_view: BoardView::Kanban,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub preferences: UserPreferences,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

/// The local user of the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            avatar: draft.avatar,
            role: draft.role,
            preferences: draft.preferences,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_preferences(&mut self, preferences: UserPreferences, now: DateTime<Utc>) {
        self.preferences = preferences;
        self.updated_at = now;
    }

    /// Initials shown when there is no avatar image
    pub fn avatar_text(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}
