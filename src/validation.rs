//! Field rules for drafts of boards, columns, cards and users.
//!
//! Validation is pure: it inspects a draft and reports every rule the draft
//! breaks, in a fixed order, without touching any state.

use crate::{
    domain::{
        card::{CardDraft, Priority},
        column::ColumnDraft,
        user::UserDraft,
    },
    error::{KanbanError, Result},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Length and count ceilings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub card_title_max: usize,
    pub card_description_max: usize,
    pub column_title_max: usize,
    pub column_description_max: usize,
    pub board_title_max: usize,
    pub board_description_max: usize,
    pub max_tags_per_card: usize,
    pub max_cards_per_column: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            card_title_max: 100,
            card_description_max: 500,
            column_title_max: 50,
            column_description_max: 200,
            board_title_max: 100,
            board_description_max: 500,
            max_tags_per_card: 5,
            max_cards_per_column: 100,
        }
    }
}

/// Outcome of validating one draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when valid, otherwise `KanbanError::Validation` with every rule
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(KanbanError::Validation(self.errors))
        }
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn validate_card(&self, draft: &CardDraft) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_title(&mut report, &draft.title, self.limits.card_title_max);
        check_description(
            &mut report,
            draft.description.as_deref(),
            self.limits.card_description_max,
        );

        if draft.priority.parse::<Priority>().is_err() {
            report.push("Invalid priority level");
        }

        if draft.tags.len() > self.limits.max_tags_per_card {
            report.push(format!(
                "Maximum {} tags allowed",
                self.limits.max_tags_per_card
            ));
        }

        report
    }

    pub fn validate_column(&self, draft: &ColumnDraft) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_title(&mut report, &draft.title, self.limits.column_title_max);
        check_description(
            &mut report,
            draft.description.as_deref(),
            self.limits.column_description_max,
        );

        if let Some(max_cards) = draft.max_cards {
            let ceiling = self.limits.max_cards_per_column;
            if !(1..=ceiling).contains(&max_cards) {
                report.push(format!("Max cards must be between 1 and {}", ceiling));
            }
        }

        report
    }

    pub fn validate_board(&self, title: &str, description: Option<&str>) -> ValidationReport {
        let mut report = ValidationReport::default();
        check_title(&mut report, title, self.limits.board_title_max);
        check_description(&mut report, description, self.limits.board_description_max);
        report
    }

    pub fn validate_email(&self, email: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        if email.trim().is_empty() {
            report.push("Email is required");
        } else if !EMAIL_PATTERN.is_match(email) {
            report.push("Invalid email format");
        }
        report
    }

    pub fn validate_user(&self, draft: &UserDraft) -> ValidationReport {
        let mut report = ValidationReport::default();
        if draft.name.trim().is_empty() {
            report.push("Name is required");
        }
        report.errors.extend(self.validate_email(&draft.email).errors);
        report
    }
}

fn check_title(report: &mut ValidationReport, title: &str, max: usize) {
    if title.trim().is_empty() {
        report.push("Title is required");
    } else if title.chars().count() > max {
        report.push(format!("Title must be less than {} characters", max));
    }
}

fn check_description(report: &mut ValidationReport, description: Option<&str>, max: usize) {
    if let Some(description) = description {
        if description.chars().count() > max {
            report.push(format!("Description must be less than {} characters", max));
        }
    }
}
