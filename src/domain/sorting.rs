use crate::domain::card::Card;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting cards in list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Position,
    Title,
    Priority,
    Due,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(SortField::Position),
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "due" => Ok(SortField::Due),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: position, title, priority, due, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts card references for display.
///
/// Only the slice of references is reordered; the cards' `position` fields
/// are left alone. The sort is stable, so ties keep their incoming order.
///
/// # Examples
/// ```
/// use kanban_core::domain::sorting::{sort_cards, SortField, SortOrder};
/// use kanban_core::domain::{Card, CardId, ColumnId, Priority};
///
/// let now = chrono::Utc::now();
/// let column = ColumnId::new("col_1");
/// let mut low = Card::new(CardId::new("card_1"), column.clone(), "Low", 0, now);
/// low.priority = Priority::Low;
/// let mut urgent = Card::new(CardId::new("card_2"), column, "Urgent", 1, now);
/// urgent.priority = Priority::Urgent;
///
/// let mut view = vec![&low, &urgent];
/// sort_cards(&mut view, SortField::Priority, SortOrder::Descending);
/// assert_eq!(view[0].title, "Urgent");
/// ```
pub fn sort_cards(cards: &mut [&Card], field: SortField, order: SortOrder) {
    cards.sort_by(|a, b| {
        if field == SortField::Due {
            return compare_option_dates(a.due_date, b.due_date, order);
        }

        let cmp = match field {
            SortField::Position => a.position.cmp(&b.position),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
            SortField::Due => Ordering::Equal,
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Compare Option<DateTime> with None always sorting to end
///
/// Cards with a due date come before cards without one regardless of the
/// sort order; only the dated cards are reversed for descending order.
fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => match order {
            SortOrder::Ascending => a_date.cmp(&b_date),
            SortOrder::Descending => b_date.cmp(&a_date),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
