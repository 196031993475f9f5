//! The mutation surface of one loaded board.
//!
//! `BoardAggregate` is the only thing that changes a board's tree. Every
//! operation runs to completion before returning and either succeeds or
//! leaves the tree exactly as it was. Persisting the result is the caller's
//! job; see [`crate::service::KanbanService::save_board`].

use crate::{
    domain::{
        board::{Board, BoardDraft, BoardMember, BoardRole},
        card::{Card, CardDraft, CardPatch},
        column::{Column, ColumnDraft, ColumnPatch},
        ids::{BoardId, CardId, ColumnId, EntityKind, IdGenerator, UserId},
        ordering::{move_across_sequences, move_within_sequence, renumber, reorder_by_sequence},
    },
    error::{KanbanError, Result},
    validation::Validator,
};
use std::{fmt, sync::Arc};

pub struct BoardAggregate {
    board: Board,
    ids: Arc<dyn IdGenerator>,
    validator: Validator,
}

impl fmt::Debug for BoardAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardAggregate")
            .field("board", &self.board)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl BoardAggregate {
    /// Wraps an already loaded board
    pub fn new(board: Board, ids: Arc<dyn IdGenerator>, validator: Validator) -> Self {
        Self {
            board,
            ids,
            validator,
        }
    }

    /// Builds a new board from a draft, seeding the columns it names.
    ///
    /// `draft.columns == None` seeds nothing here.
    pub fn create(
        mut draft: BoardDraft,
        ids: Arc<dyn IdGenerator>,
        validator: Validator,
    ) -> Result<Self> {
        validator
            .validate_board(&draft.title, draft.description.as_deref())
            .into_result()?;

        let seed = draft.columns.take().unwrap_or_default();
        let id = BoardId::new(ids.next_id(EntityKind::Board));
        let board = Board::new(id, draft, ids.now());

        let mut aggregate = Self::new(board, ids, validator);
        for title in seed {
            aggregate.add_column(ColumnDraft::new(title));
        }
        Ok(aggregate)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn id(&self) -> &BoardId {
        &self.board.id
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Appends a new column at the end of the board
    pub fn add_column(&mut self, draft: ColumnDraft) -> &Column {
        let now = self.ids.now();
        let id = ColumnId::new(self.ids.next_id(EntityKind::Column));
        let position = self.board.columns.len();

        self.board.columns.push(Column::new(
            id,
            self.board.id.clone(),
            draft,
            position,
            now,
        ));
        self.board.updated_at = now;
        &self.board.columns[position]
    }

    /// Appends a new card at the end of a column.
    ///
    /// Fails with `NotFound` for an unknown column, then with `Validation`
    /// for an invalid draft; in both cases nothing changes.
    pub fn add_card(&mut self, column_id: &ColumnId, draft: CardDraft) -> Result<&Card> {
        let index = self.require_column(column_id)?;
        self.validator.validate_card(&draft).into_result()?;

        let now = self.ids.now();
        let id = CardId::new(self.ids.next_id(EntityKind::Card));
        let column = &mut self.board.columns[index];
        let position = column.cards.len();

        let card = Card::from_draft(id, column.id.clone(), draft, position, now)?;
        column.cards.push(card);
        self.board.updated_at = now;
        Ok(&self.board.columns[index].cards[position])
    }

    /// Draft pre-filled from the board's card template
    pub fn card_draft(&self, title: impl Into<String>) -> CardDraft {
        let draft = CardDraft::new(title);
        match &self.board.settings.card_template {
            Some(template) => draft
                .with_priority(template.default_priority)
                .with_tags(template.default_tags.iter().cloned()),
            None => draft,
        }
    }

    /// Moves a card to `target_index` of `to_column`, which may be the column
    /// it is already in. Out-of-range indices are clamped.
    pub fn move_card(
        &mut self,
        card_id: &CardId,
        from_column: &ColumnId,
        to_column: &ColumnId,
        target_index: isize,
    ) -> Result<()> {
        let from = self.require_column(from_column)?;
        let to = self.require_column(to_column)?;
        let now = self.ids.now();
        let card_missing = || KanbanError::not_found(EntityKind::Card, card_id.as_str());

        if from == to {
            let current = self.board.columns[from]
                .card_index(card_id)
                .ok_or_else(card_missing)?;
            let cards = &mut self.board.columns[from].cards;
            let landed =
                move_within_sequence(cards, current, target_index).ok_or_else(card_missing)?;
            cards[landed].updated_at = now;
        } else {
            let (source, target) = pair_mut(&mut self.board.columns, from, to);
            move_across_sequences(
                &mut source.cards,
                &mut target.cards,
                card_id.as_str(),
                &target.id,
                target_index,
                now,
            )
            .ok_or_else(card_missing)?;
        }

        self.board.updated_at = now;
        Ok(())
    }

    /// Moves a column to `target_index` on the board (clamped)
    pub fn move_column(&mut self, column_id: &ColumnId, target_index: isize) -> Result<()> {
        let current = self.require_column(column_id)?;
        let now = self.ids.now();

        let landed = move_within_sequence(&mut self.board.columns, current, target_index)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Column, column_id.as_str()))?;
        self.board.columns[landed].updated_at = now;
        self.board.updated_at = now;
        Ok(())
    }

    /// Removes a card from whichever column holds it
    pub fn delete_card(&mut self, card_id: &CardId) -> bool {
        for column in &mut self.board.columns {
            if let Some(index) = column.card_index(card_id) {
                column.cards.remove(index);
                renumber(&mut column.cards);
                self.board.updated_at = self.ids.now();
                return true;
            }
        }
        false
    }

    /// Removes a column together with its cards
    pub fn delete_column(&mut self, column_id: &ColumnId) -> bool {
        match self.board.column_index(column_id) {
            Some(index) => {
                self.board.columns.remove(index);
                renumber(&mut self.board.columns);
                self.board.updated_at = self.ids.now();
                true
            }
            None => false,
        }
    }

    /// Re-sorts a column's cards by id; cards not listed are dropped
    pub fn reorder_cards_in_column(&mut self, column_id: &ColumnId, order: &[CardId]) -> bool {
        let Some(index) = self.board.column_index(column_id) else {
            return false;
        };
        reorder_by_sequence(&mut self.board.columns[index].cards, order);
        self.board.updated_at = self.ids.now();
        true
    }

    /// Re-sorts the board's columns by id; columns not listed are dropped
    pub fn reorder_columns(&mut self, order: &[ColumnId]) -> bool {
        reorder_by_sequence(&mut self.board.columns, order);
        self.board.updated_at = self.ids.now();
        true
    }

    /// Applies a partial update to a card after validating the merged result
    pub fn update_card(&mut self, card_id: &CardId, patch: CardPatch) -> Result<&Card> {
        let (column_index, card_index) = self
            .board
            .columns
            .iter()
            .enumerate()
            .find_map(|(ci, column)| column.card_index(card_id).map(|i| (ci, i)))
            .ok_or_else(|| KanbanError::not_found(EntityKind::Card, card_id.as_str()))?;

        let card = &mut self.board.columns[column_index].cards[card_index];
        let mut draft = CardDraft::from(&*card);
        patch.merge_into(&mut draft);
        self.validator.validate_card(&draft).into_result()?;

        let now = self.ids.now();
        card.apply(draft, now)?;
        if let Some(spent) = patch.time_spent {
            card.time_spent = spent;
        }
        self.board.updated_at = now;
        Ok(&self.board.columns[column_index].cards[card_index])
    }

    /// Applies a partial update to a column's own fields
    pub fn update_column(&mut self, column_id: &ColumnId, patch: ColumnPatch) -> Result<&Column> {
        let index = self.require_column(column_id)?;

        let column = &mut self.board.columns[index];
        let mut draft = ColumnDraft::from(&*column);
        patch.merge_into(&mut draft);
        self.validator.validate_column(&draft).into_result()?;

        let now = self.ids.now();
        column.apply(draft, now);
        if let Some(archived) = patch.is_archived {
            column.is_archived = archived;
        }
        self.board.updated_at = now;
        Ok(&self.board.columns[index])
    }

    /// Changes the board's title and description
    pub fn update_details(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<()> {
        let title = title.into();
        self.validator
            .validate_board(&title, description.as_deref())
            .into_result()?;

        self.board.title = title;
        self.board.description = description;
        self.board.updated_at = self.ids.now();
        Ok(())
    }

    pub fn set_public(&mut self, is_public: bool) {
        self.board.is_public = is_public;
        self.board.updated_at = self.ids.now();
    }

    /// Adds a member, or changes the role of an existing one.
    ///
    /// The owner's role cannot be changed this way.
    pub fn add_member(&mut self, user_id: UserId, role: BoardRole) -> Result<&BoardMember> {
        let now = self.ids.now();
        let index = match self.board.members.iter().position(|m| m.user_id == user_id) {
            Some(index) => {
                if self.board.members[index].role == BoardRole::Owner && role != BoardRole::Owner {
                    return Err(KanbanError::PermissionDenied {
                        user_id: user_id.to_string(),
                        action: "change the board owner's role".to_string(),
                    });
                }
                self.board.members[index].role = role;
                index
            }
            None => {
                self.board.members.push(BoardMember {
                    user_id,
                    role,
                    joined_at: now,
                });
                self.board.members.len() - 1
            }
        };
        self.board.updated_at = now;
        Ok(&self.board.members[index])
    }

    /// Removes a member; the owner is never removed
    pub fn remove_member(&mut self, user_id: &UserId) -> bool {
        if user_id == &self.board.owner_id {
            return false;
        }
        let before = self.board.members.len();
        self.board.members.retain(|m| &m.user_id != user_id);
        let removed = self.board.members.len() != before;
        if removed {
            self.board.updated_at = self.ids.now();
        }
        removed
    }

    /// `PermissionDenied` unless the user may edit this board
    pub fn authorize_edit(&self, user_id: &UserId, action: &str) -> Result<()> {
        if self.board.can_edit(user_id) {
            Ok(())
        } else {
            Err(KanbanError::PermissionDenied {
                user_id: user_id.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn require_column(&self, column_id: &ColumnId) -> Result<usize> {
        self.board
            .column_index(column_id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Column, column_id.as_str()))
    }
}

/// Two distinct mutable elements of one slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
