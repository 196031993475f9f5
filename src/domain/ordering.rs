//! Position bookkeeping shared by columns (within a board) and cards
//! (within a column).
//!
//! Every function here leaves the touched sequences with dense, zero-based
//! positions that match array order. Functions that can fail check first
//! and mutate second, so a failed call leaves its inputs untouched.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// An entity that lives at a numbered slot of an ordered sequence
pub trait Positioned {
    /// Identifier used to look the entity up inside its sequence
    fn key(&self) -> &str;

    fn position(&self) -> usize;

    fn set_position(&mut self, position: usize);
}

/// An entity that keeps a back-reference to the owner of its sequence
pub trait Reparent: Positioned {
    type Owner;

    /// Points the entity at a new owner and stamps the change
    fn reparent(&mut self, owner: &Self::Owner, at: DateTime<Utc>);
}

/// Clamps a requested insertion index into `0..=len`.
///
/// Negative indices land at the front, anything past the end appends.
pub fn clamp_index(index: isize, len: usize) -> usize {
    if index <= 0 {
        0
    } else {
        (index as usize).min(len)
    }
}

/// Rewrites every position to its array index
pub fn renumber<T: Positioned>(sequence: &mut [T]) {
    for (index, item) in sequence.iter_mut().enumerate() {
        item.set_position(index);
    }
}

/// Index of the entity with the given key, if present
pub fn index_of<T: Positioned>(sequence: &[T], key: &str) -> Option<usize> {
    sequence.iter().position(|item| item.key() == key)
}

/// Moves the element at `from` to `to` inside one sequence.
///
/// `to` is clamped against the sequence with the element removed, so moving
/// to `isize::MAX` always appends. Returns the final index of the element,
/// or `None` without touching the sequence when `from` is out of range.
///
/// # Examples
/// ```
/// use kanban_core::domain::ordering::move_within_sequence;
/// use kanban_core::domain::{Column, ColumnDraft, BoardId, ColumnId};
///
/// let board = BoardId::new("board_1");
/// let now = chrono::Utc::now();
/// let mut columns: Vec<Column> = ["A", "B", "C"]
///     .iter()
///     .enumerate()
///     .map(|(i, t)| Column::new(ColumnId::new(*t), board.clone(), ColumnDraft::new(*t), i, now))
///     .collect();
///
/// assert_eq!(move_within_sequence(&mut columns, 0, 2), Some(2));
/// let titles: Vec<_> = columns.iter().map(|c| c.title.as_str()).collect();
/// assert_eq!(titles, ["B", "C", "A"]);
/// assert_eq!(columns[2].position, 2);
/// ```
pub fn move_within_sequence<T: Positioned>(
    sequence: &mut Vec<T>,
    from: usize,
    to: isize,
) -> Option<usize> {
    if from >= sequence.len() {
        return None;
    }

    let item = sequence.remove(from);
    let to = clamp_index(to, sequence.len());
    sequence.insert(to, item);
    renumber(sequence);
    Some(to)
}

/// Rebuilds a sequence in the order given by `order`.
///
/// This is a lenient re-sort: keys in `order` that are not in the sequence
/// are ignored, repeated keys only count once, and entities whose key is
/// missing from `order` are dropped. Returns how many entities were kept.
pub fn reorder_by_sequence<T, K>(sequence: &mut Vec<T>, order: &[K]) -> usize
where
    T: Positioned,
    K: AsRef<str>,
{
    let index: HashMap<String, usize> = sequence
        .iter()
        .enumerate()
        .map(|(i, item)| (item.key().to_string(), i))
        .collect();
    let mut slots: Vec<Option<T>> = sequence.drain(..).map(Some).collect();

    for key in order {
        if let Some(&i) = index.get(key.as_ref()) {
            if let Some(item) = slots[i].take() {
                sequence.push(item);
            }
        }
    }

    renumber(sequence);
    sequence.len()
}

/// Moves the entity with `key` from `source` into `target` at `target_index`.
///
/// The entity is re-pointed at `owner` (the owner of `target`) before it is
/// inserted, and both sequences are renumbered. Returns the final index in
/// `target`, or `None` with neither sequence touched when `key` is not in
/// `source`.
pub fn move_across_sequences<T: Reparent>(
    source: &mut Vec<T>,
    target: &mut Vec<T>,
    key: &str,
    owner: &T::Owner,
    target_index: isize,
    at: DateTime<Utc>,
) -> Option<usize> {
    let from = index_of(source, key)?;

    let mut item = source.remove(from);
    item.reparent(owner, at);

    let to = clamp_index(target_index, target.len());
    target.insert(to, item);

    renumber(source);
    renumber(target);
    Some(to)
}

/// Positions are `0..n` in array order
pub fn is_dense<T: Positioned>(sequence: &[T]) -> bool {
    sequence
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() == index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        owner: String,
        position: usize,
        touched: Option<DateTime<Utc>>,
    }

    impl Positioned for Item {
        fn key(&self) -> &str {
            &self.id
        }

        fn position(&self) -> usize {
            self.position
        }

        fn set_position(&mut self, position: usize) {
            self.position = position;
        }
    }

    impl Reparent for Item {
        type Owner = String;

        fn reparent(&mut self, owner: &String, at: DateTime<Utc>) {
            self.owner = owner.clone();
            self.touched = Some(at);
        }
    }

    fn items(owner: &str, ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .enumerate()
            .map(|(position, id)| Item {
                id: id.to_string(),
                owner: owner.to_string(),
                position,
                touched: None,
            })
            .collect()
    }

    fn ids(sequence: &[Item]) -> Vec<&str> {
        sequence.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-3, 4), 0);
        assert_eq!(clamp_index(0, 4), 0);
        assert_eq!(clamp_index(2, 4), 2);
        assert_eq!(clamp_index(4, 4), 4);
        assert_eq!(clamp_index(99, 4), 4);
        assert_eq!(clamp_index(5, 0), 0);
    }

    #[test]
    fn test_move_forward() {
        let mut seq = items("c", &["a", "b", "c", "d"]);
        assert_eq!(move_within_sequence(&mut seq, 0, 2), Some(2));
        assert_eq!(ids(&seq), ["b", "c", "a", "d"]);
        assert!(is_dense(&seq));
    }

    #[test]
    fn test_move_backward() {
        let mut seq = items("c", &["a", "b", "c", "d"]);
        assert_eq!(move_within_sequence(&mut seq, 3, 1), Some(1));
        assert_eq!(ids(&seq), ["a", "d", "b", "c"]);
        assert!(is_dense(&seq));
    }

    #[test]
    fn test_move_to_same_index_keeps_order() {
        let mut seq = items("c", &["a", "b", "c"]);
        seq[1].position = 7;
        assert_eq!(move_within_sequence(&mut seq, 1, 1), Some(1));
        assert_eq!(ids(&seq), ["a", "b", "c"]);
        assert_eq!(seq[1].position, 1);
    }

    #[test]
    fn test_move_clamps_out_of_range_targets() {
        let mut seq = items("c", &["a", "b", "c"]);
        assert_eq!(move_within_sequence(&mut seq, 0, 50), Some(2));
        assert_eq!(ids(&seq), ["b", "c", "a"]);

        assert_eq!(move_within_sequence(&mut seq, 2, -4), Some(0));
        assert_eq!(ids(&seq), ["a", "b", "c"]);
        assert!(is_dense(&seq));
    }

    #[test]
    fn test_move_with_invalid_source_is_noop() {
        let mut seq = items("c", &["a", "b"]);
        let before = seq.clone();
        assert_eq!(move_within_sequence(&mut seq, 2, 0), None);
        assert_eq!(seq, before);

        let mut empty: Vec<Item> = Vec::new();
        assert_eq!(move_within_sequence(&mut empty, 0, 0), None);
    }

    #[test]
    fn test_reorder_full_permutation() {
        let mut seq = items("c", &["a", "b", "c"]);
        assert_eq!(reorder_by_sequence(&mut seq, &["c", "a", "b"]), 3);
        assert_eq!(ids(&seq), ["c", "a", "b"]);
        assert!(is_dense(&seq));
    }

    #[test]
    fn test_reorder_drops_omitted_and_ignores_unknown() {
        let mut seq = items("c", &["a", "b", "c"]);
        assert_eq!(reorder_by_sequence(&mut seq, &["zzz", "c", "a"]), 2);
        assert_eq!(ids(&seq), ["c", "a"]);
        assert!(is_dense(&seq));
    }

    #[test]
    fn test_reorder_repeated_keys_do_not_duplicate() {
        let mut seq = items("c", &["a", "b"]);
        reorder_by_sequence(&mut seq, &["b", "b", "a", "b"]);
        assert_eq!(ids(&seq), ["b", "a"]);
    }

    #[test]
    fn test_move_across_updates_owner_and_both_sides() {
        let mut source = items("todo", &["a", "b", "c"]);
        let mut target = items("doing", &["x", "y"]);
        let at = Utc::now();

        let landed = move_across_sequences(
            &mut source,
            &mut target,
            "b",
            &"doing".to_string(),
            1,
            at,
        );

        assert_eq!(landed, Some(1));
        assert_eq!(ids(&source), ["a", "c"]);
        assert_eq!(ids(&target), ["x", "b", "y"]);
        assert_eq!(target[1].owner, "doing");
        assert_eq!(target[1].touched, Some(at));
        assert!(is_dense(&source));
        assert!(is_dense(&target));
    }

    #[test]
    fn test_move_across_into_empty_target_clamps() {
        let mut source = items("todo", &["a"]);
        let mut target: Vec<Item> = Vec::new();

        let landed = move_across_sequences(
            &mut source,
            &mut target,
            "a",
            &"done".to_string(),
            10,
            Utc::now(),
        );

        assert_eq!(landed, Some(0));
        assert!(source.is_empty());
        assert_eq!(target[0].position, 0);
    }

    #[test]
    fn test_move_across_missing_key_leaves_both_untouched() {
        let mut source = items("todo", &["a", "b"]);
        let mut target = items("doing", &["x"]);
        let (source_before, target_before) = (source.clone(), target.clone());

        let landed = move_across_sequences(
            &mut source,
            &mut target,
            "nope",
            &"doing".to_string(),
            0,
            Utc::now(),
        );

        assert_eq!(landed, None);
        assert_eq!(source, source_before);
        assert_eq!(target, target_before);
    }
}
