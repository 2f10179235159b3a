//! In-memory stores for contents, users with their interaction log, and
//! custom lists.
//!
//! All stores keep their records in a `Vec` in insertion order. Removal
//! compacts the vector and keeps the relative order of survivors, except for
//! the interaction log which is trimmed by swapping the last entry into the
//! hole.
//!
//! # Identifier policy
//!
//! A new id is always `max(existing ids) + 1`, never derived from the record
//! count. Removing the highest-numbered record therefore frees its id for the
//! next record created:
//!
//! ```rust
//! use streamrec_core::store::ContentStore;
//!
//! let mut store = ContentStore::new();
//! let a = store.add("Alpha", "Drama", 90, 12).unwrap();
//! let b = store.add("Beta", "Drama", 95, 12).unwrap();
//! store.remove(b).unwrap();
//! assert_eq!(store.add("Gamma", "Drama", 100, 12).unwrap(), b);
//! assert_eq!(a, 1);
//! ```

pub mod content;
pub mod lists;
pub mod users;

pub use content::{ContentEdit, ContentStore};
pub use lists::ListStore;
pub use users::UserInteractionStore;

use crate::models::{Content, CustomList, User};

/// A record with a store-assigned identifier.
pub trait Keyed {
    fn key(&self) -> u32;
}

impl Keyed for Content {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for User {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for CustomList {
    fn key(&self) -> u32 {
        self.id
    }
}

/// Next identifier for `records`: one past the highest id in use, or `1`.
///
/// Returns `None` once `u32::MAX` is taken.
pub fn next_id<T: Keyed>(records: &[T]) -> Option<u32> {
    match records.iter().map(Keyed::key).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Position of the record with `id`, if present.
pub(crate) fn position_of<T: Keyed>(records: &[T], id: u32) -> Option<usize> {
    records.iter().position(|r| r.key() == id)
}

/// Insert `id` into a bounded, insertion-ordered set.
///
/// Returns `Ok(true)` when the id was added and `Ok(false)` when it was
/// already present. A full set rejects new ids with `Err(capacity)`.
pub(crate) fn insert_bounded(set: &mut Vec<u32>, id: u32, capacity: usize) -> Result<bool, usize> {
    if set.contains(&id) {
        return Ok(false);
    }
    if set.len() >= capacity {
        return Err(capacity);
    }
    set.push(id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: u32) -> CustomList {
        CustomList {
            id,
            user_id: 1,
            name: format!("list {}", id),
            content_ids: Vec::new(),
        }
    }

    #[test]
    fn test_next_id_empty() {
        let records: Vec<CustomList> = Vec::new();
        assert_eq!(next_id(&records), Some(1));
    }

    #[test]
    fn test_next_id_uses_max_not_count() {
        let records = vec![list(7), list(2)];
        assert_eq!(next_id(&records), Some(8));
    }

    #[test]
    fn test_next_id_exhausted() {
        let records = vec![list(3), list(u32::MAX)];
        assert_eq!(next_id(&records), None);
    }

    #[test]
    fn test_insert_bounded() {
        let mut set = vec![1, 2];
        assert_eq!(insert_bounded(&mut set, 2, 3), Ok(false));
        assert_eq!(insert_bounded(&mut set, 3, 3), Ok(true));
        assert_eq!(insert_bounded(&mut set, 4, 3), Err(3));
        assert_eq!(set, vec![1, 2, 3]);
    }
}
