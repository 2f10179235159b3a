//! Content catalog: CRUD, search, and view counting.

use tracing::debug;

use crate::error::{RecordKind, StoreError, StoreResult};
use crate::models::{bounded, Content, MAX_CATEGORY_CHARS, MAX_TITLE_CHARS};

use super::{next_id, position_of};

/// Field changes applied by [`ContentStore::edit`].
///
/// `None`, an empty string, and a zero duration all mean "leave unchanged",
/// so a duration can never be edited down to zero.
#[derive(Debug, Clone, Default)]
pub struct ContentEdit<'a> {
    pub title: Option<&'a str>,
    pub category: Option<&'a str>,
    pub duration: Option<u32>,
    pub age_rating: Option<u32>,
}

/// The content catalog, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    items: Vec<Content>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All contents in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Content> {
        self.items.iter()
    }

    /// Add a new content with zero views and return its id.
    pub fn add(
        &mut self,
        title: &str,
        category: &str,
        duration: u32,
        age_rating: u32,
    ) -> StoreResult<u32> {
        if title.is_empty() {
            return Err(StoreError::InvalidArgument("title must not be empty"));
        }
        if category.is_empty() {
            return Err(StoreError::InvalidArgument("category must not be empty"));
        }
        if duration == 0 {
            return Err(StoreError::InvalidArgument("duration must be > 0"));
        }

        let id = next_id(&self.items).ok_or(StoreError::IdsExhausted(RecordKind::Content))?;
        self.items.push(Content {
            id,
            title: bounded(title, MAX_TITLE_CHARS),
            category: bounded(category, MAX_CATEGORY_CHARS),
            duration,
            age_rating,
            views: 0,
        });
        debug!(id, title, category, "content added");
        Ok(id)
    }

    /// Restore a previously stored record, keeping its id and view count.
    ///
    /// Rejects id `0` and ids already present.
    pub fn insert_loaded(&mut self, mut content: Content) -> StoreResult<()> {
        if content.id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        if self.get_by_id(content.id).is_some() {
            return Err(StoreError::InvalidArgument("duplicate content id"));
        }
        content.title = bounded(&content.title, MAX_TITLE_CHARS);
        content.category = bounded(&content.category, MAX_CATEGORY_CHARS);
        self.items.push(content);
        Ok(())
    }

    pub fn edit(&mut self, id: u32, changes: &ContentEdit<'_>) -> StoreResult<()> {
        let content = self.get_mut(id)?;

        if let Some(title) = changes.title.filter(|t| !t.is_empty()) {
            content.title = bounded(title, MAX_TITLE_CHARS);
        }
        if let Some(category) = changes.category.filter(|c| !c.is_empty()) {
            content.category = bounded(category, MAX_CATEGORY_CHARS);
        }
        if let Some(duration) = changes.duration.filter(|d| *d > 0) {
            content.duration = duration;
        }
        if let Some(age_rating) = changes.age_rating {
            content.age_rating = age_rating;
        }
        debug!(id, "content edited");
        Ok(())
    }

    /// Remove a content, keeping the relative order of the remaining ones.
    pub fn remove(&mut self, id: u32) -> StoreResult<()> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        let idx = position_of(&self.items, id).ok_or(StoreError::NotFound {
            kind: RecordKind::Content,
            id,
        })?;
        self.items.remove(idx);
        debug!(id, "content removed");
        Ok(())
    }

    pub fn get_by_id(&self, id: u32) -> Option<&Content> {
        if id == 0 {
            return None;
        }
        self.items.iter().find(|c| c.id == id)
    }

    pub fn increment_views(&mut self, id: u32) -> StoreResult<()> {
        let content = self.get_mut(id)?;
        content.views = content.views.saturating_add(1);
        Ok(())
    }

    /// Ids whose title contains `needle`, ignoring case, in store order.
    pub fn search_by_title(&self, needle: &str, limit: usize) -> Vec<u32> {
        if needle.is_empty() {
            return Vec::new();
        }
        let needle = needle.to_lowercase();
        self.collect_matching(limit, |c| c.title.to_lowercase().contains(&needle))
    }

    /// Ids whose category equals `name`, ignoring case. Not a substring match.
    pub fn search_by_category(&self, name: &str, limit: usize) -> Vec<u32> {
        if name.is_empty() {
            return Vec::new();
        }
        let name = name.to_lowercase();
        self.collect_matching(limit, |c| c.category.to_lowercase() == name)
    }

    pub fn search_by_age_rating(&self, age_rating: u32, limit: usize) -> Vec<u32> {
        self.collect_matching(limit, |c| c.age_rating == age_rating)
    }

    fn collect_matching<F>(&self, limit: usize, pred: F) -> Vec<u32>
    where
        F: Fn(&Content) -> bool,
    {
        self.items
            .iter()
            .filter(|c| pred(c))
            .take(limit)
            .map(|c| c.id)
            .collect()
    }

    fn get_mut(&mut self, id: u32) -> StoreResult<&mut Content> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        self.items
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Content,
                id,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> (ContentStore, u32, u32, u32) {
        let mut store = ContentStore::new();
        let a = store.add("The Long Night", "Action", 120, 16).unwrap();
        let b = store.add("Laugh Track", "Comedy", 95, 12).unwrap();
        let c = store.add("Night Shift", "Documentary", 60, 0).unwrap();
        (store, a, b, c)
    }

    #[test]
    fn test_add_assigns_fresh_id_and_stores_fields() {
        let (mut store, a, b, c) = sample_store();
        assert_eq!((a, b, c), (1, 2, 3));

        let id = store.add("Fresh", "Drama", 100, 14).unwrap();
        assert_eq!(store.len(), 4);
        let content = store.get_by_id(id).unwrap();
        assert_eq!(content.title, "Fresh");
        assert_eq!(content.category, "Drama");
        assert_eq!(content.duration, 100);
        assert_eq!(content.age_rating, 14);
        assert_eq!(content.views, 0);
    }

    #[test]
    fn test_add_rejects_invalid_fields() {
        let mut store = ContentStore::new();
        assert!(store.add("", "Drama", 90, 0).is_err());
        assert!(store.add("Title", "", 90, 0).is_err());
        assert!(store.add("Title", "Drama", 0, 0).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_truncates_long_title() {
        let mut store = ContentStore::new();
        let long = "x".repeat(150);
        let id = store.add(&long, "Drama", 90, 0).unwrap();
        assert_eq!(store.get_by_id(id).unwrap().title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_removed_max_id_is_reused() {
        let (mut store, _, _, c) = sample_store();
        store.remove(c).unwrap();
        let id = store.add("Replacement", "Drama", 80, 0).unwrap();
        assert_eq!(id, c);
    }

    #[test]
    fn test_removed_middle_id_is_not_reused() {
        let (mut store, _, b, _) = sample_store();
        store.remove(b).unwrap();
        assert_eq!(store.add("Next", "Drama", 80, 0).unwrap(), 4);
    }

    #[test]
    fn test_remove_preserves_order() {
        let (mut store, a, b, c) = sample_store();
        store.remove(b).unwrap();
        let ids: Vec<u32> = store.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(
            store.remove(b),
            Err(StoreError::NotFound {
                kind: RecordKind::Content,
                id: b
            })
        );
        assert!(store.remove(0).is_err());
    }

    #[test]
    fn test_edit_ignores_unset_and_zero_fields() {
        let (mut store, a, _, _) = sample_store();
        store
            .edit(
                a,
                &ContentEdit {
                    title: Some("The Long Night: Extended"),
                    category: Some(""),
                    duration: Some(130),
                    age_rating: None,
                },
            )
            .unwrap();
        let content = store.get_by_id(a).unwrap();
        assert_eq!(content.title, "The Long Night: Extended");
        assert_eq!(content.category, "Action");
        assert_eq!(content.duration, 130);
        assert_eq!(content.age_rating, 16);

        store
            .edit(
                a,
                &ContentEdit {
                    duration: Some(0),
                    age_rating: Some(0),
                    ..Default::default()
                },
            )
            .unwrap();
        let content = store.get_by_id(a).unwrap();
        assert_eq!(content.duration, 130);
        assert_eq!(content.age_rating, 0);
    }

    #[test]
    fn test_edit_missing_id_fails() {
        let (mut store, _, _, _) = sample_store();
        assert!(store.edit(99, &ContentEdit::default()).is_err());
        assert!(store.edit(0, &ContentEdit::default()).is_err());
    }

    #[test]
    fn test_increment_views() {
        let (mut store, a, _, _) = sample_store();
        store.increment_views(a).unwrap();
        store.increment_views(a).unwrap();
        assert_eq!(store.get_by_id(a).unwrap().views, 2);
        assert!(store.increment_views(42).is_err());
    }

    #[test]
    fn test_search_by_title_is_case_insensitive_substring() {
        let (store, a, _, c) = sample_store();
        assert_eq!(store.search_by_title("NIGHT", 10), vec![a, c]);
        assert_eq!(store.search_by_title("night", 1), vec![a]);
        assert!(store.search_by_title("", 10).is_empty());
        assert!(store.search_by_title("night", 0).is_empty());
    }

    #[test]
    fn test_search_by_category_is_exact() {
        let (store, _, b, _) = sample_store();
        assert_eq!(store.search_by_category("comedy", 10), vec![b]);
        assert!(store.search_by_category("Com", 10).is_empty());
    }

    #[test]
    fn test_search_by_age_rating() {
        let (store, _, _, c) = sample_store();
        assert_eq!(store.search_by_age_rating(0, 10), vec![c]);
        assert!(store.search_by_age_rating(18, 10).is_empty());
    }

    #[test]
    fn test_insert_loaded_rejects_duplicates() {
        let (mut store, a, _, _) = sample_store();
        let dup = store.get_by_id(a).unwrap().clone();
        assert!(store.insert_loaded(dup).is_err());

        let mut fresh = store.get_by_id(a).unwrap().clone();
        fresh.id = 10;
        fresh.views = 7;
        store.insert_loaded(fresh).unwrap();
        assert_eq!(store.get_by_id(10).unwrap().views, 7);
        assert_eq!(store.add("After", "Drama", 90, 0).unwrap(), 11);
    }

    #[test]
    fn test_add_fails_when_ids_are_exhausted() {
        let (mut store, a, _, _) = sample_store();
        let mut last = store.get_by_id(a).unwrap().clone();
        last.id = u32::MAX;
        store.insert_loaded(last).unwrap();

        assert_eq!(
            store.add("Overflow", "Drama", 90, 0),
            Err(StoreError::IdsExhausted(RecordKind::Content))
        );
        assert_eq!(store.len(), 4);
        assert!(store.search_by_title("Overflow", 10).is_empty());
    }
}
