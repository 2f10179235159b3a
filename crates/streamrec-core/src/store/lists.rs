//! User-owned custom lists of content ids.

use tracing::debug;

use crate::error::{RecordKind, StoreError, StoreResult};
use crate::models::{bounded, CustomList, DEFAULT_LIST_CAPACITY, MAX_LIST_NAME_CHARS};

use super::{insert_bounded, next_id, position_of};

#[derive(Debug, Clone)]
pub struct ListStore {
    lists: Vec<CustomList>,
    item_capacity: usize,
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListStore {
    pub fn new() -> Self {
        Self::with_item_capacity(DEFAULT_LIST_CAPACITY)
    }

    pub fn with_item_capacity(item_capacity: usize) -> Self {
        Self {
            lists: Vec::new(),
            item_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomList> {
        self.lists.iter()
    }

    pub fn create(&mut self, user_id: u32, name: &str) -> StoreResult<u32> {
        if user_id == 0 {
            return Err(StoreError::InvalidArgument("user id must be > 0"));
        }
        if name.is_empty() {
            return Err(StoreError::InvalidArgument("list name must not be empty"));
        }
        let id = next_id(&self.lists).ok_or(StoreError::IdsExhausted(RecordKind::List))?;
        self.lists.push(CustomList {
            id,
            user_id,
            name: bounded(name, MAX_LIST_NAME_CHARS),
            content_ids: Vec::new(),
        });
        debug!(id, user_id, "list created");
        Ok(id)
    }

    /// Restore a stored list. Items beyond the capacity are dropped.
    pub fn insert_loaded(&mut self, mut list: CustomList) -> StoreResult<()> {
        if list.id == 0 || list.user_id == 0 {
            return Err(StoreError::InvalidArgument("list and user ids must be > 0"));
        }
        if list.name.is_empty() {
            return Err(StoreError::InvalidArgument("list name must not be empty"));
        }
        if self.get_by_id(list.id).is_some() {
            return Err(StoreError::InvalidArgument("duplicate list id"));
        }
        let mut items = Vec::new();
        for &id in list.content_ids.iter().filter(|id| **id > 0) {
            if insert_bounded(&mut items, id, self.item_capacity).is_err() {
                break;
            }
        }
        list.content_ids = items;
        list.name = bounded(&list.name, MAX_LIST_NAME_CHARS);
        self.lists.push(list);
        Ok(())
    }

    pub fn remove(&mut self, id: u32) -> StoreResult<()> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("list id must be > 0"));
        }
        let idx = position_of(&self.lists, id).ok_or(StoreError::NotFound {
            kind: RecordKind::List,
            id,
        })?;
        self.lists.remove(idx);
        debug!(id, "list removed");
        Ok(())
    }

    /// Drop every list owned by `user_id`, returning how many were removed.
    pub fn remove_owned_by(&mut self, user_id: u32) -> usize {
        let before = self.lists.len();
        self.lists.retain(|l| l.user_id != user_id);
        before - self.lists.len()
    }

    /// Add an item. Adding an item already in the list succeeds unchanged.
    pub fn add_content(&mut self, list_id: u32, content_id: u32) -> StoreResult<()> {
        if content_id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        let capacity = self.item_capacity;
        let list = self.list_mut(list_id)?;
        insert_bounded(&mut list.content_ids, content_id, capacity)
            .map(|_| ())
            .map_err(|capacity| StoreError::CapacityExceeded { capacity })
    }

    pub fn remove_content(&mut self, list_id: u32, content_id: u32) -> StoreResult<()> {
        if content_id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        let list = self.list_mut(list_id)?;
        let idx = list
            .content_ids
            .iter()
            .position(|c| *c == content_id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::ListItem,
                id: content_id,
            })?;
        list.content_ids.remove(idx);
        Ok(())
    }

    pub fn get_by_id(&self, id: u32) -> Option<&CustomList> {
        if id == 0 {
            return None;
        }
        self.lists.iter().find(|l| l.id == id)
    }

    /// Ids of the lists owned by `user_id`, in store order.
    pub fn by_user(&self, user_id: u32, limit: usize) -> Vec<u32> {
        if user_id == 0 {
            return Vec::new();
        }
        self.lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .take(limit)
            .map(|l| l.id)
            .collect()
    }

    pub fn rename(&mut self, id: u32, name: &str) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument("list name must not be empty"));
        }
        let list = self.list_mut(id)?;
        list.name = bounded(name, MAX_LIST_NAME_CHARS);
        Ok(())
    }

    fn list_mut(&mut self, id: u32) -> StoreResult<&mut CustomList> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("list id must be > 0"));
        }
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::List,
                id,
            })
    }
}
