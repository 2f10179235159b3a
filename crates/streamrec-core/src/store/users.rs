//! Users, their favorites, and the append-only interaction log.

use tracing::{debug, warn};

use crate::error::{RecordKind, StoreError, StoreResult};
use crate::models::{
    bounded, Interaction, InteractionType, User, DEFAULT_FAVORITES_CAPACITY, MAX_USERNAME_CHARS,
};

use super::{insert_bounded, next_id, position_of};

/// Users plus the interaction log they own.
#[derive(Debug, Clone)]
pub struct UserInteractionStore {
    users: Vec<User>,
    interactions: Vec<Interaction>,
    favorites_capacity: usize,
}

impl Default for UserInteractionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInteractionStore {
    pub fn new() -> Self {
        Self::with_favorites_capacity(DEFAULT_FAVORITES_CAPACITY)
    }

    pub fn with_favorites_capacity(favorites_capacity: usize) -> Self {
        Self {
            users: Vec::new(),
            interactions: Vec::new(),
            favorites_capacity,
        }
    }

    pub fn favorites_capacity(&self) -> usize {
        self.favorites_capacity
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// The raw interaction log. Order is insertion order until a user is
    /// removed, after which it is unspecified.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Interactions belonging to `user_id`, in log order.
    pub fn interactions_for(&self, user_id: u32) -> impl Iterator<Item = &Interaction> {
        self.interactions
            .iter()
            .filter(move |i| i.user_id == user_id)
    }

    /// Register a new user. Usernames are unique, compared case-sensitively.
    pub fn add_user(&mut self, username: &str) -> StoreResult<u32> {
        if username.is_empty() {
            return Err(StoreError::InvalidArgument("username must not be empty"));
        }
        let username = bounded(username, MAX_USERNAME_CHARS);
        if self.users.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username));
        }

        let id = next_id(&self.users).ok_or(StoreError::IdsExhausted(RecordKind::User))?;
        debug!(id, username = %username, "user added");
        self.users.push(User {
            id,
            username,
            favorites: Vec::new(),
            interaction_count: 0,
        });
        Ok(id)
    }

    /// Restore a previously stored user with its id and favorites.
    ///
    /// The interaction counter starts at zero and is rebuilt as interactions
    /// are appended with [`append_loaded_interaction`](Self::append_loaded_interaction).
    /// Favorites beyond the capacity are dropped.
    pub fn insert_loaded_user(&mut self, id: u32, username: &str, favorites: &[u32]) -> StoreResult<()> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("user id must be > 0"));
        }
        if username.is_empty() {
            return Err(StoreError::InvalidArgument("username must not be empty"));
        }
        if self.get_by_id(id).is_some() {
            return Err(StoreError::InvalidArgument("duplicate user id"));
        }
        let username = bounded(username, MAX_USERNAME_CHARS);
        if self.users.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username));
        }

        let mut set = Vec::new();
        for &fav in favorites.iter().filter(|f| **f > 0) {
            if insert_bounded(&mut set, fav, self.favorites_capacity).is_err() {
                warn!(user_id = id, capacity = self.favorites_capacity, "favorites truncated on load");
                break;
            }
        }
        self.users.push(User {
            id,
            username,
            favorites: set,
            interaction_count: 0,
        });
        Ok(())
    }

    /// Remove a user and every interaction they own.
    ///
    /// The log is trimmed by swapping the last entry into each hole, so the
    /// order of surviving interactions is not preserved. The user list keeps
    /// its relative order.
    pub fn remove_user(&mut self, id: u32) -> StoreResult<()> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("user id must be > 0"));
        }
        let idx = position_of(&self.users, id).ok_or(StoreError::NotFound {
            kind: RecordKind::User,
            id,
        })?;

        let mut i = 0;
        let mut dropped = 0usize;
        while i < self.interactions.len() {
            if self.interactions[i].user_id == id {
                self.interactions.swap_remove(i);
                dropped += 1;
            } else {
                i += 1;
            }
        }
        self.users.remove(idx);
        debug!(id, dropped_interactions = dropped, "user removed");
        Ok(())
    }

    pub fn get_by_id(&self, id: u32) -> Option<&User> {
        if id == 0 {
            return None;
        }
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-sensitive exact lookup.
    pub fn get_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Log an interaction stamped with the current time.
    ///
    /// A [`InteractionType::Favorite`] interaction also adds the content to
    /// the user's favorites. A full favorites set does not fail the
    /// interaction itself.
    pub fn register_interaction(
        &mut self,
        user_id: u32,
        content_id: u32,
        kind: InteractionType,
    ) -> StoreResult<()> {
        let now = chrono::Utc::now().timestamp();
        self.register_interaction_at(user_id, content_id, kind, now)
    }

    /// [`register_interaction`](Self::register_interaction) with an explicit
    /// timestamp.
    pub fn register_interaction_at(
        &mut self,
        user_id: u32,
        content_id: u32,
        kind: InteractionType,
        timestamp: i64,
    ) -> StoreResult<()> {
        if user_id == 0 || content_id == 0 {
            return Err(StoreError::InvalidArgument("ids must be > 0"));
        }
        let user = self.user_mut(user_id)?;
        user.interaction_count = user.interaction_count.saturating_add(1);

        self.interactions.push(Interaction {
            user_id,
            content_id,
            kind,
            timestamp,
        });
        debug!(user_id, content_id, kind = %kind, "interaction registered");

        if kind == InteractionType::Favorite {
            if let Err(e) = self.add_favorite(user_id, content_id) {
                warn!(user_id, content_id, error = %e, "favorite not recorded");
            }
        }
        Ok(())
    }

    /// Restore a stored interaction. Interactions whose owner is unknown are
    /// still appended, but no counter is bumped.
    pub fn append_loaded_interaction(&mut self, interaction: Interaction) {
        if let Some(user) = self.users.iter_mut().find(|u| u.id == interaction.user_id) {
            user.interaction_count = user.interaction_count.saturating_add(1);
        }
        self.interactions.push(interaction);
    }

    /// Add `content_id` to the user's favorites. Adding an existing favorite
    /// succeeds without changing anything.
    pub fn add_favorite(&mut self, user_id: u32, content_id: u32) -> StoreResult<()> {
        if content_id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        let capacity = self.favorites_capacity;
        let user = self.user_mut(user_id)?;
        insert_bounded(&mut user.favorites, content_id, capacity)
            .map(|_| ())
            .map_err(|capacity| StoreError::CapacityExceeded { capacity })
    }

    pub fn remove_favorite(&mut self, user_id: u32, content_id: u32) -> StoreResult<()> {
        if content_id == 0 {
            return Err(StoreError::InvalidArgument("content id must be > 0"));
        }
        let user = self.user_mut(user_id)?;
        let idx = user
            .favorites
            .iter()
            .position(|f| *f == content_id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Favorite,
                id: content_id,
            })?;
        user.favorites.remove(idx);
        Ok(())
    }

    /// Count the user's interactions by scanning the log.
    ///
    /// Independent of [`User::interaction_count`], which is maintained
    /// incrementally; the two can be compared to validate the log.
    pub fn get_interaction_count(&self, user_id: u32) -> usize {
        if user_id == 0 {
            return 0;
        }
        self.interactions_for(user_id).count()
    }

    /// True if the log holds a PLAY or COMPLETE interaction for the pair.
    pub fn has_watched(&self, user_id: u32, content_id: u32) -> bool {
        if user_id == 0 || content_id == 0 {
            return false;
        }
        self.interactions
            .iter()
            .any(|i| i.user_id == user_id && i.content_id == content_id && i.kind.is_viewing())
    }

    fn user_mut(&mut self, id: u32) -> StoreResult<&mut User> {
        if id == 0 {
            return Err(StoreError::InvalidArgument("user id must be > 0"));
        }
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::User,
                id,
            })
    }
}
