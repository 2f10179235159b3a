//! Core data models shared by the stores, the recommendation engine, and
//! the reports.
//!
//! Identifiers are unsigned and always positive once assigned; `0` is the
//! one invalid value and every store rejects it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Maximum stored length of a content title, in chars.
pub const MAX_TITLE_CHARS: usize = 99;
/// Maximum stored length of a category name, in chars.
pub const MAX_CATEGORY_CHARS: usize = 49;
/// Maximum stored length of a username, in chars.
pub const MAX_USERNAME_CHARS: usize = 49;
/// Maximum stored length of a custom list name, in chars.
pub const MAX_LIST_NAME_CHARS: usize = 99;

/// Default bound on the number of favorites a user may hold.
pub const DEFAULT_FAVORITES_CAPACITY: usize = 100;
/// Default bound on the number of items a custom list may hold.
pub const DEFAULT_LIST_CAPACITY: usize = 100;

/// A media item in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub id: u32,
    pub title: String,
    pub category: String,
    /// Running time in minutes. Always positive for records created through
    /// [`ContentStore::add`](crate::store::ContentStore::add).
    pub duration: u32,
    pub age_rating: u32,
    /// Only ever changed by
    /// [`ContentStore::increment_views`](crate::store::ContentStore::increment_views).
    pub views: u32,
}

/// A registered user with their favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    /// Favorite content ids, insertion ordered, no duplicates.
    pub favorites: Vec<u32>,
    /// Maintained incrementally on every registered interaction. It is not
    /// recomputed from the log; see
    /// [`UserInteractionStore::get_interaction_count`](crate::store::UserInteractionStore::get_interaction_count).
    pub interaction_count: u32,
}

/// Kind of event a user produced on a content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InteractionType {
    Play,
    Pause,
    Complete,
    Favorite,
}

impl InteractionType {
    /// Uppercase wire name, as written to the interaction table.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Play => "PLAY",
            InteractionType::Pause => "PAUSE",
            InteractionType::Complete => "COMPLETE",
            InteractionType::Favorite => "FAVORITE",
        }
    }

    /// Whether this event counts as having watched the content.
    pub fn is_viewing(&self) -> bool {
        matches!(self, InteractionType::Play | InteractionType::Complete)
    }

    /// Lenient parse used when reading stored tables: unknown names map to
    /// [`InteractionType::Play`].
    pub fn from_stored(name: &str) -> Self {
        name.parse().unwrap_or(InteractionType::Play)
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an interaction type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interaction type: '{0}'. Use play, pause, complete, or favorite.")]
pub struct UnknownInteractionType(pub String);

impl FromStr for InteractionType {
    type Err = UnknownInteractionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLAY" => Ok(InteractionType::Play),
            "PAUSE" => Ok(InteractionType::Pause),
            "COMPLETE" => Ok(InteractionType::Complete),
            "FAVORITE" => Ok(InteractionType::Favorite),
            _ => Err(UnknownInteractionType(s.to_string())),
        }
    }
}

/// One entry of the append-only interaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub user_id: u32,
    pub content_id: u32,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

/// A user-owned, named, ordered set of content ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomList {
    pub id: u32,
    pub user_id: u32,
    pub name: String,
    pub content_ids: Vec<u32>,
}

/// Truncate `s` to at most `max` chars, on a char boundary.
pub(crate) fn bounded(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
