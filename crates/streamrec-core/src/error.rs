//! Error type shared by all stores.
//!
//! Every failing store operation is a no-op: the store is left exactly as it
//! was before the call.

use thiserror::Error;

/// What kind of record a [`StoreError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Content,
    User,
    List,
    Favorite,
    ListItem,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Content => "content",
            RecordKind::User => "user",
            RecordKind::List => "list",
            RecordKind::Favorite => "favorite",
            RecordKind::ListItem => "list item",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: u32 },

    #[error("username already taken: '{0}'")]
    DuplicateUsername(String),

    #[error("capacity exceeded (max {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("no {0} ids left")]
    IdsExhausted(RecordKind),
}

pub type StoreResult<T> = Result<T, StoreError>;
