//! # streamrec core
//!
//! In-memory stores and recommendation logic for streamrec: data models,
//! the content / user / list stores, the recommendation engine, reports,
//! and the tabular record codec.
//!
//! This crate does no filesystem I/O and has no async runtime. Callers load
//! tables into strings, hand them to [`tabular`], and own the stores they
//! get back.
//!
//! ```rust
//! use streamrec_core::models::InteractionType;
//! use streamrec_core::recommend::RecommendationEngine;
//! use streamrec_core::store::{ContentStore, UserInteractionStore};
//!
//! let mut contents = ContentStore::new();
//! let watched = contents.add("Heat", "Action", 170, 16).unwrap();
//! let similar = contents.add("Ronin", "Action", 122, 16).unwrap();
//! contents.add("Amelie", "Comedy", 122, 12).unwrap();
//!
//! let mut users = UserInteractionStore::new();
//! let user = users.add_user("ana").unwrap();
//! users
//!     .register_interaction(user, watched, InteractionType::Complete)
//!     .unwrap();
//!
//! let engine = RecommendationEngine::new(&contents, &users);
//! assert_eq!(engine.content_similarity(user, 1), vec![similar]);
//! ```

pub mod error;
pub mod models;
pub mod recommend;
pub mod report;
pub mod store;
pub mod tabular;
