//! # streamrec
//!
//! **A small streaming catalog with content, users, and recommendations.**
//!
//! This crate is the application layer around [`streamrec_core`]: it reads
//! and writes the CSV tables, loads the TOML configuration, and implements
//! the commands behind the `srec` binary.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │ CSV tables │──▶│ Stores (persist) │──▶│ Engine and  │
//! │ data/*.csv │◀──│ content/users/   │   │ reports     │
//! └────────────┘   │ lists            │   └──────┬──────┘
//!                  └──────────────────┘          │
//!                                                ▼
//!                                          ┌──────────┐
//!                                          │   CLI    │
//!                                          │  (srec)  │
//!                                          └──────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. [`config`] locates the data directory and the runtime limits.
//! 2. [`persist::Stores::load`] decodes every table into the in-memory stores.
//! 3. A command mutates or queries the stores; recommendations come from
//!    [`streamrec_core::recommend::RecommendationEngine`].
//! 4. Mutating commands write every table back with [`persist::Stores::save`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`persist`] | Table loading, saving, and `srec init` |
//! | [`catalog`] | Content commands |
//! | [`users`] | User, interaction, and favorite commands |
//! | [`lists`] | Custom list commands |
//! | [`recommend`] | Recommendation output with optional explanation |
//! | [`report`] | Reports and CSV export |
//! | [`stats`] | Data directory summary |

pub mod catalog;
pub mod config;
pub mod lists;
pub mod persist;
pub mod recommend;
pub mod report;
pub mod stats;
pub mod users;
