//! Loading and saving the four CSV tables.
//!
//! Decoding and encoding live in `streamrec_core::tabular`; this module only
//! moves text between files and stores. A missing table is reported as
//! [`LoadOutcome::Missing`] rather than an error so a first run starts with
//! empty stores.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use streamrec_core::store::{ContentStore, ListStore, UserInteractionStore};
use streamrec_core::tabular::{self, LoadStats};

use crate::config::Config;

/// Result of loading a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LoadStats),
    /// The file does not exist.
    Missing,
}

impl LoadOutcome {
    pub fn loaded(&self) -> usize {
        match self {
            LoadOutcome::Loaded(stats) => stats.loaded,
            LoadOutcome::Missing => 0,
        }
    }
}

/// Every store the CLI works with.
#[derive(Debug, Clone)]
pub struct Stores {
    pub contents: ContentStore,
    pub users: UserInteractionStore,
    pub lists: ListStore,
}

/// Per-table load outcomes, in load order.
#[derive(Debug, Clone, Copy)]
pub struct LoadSummary {
    pub contents: LoadOutcome,
    pub users: LoadOutcome,
    pub interactions: LoadOutcome,
    pub lists: LoadOutcome,
}

impl Stores {
    /// Empty stores sized by the configured capacities.
    pub fn empty(config: &Config) -> Self {
        Self {
            contents: ContentStore::new(),
            users: UserInteractionStore::with_favorites_capacity(config.limits.favorites_capacity),
            lists: ListStore::with_item_capacity(config.limits.list_capacity),
        }
    }

    pub async fn load(config: &Config) -> Result<Self> {
        Ok(Self::load_with_summary(config).await?.0)
    }

    /// Load all tables. Users are loaded before interactions so the
    /// per-user counters are rebuilt from the log.
    pub async fn load_with_summary(config: &Config) -> Result<(Self, LoadSummary)> {
        let mut stores = Self::empty(config);
        let data = &config.data;

        let contents = load_table(&data.contents_path(), |text| {
            tabular::load_contents(text, &mut stores.contents)
        })
        .await?;
        let users = load_table(&data.users_path(), |text| {
            tabular::load_users(text, &mut stores.users)
        })
        .await?;
        let interactions = load_table(&data.interactions_path(), |text| {
            tabular::load_interactions(text, &mut stores.users)
        })
        .await?;
        let lists = load_table(&data.lists_path(), |text| {
            tabular::load_lists(text, &mut stores.lists)
        })
        .await?;

        tracing::debug!(
            contents = contents.loaded(),
            users = users.loaded(),
            interactions = interactions.loaded(),
            lists = lists.loaded(),
            "stores loaded"
        );

        Ok((
            stores,
            LoadSummary {
                contents,
                users,
                interactions,
                lists,
            },
        ))
    }

    /// Overwrite every table with the current store contents.
    pub async fn save(&self, config: &Config) -> Result<()> {
        for (path, text) in self.encode(config)? {
            write_table(&path, &text).await?;
        }
        Ok(())
    }

    /// Encode every table, paired with the file it belongs in.
    fn encode(&self, config: &Config) -> Result<[(PathBuf, String); 4]> {
        let data = &config.data;
        Ok([
            (
                data.contents_path(),
                tabular::encode_contents(&self.contents).context("failed to encode contents")?,
            ),
            (
                data.users_path(),
                tabular::encode_users(&self.users).context("failed to encode users")?,
            ),
            (
                data.interactions_path(),
                tabular::encode_interactions(&self.users)
                    .context("failed to encode interactions")?,
            ),
            (
                data.lists_path(),
                tabular::encode_lists(&self.lists).context("failed to encode lists")?,
            ),
        ])
    }
}

/// Read `path` and feed it to `decode`. A missing file is not an error.
pub async fn load_table<F>(path: &Path, decode: F) -> Result<LoadOutcome>
where
    F: FnOnce(&str) -> LoadStats,
{
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let stats = decode(&text);
            if stats.skipped > 0 {
                tracing::warn!(
                    path = %path.display(),
                    skipped = stats.skipped,
                    "some rows could not be loaded"
                );
            }
            Ok(LoadOutcome::Loaded(stats))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LoadOutcome::Missing),
        Err(e) => Err(e).with_context(|| format!("Failed to read table: {}", path.display())),
    }
}

/// Write `text` to `path`, creating parent directories and replacing any
/// existing file.
pub async fn write_table(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write table: {}", path.display()))
}

/// Create every missing table with just its header. Existing tables are
/// left untouched.
pub async fn run_init(config: &Config) -> Result<()> {
    let tables = Stores::empty(config).encode(config)?;

    let mut created = 0;
    for (path, header) in &tables {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            continue;
        }
        write_table(path, header).await?;
        created += 1;
    }

    println!(
        "Data directory initialized at {} ({} tables created).",
        config.data.dir.display(),
        created
    );
    Ok(())
}
