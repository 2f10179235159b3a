//! TOML configuration for the `srec` CLI.
//!
//! ```toml
//! [data]
//! dir = "./data"
//!
//! [recommendation]
//! max_recommendations = 10
//!
//! [search]
//! max_results = 50
//!
//! [limits]
//! favorites_capacity = 100
//! list_capacity = 100
//! ```
//!
//! Only `[data]` is required; every other section falls back to defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use streamrec_core::models::{DEFAULT_FAVORITES_CAPACITY, DEFAULT_LIST_CAPACITY};
use streamrec_core::recommend::DEFAULT_MAX_RECOMMENDATIONS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory holding the four CSV tables.
    pub dir: PathBuf,
    #[serde(default = "default_contents_file")]
    pub contents_file: String,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_interactions_file")]
    pub interactions_file: String,
    #[serde(default = "default_lists_file")]
    pub lists_file: String,
}

fn default_contents_file() -> String {
    "contents.csv".to_string()
}
fn default_users_file() -> String {
    "users.csv".to_string()
}
fn default_interactions_file() -> String {
    "interactions.csv".to_string()
}
fn default_lists_file() -> String {
    "lists.csv".to_string()
}

impl DataConfig {
    pub fn contents_path(&self) -> PathBuf {
        self.dir.join(&self.contents_file)
    }

    pub fn users_path(&self) -> PathBuf {
        self.dir.join(&self.users_file)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.dir.join(&self.interactions_file)
    }

    pub fn lists_path(&self) -> PathBuf {
        self.dir.join(&self.lists_file)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_recommendations: default_max_recommendations(),
            default_strategy: default_strategy(),
        }
    }
}

fn default_max_recommendations() -> usize {
    DEFAULT_MAX_RECOMMENDATIONS
}
fn default_strategy() -> String {
    "personalized".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_favorites_capacity")]
    pub favorites_capacity: usize,
    #[serde(default = "default_list_capacity")]
    pub list_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            favorites_capacity: default_favorites_capacity(),
            list_capacity: default_list_capacity(),
        }
    }
}

fn default_favorites_capacity() -> usize {
    DEFAULT_FAVORITES_CAPACITY
}
fn default_list_capacity() -> usize {
    DEFAULT_LIST_CAPACITY
}

impl Config {
    /// Defaults with the data directory at `./data`, used when no config
    /// file exists.
    pub fn minimal() -> Self {
        Self {
            data: DataConfig {
                dir: PathBuf::from("./data"),
                contents_file: default_contents_file(),
                users_file: default_users_file(),
                interactions_file: default_interactions_file(),
                lists_file: default_lists_file(),
            },
            recommendation: RecommendationConfig::default(),
            search: SearchConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.recommendation.max_recommendations == 0 {
        anyhow::bail!("recommendation.max_recommendations must be >= 1");
    }

    config
        .recommendation
        .default_strategy
        .parse::<streamrec_core::recommend::Strategy>()
        .with_context(|| "recommendation.default_strategy is invalid")?;

    if config.search.max_results == 0 {
        anyhow::bail!("search.max_results must be >= 1");
    }

    if config.limits.favorites_capacity == 0 {
        anyhow::bail!("limits.favorites_capacity must be >= 1");
    }

    if config.limits.list_capacity == 0 {
        anyhow::bail!("limits.list_capacity must be >= 1");
    }

    for (key, name) in [
        ("contents_file", &config.data.contents_file),
        ("users_file", &config.data.users_file),
        ("interactions_file", &config.data.interactions_file),
        ("lists_file", &config.data.lists_file),
    ] {
        if name.trim().is_empty() {
            anyhow::bail!("data.{} must not be empty", key);
        }
    }

    Ok(())
}
