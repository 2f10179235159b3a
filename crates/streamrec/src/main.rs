//! # streamrec CLI (`srec`)
//!
//! The `srec` binary manages a content catalog, its users, their
//! interactions and custom lists, and produces recommendations and reports.
//! All state lives in four CSV tables under the configured data directory.
//!
//! ## Usage
//!
//! ```bash
//! srec --config ./config/srec.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `srec init` | Create the data directory and empty tables |
//! | `srec content add\|edit\|remove\|get\|search\|view` | Manage the catalog |
//! | `srec user add\|remove\|get\|interact\|favorite\|unfavorite` | Manage users |
//! | `srec list create\|remove\|add\|drop\|rename\|show` | Manage custom lists |
//! | `srec recommend <user-id>` | Recommend contents for a user |
//! | `srec report viewed\|categories\|users\|user <id>` | Print or export reports |
//! | `srec stats` | Summarize the data directory |
//!
//! ## Examples
//!
//! ```bash
//! srec init
//! srec content add "Heat" Action --duration 170 --age-rating 16
//! srec user add ana
//! srec user interact 1 1 complete
//! srec recommend 1 --strategy personalized --explain
//! srec report viewed --limit 5 --export ./viewed.csv
//! ```
//!
//! Set `RUST_LOG=streamrec=debug` to trace store mutations on stderr.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use streamrec::config;
use streamrec::report::ReportKind;
use streamrec::{catalog, lists, persist, recommend, report, stats, users};
use streamrec_core::models::InteractionType;
use streamrec_core::store::ContentEdit;

/// streamrec: content catalog and recommendation CLI.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, data is kept in `./data`.
#[derive(Parser)]
#[command(
    name = "srec",
    about = "streamrec: a content catalog with users, interactions, and recommendations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/srec.toml`. When the file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/srec.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and any missing tables.
    ///
    /// Existing tables are left untouched, so running it twice is safe.
    Init,

    /// Manage the content catalog.
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Manage users, their interactions, and favorites.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage user-owned custom lists.
    List {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Recommend contents for a user.
    Recommend {
        /// User id.
        user_id: u32,

        /// Strategy: `popularity`, `similarity`, `category`, or
        /// `personalized`. Defaults to `recommendation.default_strategy`.
        #[arg(long)]
        strategy: Option<String>,

        /// Maximum number of recommendations.
        #[arg(long)]
        limit: Option<usize>,

        /// Show the rank each item held in the blended lists.
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print or export a report.
    Report {
        #[command(subcommand)]
        kind: ReportCommand,

        /// Maximum number of rows.
        #[arg(long, global = true)]
        limit: Option<usize>,

        /// Write the report as CSV to this path instead of printing it.
        #[arg(long, global = true)]
        export: Option<PathBuf>,
    },

    /// Show record counts and a per-category breakdown.
    Stats,

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ContentAction {
    /// Add a content. Prints the assigned id.
    Add {
        title: String,
        category: String,
        /// Running time in minutes (> 0).
        #[arg(long)]
        duration: u32,
        #[arg(long, default_value_t = 0)]
        age_rating: u32,
    },
    /// Change fields of a content. Omitted fields are left unchanged.
    Edit {
        id: u32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        age_rating: Option<u32>,
    },
    /// Remove a content.
    Remove { id: u32 },
    /// Show a content.
    Get {
        id: u32,
        #[arg(long)]
        json: bool,
    },
    /// Search by title substring, exact category, or exact age rating.
    Search {
        #[arg(long, conflicts_with_all = ["category", "age_rating"])]
        title: Option<String>,
        #[arg(long, conflicts_with = "age_rating")]
        category: Option<String>,
        #[arg(long)]
        age_rating: Option<u32>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Record one view of a content.
    View { id: u32 },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a user. Prints the assigned id.
    Add { username: String },
    /// Remove a user with their interactions and lists.
    Remove { id: u32 },
    /// Show a user by id or username.
    Get {
        user: String,
        #[arg(long)]
        json: bool,
    },
    /// Log an interaction: `play`, `pause`, `complete`, or `favorite`.
    Interact {
        user_id: u32,
        content_id: u32,
        kind: String,
    },
    /// Add a content to a user's favorites.
    Favorite { user_id: u32, content_id: u32 },
    /// Remove a content from a user's favorites.
    Unfavorite { user_id: u32, content_id: u32 },
}

#[derive(Subcommand)]
enum ListAction {
    /// Create a list. Prints the assigned id.
    Create { user_id: u32, name: String },
    /// Delete a list.
    Remove { id: u32 },
    /// Add a content to a list.
    Add { list_id: u32, content_id: u32 },
    /// Remove a content from a list.
    Drop { list_id: u32, content_id: u32 },
    /// Rename a list.
    Rename { id: u32, name: String },
    /// Show a list, or every list owned by `--user`.
    Show {
        id: Option<u32>,
        #[arg(long, conflicts_with = "id")]
        user: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Contents by view count.
    Viewed,
    /// Categories by total views.
    Categories,
    /// Users by interaction count.
    Users,
    /// One user's interactions grouped by content.
    User { id: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("streamrec=warn")),
        )
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "srec", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            persist::run_init(&cfg).await?;
        }
        Commands::Content { action } => match action {
            ContentAction::Add {
                title,
                category,
                duration,
                age_rating,
            } => {
                catalog::run_add(&cfg, &title, &category, duration, age_rating).await?;
            }
            ContentAction::Edit {
                id,
                title,
                category,
                duration,
                age_rating,
            } => {
                let changes = ContentEdit {
                    title: title.as_deref(),
                    category: category.as_deref(),
                    duration,
                    age_rating,
                };
                catalog::run_edit(&cfg, id, &changes).await?;
            }
            ContentAction::Remove { id } => {
                catalog::run_remove(&cfg, id).await?;
            }
            ContentAction::Get { id, json } => {
                catalog::run_get(&cfg, id, json).await?;
            }
            ContentAction::Search {
                title,
                category,
                age_rating,
                limit,
            } => {
                let field = match (title, category, age_rating) {
                    (Some(t), _, _) => catalog::SearchField::Title(t),
                    (None, Some(c), _) => catalog::SearchField::Category(c),
                    (None, None, Some(a)) => catalog::SearchField::AgeRating(a),
                    (None, None, None) => {
                        anyhow::bail!("pass one of --title, --category, or --age-rating")
                    }
                };
                catalog::run_search(&cfg, &field, limit).await?;
            }
            ContentAction::View { id } => {
                catalog::run_view(&cfg, id).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Add { username } => {
                users::run_add(&cfg, &username).await?;
            }
            UserAction::Remove { id } => {
                users::run_remove(&cfg, id).await?;
            }
            UserAction::Get { user, json } => {
                users::run_get(&cfg, &user, json).await?;
            }
            UserAction::Interact {
                user_id,
                content_id,
                kind,
            } => {
                let kind: InteractionType = kind.parse()?;
                users::run_interact(&cfg, user_id, content_id, kind).await?;
            }
            UserAction::Favorite {
                user_id,
                content_id,
            } => {
                users::run_favorite(&cfg, user_id, content_id).await?;
            }
            UserAction::Unfavorite {
                user_id,
                content_id,
            } => {
                users::run_unfavorite(&cfg, user_id, content_id).await?;
            }
        },
        Commands::List { action } => match action {
            ListAction::Create { user_id, name } => {
                lists::run_create(&cfg, user_id, &name).await?;
            }
            ListAction::Remove { id } => {
                lists::run_remove(&cfg, id).await?;
            }
            ListAction::Add {
                list_id,
                content_id,
            } => {
                lists::run_add(&cfg, list_id, content_id).await?;
            }
            ListAction::Drop {
                list_id,
                content_id,
            } => {
                lists::run_drop(&cfg, list_id, content_id).await?;
            }
            ListAction::Rename { id, name } => {
                lists::run_rename(&cfg, id, &name).await?;
            }
            ListAction::Show { id, user, json } => {
                lists::run_show(&cfg, id, user, json).await?;
            }
        },
        Commands::Recommend {
            user_id,
            strategy,
            limit,
            explain,
            json,
        } => {
            recommend::run_recommend(&cfg, user_id, strategy, limit, explain, json).await?;
        }
        Commands::Report {
            kind,
            limit,
            export,
        } => {
            let kind = match kind {
                ReportCommand::Viewed => ReportKind::MostViewed,
                ReportCommand::Categories => ReportKind::Categories,
                ReportCommand::Users => ReportKind::ActiveUsers,
                ReportCommand::User { id } => ReportKind::User(id),
            };
            report::run_report(&cfg, kind, limit, export.as_deref()).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
