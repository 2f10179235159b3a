//! Data directory statistics.
//!
//! Provides a quick summary of what is stored: record counts, table sizes,
//! and a per-category breakdown of the catalog. Used by `srec stats`.

use anyhow::Result;
use std::path::Path;

use streamrec_core::models::InteractionType;

use crate::config::Config;
use crate::persist::{LoadOutcome, Stores};

/// Per-category breakdown of content and view counts.
struct CategoryStats {
    category: String,
    content_count: usize,
    views: u64,
    last_interaction_ts: Option<i64>,
}

/// Run the stats command: load every table and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let (stores, summary) = Stores::load_with_summary(config).await?;
    let data = &config.data;

    println!("streamrec Data Stats");
    println!("===================");
    println!();
    println!("  Data dir:      {}", data.dir.display());
    for (label, path, outcome) in [
        ("contents", data.contents_path(), summary.contents),
        ("users", data.users_path(), summary.users),
        ("interactions", data.interactions_path(), summary.interactions),
        ("lists", data.lists_path(), summary.lists),
    ] {
        println!("  {:<14} {}", format!("{}:", label), describe_table(&path, outcome));
    }
    println!();
    println!("  Contents:      {}", stores.contents.len());
    println!("  Users:         {}", stores.users.len());
    println!("  Interactions:  {}", stores.users.interactions().len());
    println!("  Lists:         {}", stores.lists.len());

    let total_views: u64 = stores.contents.iter().map(|c| u64::from(c.views)).sum();
    println!("  Total views:   {}", total_views);

    let mut by_kind = [0usize; 4];
    for interaction in stores.users.interactions() {
        by_kind[kind_index(interaction.kind)] += 1;
    }
    if !stores.users.interactions().is_empty() {
        println!(
            "  By type:       PLAY={} PAUSE={} COMPLETE={} FAVORITE={}",
            by_kind[0], by_kind[1], by_kind[2], by_kind[3]
        );
    }

    let now = chrono::Utc::now().timestamp();
    let mut category_stats: Vec<CategoryStats> = Vec::new();
    for content in stores.contents.iter() {
        let last = stores
            .users
            .interactions()
            .iter()
            .filter(|i| i.content_id == content.id)
            .map(|i| i.timestamp)
            .max();
        match category_stats
            .iter_mut()
            .find(|s| s.category == content.category)
        {
            Some(s) => {
                s.content_count += 1;
                s.views += u64::from(content.views);
                s.last_interaction_ts = s.last_interaction_ts.max(last);
            }
            None => category_stats.push(CategoryStats {
                category: content.category.clone(),
                content_count: 1,
                views: u64::from(content.views),
                last_interaction_ts: last,
            }),
        }
    }
    category_stats.sort_by(|a, b| {
        b.content_count
            .cmp(&a.content_count)
            .then(a.category.cmp(&b.category))
    });

    if !category_stats.is_empty() {
        println!();
        println!("  By category:");
        println!(
            "  {:<24} {:>8} {:>8}   {}",
            "CATEGORY", "CONTENTS", "VIEWS", "LAST ACTIVITY"
        );
        println!("  {}", "-".repeat(64));

        for s in &category_stats {
            let activity = match s.last_interaction_ts {
                Some(ts) => format_last_active(ts, now),
                None => "never".to_string(),
            };
            println!(
                "  {:<24} {:>8} {:>8}   {}",
                s.category, s.content_count, s.views, activity
            );
        }
    }

    println!();
    Ok(())
}

fn kind_index(kind: InteractionType) -> usize {
    match kind {
        InteractionType::Play => 0,
        InteractionType::Pause => 1,
        InteractionType::Complete => 2,
        InteractionType::Favorite => 3,
    }
}

fn describe_table(path: &Path, outcome: LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Missing => "missing".to_string(),
        LoadOutcome::Loaded(stats) => {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            let mut text = format!("{} rows, {}", stats.loaded, format_table_size(size));
            if stats.skipped > 0 {
                text.push_str(&format!(" ({} skipped)", stats.skipped));
            }
            text
        }
    }
}

/// Size of a table file: plain bytes below 1 KiB, then KiB or MiB.
fn format_table_size(bytes: u64) -> String {
    let kib = bytes as f64 / 1024.0;
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if kib < 1024.0 {
        format!("{:.1} KiB", kib)
    } else {
        format!("{:.1} MiB", kib / 1024.0)
    }
}

/// Describe when an interaction happened relative to `now`, by UTC calendar
/// day. Anything older than four weeks, or in the future, is shown as a date.
pub(crate) fn format_last_active(ts: i64, now: i64) -> String {
    let (Some(then), Some(today)) = (
        chrono::DateTime::from_timestamp(ts, 0),
        chrono::DateTime::from_timestamp(now, 0),
    ) else {
        return ts.to_string();
    };
    match (today.date_naive() - then.date_naive()).num_days() {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        days @ 2..=28 => format!("{} days ago", days),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}
