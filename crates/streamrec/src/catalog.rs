//! Content catalog commands: `srec content ...`.

use anyhow::{bail, Result};

use streamrec_core::models::Content;
use streamrec_core::store::ContentEdit;

use crate::config::Config;
use crate::persist::Stores;

/// Which field `srec content search` matches on.
#[derive(Debug, Clone)]
pub enum SearchField {
    Title(String),
    Category(String),
    AgeRating(u32),
}

pub async fn run_add(
    config: &Config,
    title: &str,
    category: &str,
    duration: u32,
    age_rating: u32,
) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    let id = stores.contents.add(title, category, duration, age_rating)?;
    stores.save(config).await?;
    println!("Added content {}.", id);
    Ok(())
}

pub async fn run_edit(config: &Config, id: u32, changes: &ContentEdit<'_>) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.contents.edit(id, changes)?;
    stores.save(config).await?;
    println!("Updated content {}.", id);
    Ok(())
}

pub async fn run_remove(config: &Config, id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.contents.remove(id)?;
    stores.save(config).await?;
    println!("Removed content {}.", id);
    Ok(())
}

/// Record one view of a content.
pub async fn run_view(config: &Config, id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.contents.increment_views(id)?;
    stores.save(config).await?;
    let views = stores.contents.get_by_id(id).map_or(0, |c| c.views);
    println!("Content {} now has {} views.", id, views);
    Ok(())
}

pub async fn run_get(config: &Config, id: u32, json: bool) -> Result<()> {
    let stores = Stores::load(config).await?;
    let Some(content) = stores.contents.get_by_id(id) else {
        bail!("content not found: {}", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(content)?);
        return Ok(());
    }

    println!("--- Content ---");
    println!("id:          {}", content.id);
    println!("title:       {}", content.title);
    println!("category:    {}", content.category);
    println!("duration:    {} min", content.duration);
    println!("age_rating:  {}", content.age_rating);
    println!("views:       {}", content.views);
    Ok(())
}

pub async fn run_search(config: &Config, field: &SearchField, limit: Option<usize>) -> Result<()> {
    let stores = Stores::load(config).await?;
    let limit = limit.unwrap_or(config.search.max_results);

    let ids = match field {
        SearchField::Title(needle) => stores.contents.search_by_title(needle, limit),
        SearchField::Category(name) => stores.contents.search_by_category(name, limit),
        SearchField::AgeRating(rating) => stores.contents.search_by_age_rating(*rating, limit),
    };

    if ids.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let rows: Vec<&Content> = ids
        .iter()
        .filter_map(|id| stores.contents.get_by_id(*id))
        .collect();
    print_contents(&rows);
    Ok(())
}

/// Print contents as an aligned table.
pub fn print_contents(rows: &[&Content]) {
    println!(
        "{:>5}  {:<36} {:<16} {:>5} {:>4} {:>7}",
        "ID", "TITLE", "CATEGORY", "MIN", "AGE", "VIEWS"
    );
    println!("{}", "-".repeat(80));
    for c in rows {
        println!(
            "{:>5}  {:<36} {:<16} {:>5} {:>4} {:>7}",
            c.id,
            clip(&c.title, 36),
            clip(&c.category, 16),
            c.duration,
            c.age_rating,
            c.views
        );
    }
}

/// Shorten `s` to `width` chars for table display.
pub fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
