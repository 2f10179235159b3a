//! User commands: `srec user ...`.

use anyhow::{bail, Result};
use serde::Serialize;

use streamrec_core::models::{InteractionType, User};

use crate::config::Config;
use crate::persist::Stores;
use crate::stats::format_last_active;

pub async fn run_add(config: &Config, username: &str) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    let id = stores.users.add_user(username)?;
    stores.save(config).await?;
    println!("Added user {} ({}).", id, username);
    Ok(())
}

/// Remove a user together with their interactions and custom lists.
pub async fn run_remove(config: &Config, id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.users.remove_user(id)?;
    let lists = stores.lists.remove_owned_by(id);
    stores.save(config).await?;
    println!("Removed user {} ({} lists dropped).", id, lists);
    Ok(())
}

#[derive(Serialize)]
struct UserView<'a> {
    #[serde(flatten)]
    user: &'a User,
    lists: Vec<u32>,
    last_interaction: Option<i64>,
}

/// Show a user looked up by numeric id or by exact username.
pub async fn run_get(config: &Config, key: &str, json: bool) -> Result<()> {
    let stores = Stores::load(config).await?;
    let user = match key.parse::<u32>() {
        Ok(id) => stores.users.get_by_id(id),
        Err(_) => stores.users.get_by_username(key),
    };
    let Some(user) = user else {
        bail!("user not found: {}", key);
    };

    let view = UserView {
        user,
        lists: stores.lists.by_user(user.id, usize::MAX),
        last_interaction: stores
            .users
            .interactions_for(user.id)
            .map(|i| i.timestamp)
            .max(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("--- User ---");
    println!("id:            {}", user.id);
    println!("username:      {}", user.username);
    println!("interactions:  {}", user.interaction_count);
    println!(
        "last active:   {}",
        view.last_interaction
            .map(|ts| format_last_active(ts, chrono::Utc::now().timestamp()))
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "favorites:     {}/{}",
        user.favorites.len(),
        stores.users.favorites_capacity()
    );
    for content_id in &user.favorites {
        match stores.contents.get_by_id(*content_id) {
            Some(c) => println!("  {:>5}  {}", c.id, c.title),
            None => println!("  {:>5}  (removed)", content_id),
        }
    }
    if !view.lists.is_empty() {
        println!("lists:         {}", join_ids(&view.lists));
    }
    Ok(())
}

/// Log an interaction. The content must exist in the catalog.
pub async fn run_interact(
    config: &Config,
    user_id: u32,
    content_id: u32,
    kind: InteractionType,
) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    if stores.contents.get_by_id(content_id).is_none() {
        bail!("content not found: {}", content_id);
    }
    stores
        .users
        .register_interaction(user_id, content_id, kind)?;
    stores.save(config).await?;
    println!("Recorded {} of content {} by user {}.", kind, content_id, user_id);
    Ok(())
}

pub async fn run_favorite(config: &Config, user_id: u32, content_id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    if stores.contents.get_by_id(content_id).is_none() {
        bail!("content not found: {}", content_id);
    }
    stores.users.add_favorite(user_id, content_id)?;
    stores.save(config).await?;
    println!("Content {} is a favorite of user {}.", content_id, user_id);
    Ok(())
}

pub async fn run_unfavorite(config: &Config, user_id: u32, content_id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.users.remove_favorite(user_id, content_id)?;
    stores.save(config).await?;
    println!("Removed content {} from favorites of user {}.", content_id, user_id);
    Ok(())
}

pub(crate) fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
