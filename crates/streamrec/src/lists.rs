//! Custom list commands: `srec list ...`.

use anyhow::{bail, Result};

use streamrec_core::models::Content;

use crate::catalog::print_contents;
use crate::config::Config;
use crate::persist::Stores;

/// Create a list owned by an existing user.
pub async fn run_create(config: &Config, user_id: u32, name: &str) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    if stores.users.get_by_id(user_id).is_none() {
        bail!("user not found: {}", user_id);
    }
    let id = stores.lists.create(user_id, name)?;
    stores.save(config).await?;
    println!("Created list {}.", id);
    Ok(())
}

pub async fn run_remove(config: &Config, id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.lists.remove(id)?;
    stores.save(config).await?;
    println!("Removed list {}.", id);
    Ok(())
}

pub async fn run_add(config: &Config, list_id: u32, content_id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    if stores.contents.get_by_id(content_id).is_none() {
        bail!("content not found: {}", content_id);
    }
    stores.lists.add_content(list_id, content_id)?;
    stores.save(config).await?;
    println!("List {} contains content {}.", list_id, content_id);
    Ok(())
}

pub async fn run_drop(config: &Config, list_id: u32, content_id: u32) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.lists.remove_content(list_id, content_id)?;
    stores.save(config).await?;
    println!("Dropped content {} from list {}.", content_id, list_id);
    Ok(())
}

pub async fn run_rename(config: &Config, id: u32, name: &str) -> Result<()> {
    let mut stores = Stores::load(config).await?;
    stores.lists.rename(id, name)?;
    stores.save(config).await?;
    println!("Renamed list {}.", id);
    Ok(())
}

/// Show one list, or every list of a user with `--user`.
pub async fn run_show(config: &Config, id: Option<u32>, user: Option<u32>, json: bool) -> Result<()> {
    let stores = Stores::load(config).await?;

    let ids = match (id, user) {
        (Some(id), _) => vec![id],
        (None, Some(user_id)) => {
            if stores.users.get_by_id(user_id).is_none() {
                bail!("user not found: {}", user_id);
            }
            stores.lists.by_user(user_id, usize::MAX)
        }
        (None, None) => bail!("pass a list id or --user <id>"),
    };

    let mut lists = Vec::with_capacity(ids.len());
    for list_id in ids {
        match stores.lists.get_by_id(list_id) {
            Some(list) => lists.push(list),
            None => bail!("list not found: {}", list_id),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    if lists.is_empty() {
        println!("No lists.");
        return Ok(());
    }

    for list in lists {
        println!(
            "List {} \"{}\" (user {}, {} items)",
            list.id,
            list.name,
            list.user_id,
            list.content_ids.len()
        );
        let rows: Vec<&Content> = list
            .content_ids
            .iter()
            .filter_map(|id| stores.contents.get_by_id(*id))
            .collect();
        if !rows.is_empty() {
            print_contents(&rows);
        }
        println!();
    }
    Ok(())
}
