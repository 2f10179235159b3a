//! `srec recommend`: print a user's recommendations.

use anyhow::{bail, Result};
use serde::Serialize;

use streamrec_core::recommend::{Recommendation, RecommendationEngine, Strategy};

use crate::config::Config;
use crate::persist::Stores;

/// Rank positions a content held in each list the blend combined.
#[derive(Debug, Clone, Serialize)]
pub struct BlendExplanation {
    pub similarity_rank: Option<usize>,
    pub category_rank: Option<usize>,
    pub popularity_rank: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedItem {
    pub rank: usize,
    pub content_id: u32,
    pub title: String,
    pub category: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<BlendExplanation>,
}

/// Compute recommendations and attach display fields. Contents are looked
/// up after ranking, so every returned id exists in the catalog.
pub fn recommend_items(
    stores: &Stores,
    strategy: Strategy,
    user_id: u32,
    limit: usize,
    explain: bool,
) -> Vec<RecommendedItem> {
    let engine = RecommendationEngine::new(&stores.contents, &stores.users);
    let ranked: Vec<Recommendation> = engine.recommend(strategy, user_id, limit);

    let blend_inputs = if explain && strategy == Strategy::Personalized {
        Some((
            engine.content_similarity(user_id, limit),
            engine.category_affinity(user_id, limit),
            engine.popularity(limit),
        ))
    } else {
        None
    };

    ranked
        .iter()
        .enumerate()
        .filter_map(|(i, rec)| {
            let content = stores.contents.get_by_id(rec.content_id)?;
            let explain = blend_inputs
                .as_ref()
                .map(|(similar, by_category, popular)| BlendExplanation {
                    similarity_rank: rank_of(similar, rec.content_id),
                    category_rank: rank_of(by_category, rec.content_id),
                    popularity_rank: rank_of(popular, rec.content_id),
                });
            Some(RecommendedItem {
                rank: i + 1,
                content_id: rec.content_id,
                title: content.title.clone(),
                category: content.category.clone(),
                score: rec.score,
                explain,
            })
        })
        .collect()
}

pub async fn run_recommend(
    config: &Config,
    user_id: u32,
    strategy: Option<String>,
    limit: Option<usize>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let strategy: Strategy = strategy
        .as_deref()
        .unwrap_or(config.recommendation.default_strategy.as_str())
        .parse()?;
    let limit = limit.unwrap_or(config.recommendation.max_recommendations);
    if limit == 0 {
        bail!("--limit must be >= 1");
    }

    let stores = Stores::load(config).await?;
    if strategy != Strategy::Popularity && stores.users.get_by_id(user_id).is_none() {
        bail!("user not found: {}", user_id);
    }

    let items = recommend_items(&stores, strategy, user_id, limit, explain);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No recommendations.");
        return Ok(());
    }

    if explain {
        println!(
            "Recommend: strategy={}, user={}, limit={}",
            strategy, user_id, limit
        );
        println!();
    }

    for item in &items {
        println!(
            "{}. [{:.3}] {} / {}",
            item.rank, item.score, item.category, item.title
        );
        if let Some(ref ex) = item.explain {
            println!(
                "    ranks: similarity={}  category={}  popularity={}  → blend={:.3}",
                format_rank(ex.similarity_rank),
                format_rank(ex.category_rank),
                format_rank(ex.popularity_rank),
                item.score
            );
        }
        println!("    id: {}", item.content_id);
    }

    Ok(())
}

fn rank_of(list: &[u32], content_id: u32) -> Option<usize> {
    list.iter().position(|id| *id == content_id).map(|i| i + 1)
}

fn format_rank(rank: Option<usize>) -> String {
    match rank {
        Some(r) => format!("#{}", r),
        None => "-".to_string(),
    }
}
