//! Recommendation engine with popularity, content-similarity,
//! category-affinity, and personalized (blended) strategies.
//!
//! The engine borrows both stores immutably and never mutates them, so a
//! store cannot change while a recommendation is being computed.
//!
//! # Strategies
//!
//! - **Popularity**: score = `views`.
//! - **Similarity**: average [`similarity`] between each candidate and the
//!   user's watched set (contents with a COMPLETE interaction).
//! - **Category**: categories from the user's PLAY/COMPLETE history ranked
//!   by frequency; a candidate scores
//!   `(rank_count − rank_index) + count[rank_index] / count[0]`.
//! - **Personalized**: rank blend of the three lists above.
//!
//! Similarity and category fall back to popularity when the user has no
//! qualifying history. Both exclude candidates for which
//! [`UserInteractionStore::has_watched`] holds.
//!
//! # Blend Algorithm
//!
//! 1. Run similarity, category, and popularity with the same cap.
//! 2. An item at rank `i` of a list of length `L` with weight `w`
//!    contributes `w × (L − i) / L`; weights are 3, 2, and 1.
//! 3. Sum contributions per content id.
//! 4. Sort by score (desc), id (asc).
//! 5. Truncate to the cap.
//!
//! Equal scores are always ordered by ascending content id.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::models::{Content, InteractionType};
use crate::store::{ContentStore, UserInteractionStore};

/// Default number of recommendations returned per call.
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 10;

const CATEGORY_WEIGHT: f64 = 0.6;
const AGE_WEIGHT: f64 = 0.2;
const DURATION_WEIGHT: f64 = 0.2;
const AGE_NORMALIZER: f64 = 18.0;

const BLEND_SIMILARITY_WEIGHT: f64 = 3.0;
const BLEND_CATEGORY_WEIGHT: f64 = 2.0;
const BLEND_POPULARITY_WEIGHT: f64 = 1.0;

/// Which ranking to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Popularity,
    Similarity,
    Category,
    Personalized,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Popularity => "popularity",
            Strategy::Similarity => "similarity",
            Strategy::Category => "category",
            Strategy::Personalized => "personalized",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown strategy: {0}. Use popularity, similarity, category, or personalized.")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popularity" | "popular" => Ok(Strategy::Popularity),
            "similarity" | "similar" => Ok(Strategy::Similarity),
            "category" => Ok(Strategy::Category),
            "personalized" | "personal" => Ok(Strategy::Personalized),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// A ranked content id with the score that placed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub content_id: u32,
    pub score: f64,
}

/// Read-only view over both stores that computes rankings.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine<'a> {
    contents: &'a ContentStore,
    users: &'a UserInteractionStore,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(contents: &'a ContentStore, users: &'a UserInteractionStore) -> Self {
        Self { contents, users }
    }

    /// Dispatch to the ranking for `strategy`.
    ///
    /// `user_id` is ignored by [`Strategy::Popularity`].
    pub fn recommend(&self, strategy: Strategy, user_id: u32, max: usize) -> Vec<Recommendation> {
        let ranked = match strategy {
            Strategy::Popularity => self.popularity_scored(max),
            Strategy::Similarity => self.content_similarity_scored(user_id, max),
            Strategy::Category => self.category_affinity_scored(user_id, max),
            Strategy::Personalized => self.personalized_scored(user_id, max),
        };
        debug!(strategy = %strategy, user_id, count = ranked.len(), "recommendations computed");
        ranked
    }

    pub fn popularity(&self, max: usize) -> Vec<u32> {
        ids(self.popularity_scored(max))
    }

    pub fn popularity_scored(&self, max: usize) -> Vec<Recommendation> {
        let scores = self
            .contents
            .iter()
            .map(|c| Recommendation {
                content_id: c.id,
                score: f64::from(c.views),
            })
            .collect();
        rank(scores, max)
    }

    pub fn content_similarity(&self, user_id: u32, max: usize) -> Vec<u32> {
        ids(self.content_similarity_scored(user_id, max))
    }

    pub fn content_similarity_scored(&self, user_id: u32, max: usize) -> Vec<Recommendation> {
        if user_id == 0 || max == 0 {
            return Vec::new();
        }

        let watched_ids = self.watched_set(user_id);
        if watched_ids.is_empty() {
            return self.popularity_scored(max);
        }

        // Deleted contents stay in the divisor but contribute nothing.
        let watched: Vec<Option<&Content>> = watched_ids
            .iter()
            .map(|id| self.contents.get_by_id(*id))
            .collect();
        let divisor = watched.len() as f64;

        let scores = self
            .contents
            .iter()
            .filter(|candidate| !self.has_watched(user_id, candidate.id))
            .map(|candidate| {
                let total: f64 = watched
                    .iter()
                    .flatten()
                    .map(|w| similarity(w, candidate))
                    .sum();
                Recommendation {
                    content_id: candidate.id,
                    score: total / divisor,
                }
            })
            .collect();
        rank(scores, max)
    }

    pub fn category_affinity(&self, user_id: u32, max: usize) -> Vec<u32> {
        ids(self.category_affinity_scored(user_id, max))
    }

    pub fn category_affinity_scored(&self, user_id: u32, max: usize) -> Vec<Recommendation> {
        if user_id == 0 || max == 0 {
            return Vec::new();
        }

        let ranked_categories = self.category_ranking(user_id);
        if ranked_categories.is_empty() {
            return self.popularity_scored(max);
        }

        let rank_count = ranked_categories.len() as f64;
        let top_count = f64::from(ranked_categories[0].1.max(1));
        let position: HashMap<&str, (usize, u32)> = ranked_categories
            .iter()
            .enumerate()
            .map(|(idx, (name, count))| (*name, (idx, *count)))
            .collect();

        let scores = self
            .contents
            .iter()
            .filter(|c| !self.has_watched(user_id, c.id))
            .filter_map(|c| {
                let (idx, count) = position.get(c.category.as_str())?;
                Some(Recommendation {
                    content_id: c.id,
                    score: (rank_count - *idx as f64) + f64::from(*count) / top_count,
                })
            })
            .collect();
        rank(scores, max)
    }

    pub fn personalized(&self, user_id: u32, max: usize) -> Vec<u32> {
        ids(self.personalized_scored(user_id, max))
    }

    pub fn personalized_scored(&self, user_id: u32, max: usize) -> Vec<Recommendation> {
        if user_id == 0 || max == 0 {
            return Vec::new();
        }

        let similar = self.content_similarity(user_id, max);
        let by_category = self.category_affinity(user_id, max);
        let popular = self.popularity(max);

        let mut blended: HashMap<u32, f64> = HashMap::new();
        for (list, weight) in [
            (&similar, BLEND_SIMILARITY_WEIGHT),
            (&by_category, BLEND_CATEGORY_WEIGHT),
            (&popular, BLEND_POPULARITY_WEIGHT),
        ] {
            for (id, contribution) in rank_contributions(list, weight) {
                *blended.entry(id).or_insert(0.0) += contribution;
            }
        }

        let scores = blended
            .into_iter()
            .map(|(content_id, score)| Recommendation { content_id, score })
            .collect();
        rank(scores, max)
    }

    /// True if the user has a PLAY or COMPLETE interaction with the content.
    pub fn has_watched(&self, user_id: u32, content_id: u32) -> bool {
        self.users.has_watched(user_id, content_id)
    }

    /// Distinct content ids the user has COMPLETE interactions with, in
    /// first-seen order.
    pub fn watched_set(&self, user_id: u32) -> Vec<u32> {
        let mut watched = Vec::new();
        for interaction in self.users.interactions_for(user_id) {
            if interaction.kind == InteractionType::Complete
                && !watched.contains(&interaction.content_id)
            {
                watched.push(interaction.content_id);
            }
        }
        watched
    }

    /// Categories of the user's PLAY/COMPLETE history with their counts,
    /// by descending count and then first-seen order. Interactions with
    /// contents no longer in the catalog are skipped.
    pub fn category_ranking(&self, user_id: u32) -> Vec<(&'a str, u32)> {
        let contents = self.contents;
        let mut tally: Vec<(&'a str, u32)> = Vec::new();
        for interaction in self.users.interactions_for(user_id) {
            if !interaction.kind.is_viewing() {
                continue;
            }
            let Some(content) = contents.get_by_id(interaction.content_id) else {
                continue;
            };
            match tally.iter_mut().find(|(name, _)| *name == content.category) {
                Some((_, count)) => *count += 1,
                None => tally.push((content.category.as_str(), 1)),
            }
        }
        // Stable sort keeps first-seen order among equal counts.
        tally.sort_by(|a, b| b.1.cmp(&a.1));
        tally
    }
}

/// Similarity between two contents.
///
/// `0.6·[same category] + 0.2·(1 − |Δage| / 18) + 0.2·(1 − |Δduration| / max(duration))`.
/// The duration term is skipped when both durations are zero. The result is
/// not clamped: large age or duration gaps push their terms below zero.
pub fn similarity(a: &Content, b: &Content) -> f64 {
    let mut score = 0.0;

    if a.category == b.category {
        score += CATEGORY_WEIGHT;
    }

    let age_diff = f64::from(a.age_rating.abs_diff(b.age_rating));
    score += AGE_WEIGHT * (1.0 - age_diff / AGE_NORMALIZER);

    let max_duration = a.duration.max(b.duration);
    if max_duration > 0 {
        let duration_diff = f64::from(a.duration.abs_diff(b.duration));
        score += DURATION_WEIGHT * (1.0 - duration_diff / f64::from(max_duration));
    }

    score
}

/// Blend contributions for a ranked id list: `weight × (len − i) / len`.
fn rank_contributions(list: &[u32], weight: f64) -> impl Iterator<Item = (u32, f64)> + '_ {
    let len = list.len() as f64;
    list.iter()
        .enumerate()
        .map(move |(i, id)| (*id, weight * (len - i as f64) / len))
}

/// Sort by score (desc), then id (asc), and keep the first `max`.
fn rank(mut scores: Vec<Recommendation>, max: usize) -> Vec<Recommendation> {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.content_id.cmp(&b.content_id))
    });
    scores.truncate(max);
    scores
}

fn ids(ranked: Vec<Recommendation>) -> Vec<u32> {
    ranked.into_iter().map(|r| r.content_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(id: u32, category: &str, duration: u32, age_rating: u32) -> Content {
        Content {
            id,
            title: format!("content {}", id),
            category: category.to_string(),
            duration,
            age_rating,
            views: 0,
        }
    }

    fn add_with_views(
        store: &mut ContentStore,
        category: &str,
        duration: u32,
        age_rating: u32,
        views: u32,
    ) -> u32 {
        let id = store
            .add(&format!("{} {}", category, store.len() + 1), category, duration, age_rating)
            .unwrap();
        for _ in 0..views {
            store.increment_views(id).unwrap();
        }
        id
    }

    /// 1 Action (watched), 2 Action, 3 Comedy, 4 Drama; views 0/5/50/10.
    fn blend_fixture() -> (ContentStore, UserInteractionStore, u32) {
        let mut contents = ContentStore::new();
        add_with_views(&mut contents, "Action", 120, 16, 0);
        add_with_views(&mut contents, "Action", 110, 14, 5);
        add_with_views(&mut contents, "Comedy", 100, 12, 50);
        add_with_views(&mut contents, "Drama", 90, 12, 10);

        let mut users = UserInteractionStore::new();
        let user = users.add_user("ana").unwrap();
        users
            .register_interaction(user, 1, InteractionType::Complete)
            .unwrap();
        (contents, users, user)
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Popularity".parse::<Strategy>(), Ok(Strategy::Popularity));
        assert_eq!("similarity".parse::<Strategy>(), Ok(Strategy::Similarity));
        assert_eq!("category".parse::<Strategy>(), Ok(Strategy::Category));
        assert_eq!(
            "personalized".parse::<Strategy>(),
            Ok(Strategy::Personalized)
        );
        assert!("random".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_popularity_orders_by_views() {
        let mut contents = ContentStore::new();
        let id1 = add_with_views(&mut contents, "A", 90, 0, 10);
        let id2 = add_with_views(&mut contents, "A", 90, 0, 20);
        add_with_views(&mut contents, "A", 90, 0, 5);
        let id4 = add_with_views(&mut contents, "A", 90, 0, 15);
        let users = UserInteractionStore::new();

        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(engine.popularity(3), vec![id2, id4, id1]);
        assert!(engine.popularity(0).is_empty());
    }

    #[test]
    fn test_popularity_ties_break_by_ascending_id() {
        let mut contents = ContentStore::new();
        add_with_views(&mut contents, "A", 90, 0, 3);
        add_with_views(&mut contents, "A", 90, 0, 7);
        add_with_views(&mut contents, "A", 90, 0, 3);
        add_with_views(&mut contents, "A", 90, 0, 7);
        let users = UserInteractionStore::new();

        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(engine.popularity(10), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_similarity_prefers_same_category() {
        let a1 = content(1, "Action", 120, 16);
        let a2 = content(2, "Action", 110, 14);
        let c = content(3, "Comedy", 100, 12);

        let same = similarity(&a1, &a2);
        let other = similarity(&a1, &c);
        assert!(same > other);
        assert!((same - (0.6 + 0.2 * (1.0 - 2.0 / 18.0) + 0.2 * (1.0 - 10.0 / 120.0))).abs() < 1e-9);
        assert!((other - (0.2 * (1.0 - 4.0 / 18.0) + 0.2 * (1.0 - 20.0 / 120.0))).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_symmetric_and_maximal_for_identical() {
        let a = content(1, "Drama", 95, 12);
        let b = content(2, "Horror", 130, 18);
        assert!((similarity(&a, &b) - similarity(&b, &a)).abs() < 1e-9);
        assert!((similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_not_clamped() {
        let a = content(1, "Drama", 10, 0);
        let b = content(2, "Horror", 100, 36);
        let score = similarity(&a, &b);
        assert!((score - (-0.2 + 0.2 * 0.1)).abs() < 1e-9);
        assert!(score < 0.0);
    }

    #[test]
    fn test_similarity_skips_zero_durations() {
        let a = content(1, "Drama", 0, 10);
        let b = content(2, "Drama", 0, 10);
        assert!((similarity(&a, &b) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_content_similarity_without_completions_falls_back_to_popularity() {
        let (contents, mut users, _) = blend_fixture();
        let fresh = users.add_user("bruno").unwrap();
        users
            .register_interaction(fresh, 2, InteractionType::Play)
            .unwrap();

        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(engine.content_similarity(fresh, 3), engine.popularity(3));
        assert_eq!(engine.content_similarity(fresh, 3), vec![3, 4, 2]);
    }

    #[test]
    fn test_content_similarity_ranks_unwatched() {
        let (contents, users, user) = blend_fixture();
        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(engine.content_similarity(user, 10), vec![2, 3, 4]);
        assert!(engine.content_similarity(0, 10).is_empty());
    }

    #[test]
    fn test_content_similarity_excludes_played_content() {
        let (contents, mut users, user) = blend_fixture();
        users
            .register_interaction(user, 2, InteractionType::Play)
            .unwrap();
        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(engine.content_similarity(user, 10), vec![3, 4]);
    }

    #[test]
    fn test_content_similarity_counts_deleted_watched_in_divisor() {
        let (mut contents, mut users, user) = blend_fixture();
        let gone = add_with_views(&mut contents, "Western", 60, 0, 0);
        users
            .register_interaction(user, gone, InteractionType::Complete)
            .unwrap();
        contents.remove(gone).unwrap();

        let engine = RecommendationEngine::new(&contents, &users);
        let ranked = engine.content_similarity_scored(user, 1);
        let expected = similarity(
            contents.get_by_id(1).unwrap(),
            contents.get_by_id(2).unwrap(),
        ) / 2.0;
        assert_eq!(ranked[0].content_id, 2);
        assert!((ranked[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_category_affinity_scores_by_rank() {
        let mut contents = ContentStore::new();
        for (category, views) in [
            ("Action", 0),
            ("Action", 0),
            ("Comedy", 0),
            ("Action", 1),
            ("Comedy", 9),
            ("Drama", 99),
        ] {
            add_with_views(&mut contents, category, 90, 12, views);
        }
        let mut users = UserInteractionStore::new();
        let user = users.add_user("ana").unwrap();
        users.register_interaction(user, 1, InteractionType::Play).unwrap();
        users
            .register_interaction(user, 2, InteractionType::Complete)
            .unwrap();
        users.register_interaction(user, 3, InteractionType::Play).unwrap();
        users.register_interaction(user, 6, InteractionType::Pause).unwrap();

        let engine = RecommendationEngine::new(&contents, &users);
        let ranked = engine.category_affinity_scored(user, 10);
        let ids: Vec<u32> = ranked.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![4, 5]);
        assert!((ranked[0].score - 3.0).abs() < 1e-9);
        assert!((ranked[1].score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_category_ranking_ties_keep_first_seen_order() {
        let mut contents = ContentStore::new();
        add_with_views(&mut contents, "Comedy", 90, 0, 0);
        add_with_views(&mut contents, "Action", 90, 0, 0);
        add_with_views(&mut contents, "Action", 90, 0, 0);
        add_with_views(&mut contents, "Comedy", 90, 0, 0);
        let mut users = UserInteractionStore::new();
        let user = users.add_user("ana").unwrap();
        users.register_interaction(user, 1, InteractionType::Play).unwrap();
        users.register_interaction(user, 2, InteractionType::Play).unwrap();

        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(
            engine.category_ranking(user),
            vec![("Comedy", 1), ("Action", 1)]
        );
        assert_eq!(engine.category_affinity(user, 10), vec![4, 3]);
    }

    #[test]
    fn test_category_affinity_skips_deleted_and_falls_back() {
        let mut contents = ContentStore::new();
        add_with_views(&mut contents, "Action", 90, 0, 1);
        add_with_views(&mut contents, "Comedy", 90, 0, 2);
        let mut users = UserInteractionStore::new();
        let user = users.add_user("ana").unwrap();
        users.register_interaction(user, 1, InteractionType::Play).unwrap();
        contents.remove(1).unwrap();

        let engine = RecommendationEngine::new(&contents, &users);
        assert!(engine.category_ranking(user).is_empty());
        assert_eq!(engine.category_affinity(user, 5), engine.popularity(5));
    }

    #[test]
    fn test_personalized_blend() {
        let (contents, users, user) = blend_fixture();
        let engine = RecommendationEngine::new(&contents, &users);

        let ranked = engine.personalized_scored(user, 3);
        let ids: Vec<u32> = ranked.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!((ranked[0].score - (3.0 + 2.0 + 1.0 / 3.0)).abs() < 1e-9);
        assert!((ranked[1].score - (2.0 + 1.0)).abs() < 1e-9);
        assert!((ranked[2].score - (1.0 + 2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_personalized_with_empty_sub_list() {
        // The only Action title is already completed, so the category list
        // is empty but does not fall back to popularity.
        let mut contents = ContentStore::new();
        add_with_views(&mut contents, "Action", 120, 16, 10);
        add_with_views(&mut contents, "Comedy", 100, 12, 0);
        let mut users = UserInteractionStore::new();
        let user = users.add_user("ana").unwrap();
        users
            .register_interaction(user, 1, InteractionType::Complete)
            .unwrap();
        let engine = RecommendationEngine::new(&contents, &users);

        assert!(engine.category_affinity(user, 10).is_empty());
        assert_eq!(engine.content_similarity(user, 10), vec![2]);
        assert_eq!(engine.popularity(10), vec![1, 2]);

        let ranked = engine.personalized_scored(user, 10);
        let ids: Vec<u32> = ranked.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!((ranked[0].score - 3.5).abs() < 1e-9);
        assert!((ranked[1].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_personalized_only_contains_sub_list_items() {
        let (contents, users, user) = blend_fixture();
        let engine = RecommendationEngine::new(&contents, &users);

        let similar = engine.content_similarity(user, 2);
        let by_category = engine.category_affinity(user, 2);
        let popular = engine.popularity(2);
        for id in engine.personalized(user, 2) {
            assert!(
                similar.contains(&id) || by_category.contains(&id) || popular.contains(&id),
                "{} is not in any sub-list",
                id
            );
        }
        assert!(engine.personalized(user, 0).is_empty());
        assert!(engine.personalized(0, 5).is_empty());
    }

    #[test]
    fn test_recommend_dispatches() {
        let (contents, users, user) = blend_fixture();
        let engine = RecommendationEngine::new(&contents, &users);
        let popular: Vec<u32> = engine
            .recommend(Strategy::Popularity, user, 2)
            .into_iter()
            .map(|r| r.content_id)
            .collect();
        assert_eq!(popular, engine.popularity(2));
        assert_eq!(
            engine.recommend(Strategy::Category, user, 5).len(),
            engine.category_affinity(user, 5).len()
        );
    }

    #[test]
    fn test_watched_set_is_distinct_completions() {
        let (contents, mut users, user) = blend_fixture();
        users
            .register_interaction(user, 3, InteractionType::Play)
            .unwrap();
        users
            .register_interaction(user, 1, InteractionType::Complete)
            .unwrap();
        let engine = RecommendationEngine::new(&contents, &users);
        assert_eq!(engine.watched_set(user), vec![1]);
        assert!(engine.has_watched(user, 3));
        assert!(!engine.has_watched(user, 4));
    }
}
