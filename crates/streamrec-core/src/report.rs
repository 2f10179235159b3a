//! Statistical reports over the catalog and the interaction log.
//!
//! Every report is sorted by its count (desc) before truncation. Ties are
//! ordered by ascending id, or by first-seen order for categories.

use serde::Serialize;

use crate::store::{ContentStore, UserInteractionStore};
use crate::tabular;

/// A content with an associated count (views or interactions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentReportItem {
    pub content_id: u32,
    pub title: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReportItem {
    pub category: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReportItem {
    pub user_id: u32,
    pub username: String,
    pub interactions: u32,
}

/// Contents with the most views.
pub fn most_viewed_contents(contents: &ContentStore, limit: usize) -> Vec<ContentReportItem> {
    let mut items: Vec<ContentReportItem> = contents
        .iter()
        .map(|c| ContentReportItem {
            content_id: c.id,
            title: c.title.clone(),
            count: c.views,
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then(a.content_id.cmp(&b.content_id)));
    items.truncate(limit);
    items
}

/// Categories by total views of their contents.
pub fn most_popular_categories(contents: &ContentStore, limit: usize) -> Vec<CategoryReportItem> {
    let mut items: Vec<CategoryReportItem> = Vec::new();
    for content in contents.iter() {
        match items.iter_mut().find(|i| i.category == content.category) {
            Some(item) => item.views += u64::from(content.views),
            None => items.push(CategoryReportItem {
                category: content.category.clone(),
                views: u64::from(content.views),
            }),
        }
    }
    items.sort_by(|a, b| b.views.cmp(&a.views));
    items.truncate(limit);
    items
}

/// Users by their maintained interaction counter.
pub fn most_active_users(users: &UserInteractionStore, limit: usize) -> Vec<UserReportItem> {
    let mut items: Vec<UserReportItem> = users
        .users()
        .map(|u| UserReportItem {
            user_id: u.id,
            username: u.username.clone(),
            interactions: u.interaction_count,
        })
        .collect();
    items.sort_by(|a, b| {
        b.interactions
            .cmp(&a.interactions)
            .then(a.user_id.cmp(&b.user_id))
    });
    items.truncate(limit);
    items
}

/// How many times the user interacted with each content still in the
/// catalog. Returns nothing for an unknown user.
pub fn user_interactions(
    users: &UserInteractionStore,
    contents: &ContentStore,
    user_id: u32,
    limit: usize,
) -> Vec<ContentReportItem> {
    if users.get_by_id(user_id).is_none() {
        return Vec::new();
    }

    let mut items: Vec<ContentReportItem> = Vec::new();
    for interaction in users.interactions_for(user_id) {
        if let Some(item) = items
            .iter_mut()
            .find(|i| i.content_id == interaction.content_id)
        {
            item.count += 1;
            continue;
        }
        if let Some(content) = contents.get_by_id(interaction.content_id) {
            items.push(ContentReportItem {
                content_id: content.id,
                title: content.title.clone(),
                count: 1,
            });
        }
    }
    items.sort_by(|a, b| b.count.cmp(&a.count).then(a.content_id.cmp(&b.content_id)));
    items.truncate(limit);
    items
}

/// Render a report as CSV text: a header line followed by one line per row.
pub fn export_csv<R: AsRef<[String]>>(headers: &[&str], rows: &[R]) -> csv::Result<String> {
    tabular::encode_table(headers, rows)
}

impl ContentReportItem {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.content_id.to_string(),
            self.title.clone(),
            self.count.to_string(),
        ]
    }
}

impl CategoryReportItem {
    pub fn to_row(&self) -> Vec<String> {
        vec![self.category.clone(), self.views.to_string()]
    }
}

impl UserReportItem {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.username.clone(),
            self.interactions.to_string(),
        ]
    }
}
