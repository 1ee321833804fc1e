// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Entity repositories over the document store.
//!
//! Each entity type is stored as one JSON document per instance. List
//! operations load the full collection and filter in memory.

pub mod clients;
pub mod inquiries;
pub mod projects;
pub mod settings;
pub mod users;

pub use clients::{ClientFilter, ClientRepository, ClientSource, ClientStatus, StoredClient};
pub use inquiries::{
    InquiryFilter, InquiryRepository, InquirySource, InquiryStatus, Priority, StoredInquiry,
};
pub use projects::{Milestone, ProjectFilter, ProjectRepository, ProjectStatus, StoredProject};
pub use settings::{Settings, SettingsRepository};
pub use users::{StoredUser, UserFilter, UserRepository};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// A note attached to a client, inquiry or project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub content: String,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Slice a filtered collection into a page.
///
/// `page` is 1-based; returns the page plus the total item count before
/// pagination.
pub(crate) fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    let start = (page - 1) * limit;
    let page_items = items.into_iter().skip(start).take(limit).collect();
    (page_items, total)
}

/// Case-insensitive substring match helper for search filters.
pub(crate) fn matches_search(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_pages() {
        let items: Vec<i32> = (1..=25).collect();
        let (page, total) = paginate(items.clone(), 2, 10);
        assert_eq!(total, 25);
        assert_eq!(page, (11..=20).collect::<Vec<i32>>());

        let (page, total) = paginate(items.clone(), 3, 10);
        assert_eq!(total, 25);
        assert_eq!(page, (21..=25).collect::<Vec<i32>>());

        let (page, _) = paginate(items, 4, 10);
        assert!(page.is_empty());
    }

    #[test]
    fn paginate_clamps_page_and_limit() {
        let items: Vec<i32> = (1..=5).collect();
        let (page, total) = paginate(items.clone(), 0, 10);
        assert_eq!(total, 5);
        assert_eq!(page.len(), 5);

        let (page, _) = paginate(items, 1, 0);
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(matches_search("Acme Industries", "acme"));
        assert!(matches_search("jane.doe@example.com", "DOE"));
        assert!(!matches_search("Acme", "omega"));
    }
}
