// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inquiry repository for the document store.
//!
//! Inquiries arrive from the public contact form. Two timestamps are
//! derived from status transitions: `response_time` the first time the
//! status leaves `unread`, and `resolved_at` the first time it becomes
//! `resolved`. Both are set at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStore, StorageError, StorageResult};
use super::{matches_search, paginate, Note, SortOrder};

/// Processing status of an inquiry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Unread,
    Read,
    InProgress,
    Resolved,
    Closed,
}

impl Default for InquiryStatus {
    fn default() -> Self {
        InquiryStatus::Unread
    }
}

/// Priority shared by inquiries and projects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Channel the inquiry came in through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InquirySource {
    Website,
    Email,
    Phone,
    Referral,
    SocialMedia,
    Other,
}

impl Default for InquirySource {
    fn default() -> Self {
        InquirySource::Website
    }
}

/// Inquiry record as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredInquiry {
    pub id: String,
    pub name: String,
    /// Lowercase submitter email. Not unique across inquiries.
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default)]
    pub priority: Priority,
    pub category: String,
    #[serde(default)]
    pub source: InquirySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_archived: bool,
    /// Set once, the first time the status leaves `unread`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<DateTime<Utc>>,
    /// Set once, the first time the status becomes `resolved`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredInquiry {
    /// Apply a status change, deriving the transition timestamps.
    pub fn set_status(&mut self, status: InquiryStatus) {
        if self.status == InquiryStatus::Unread
            && status != InquiryStatus::Unread
            && self.response_time.is_none()
        {
            self.response_time = Some(Utc::now());
        }
        if status == InquiryStatus::Resolved && self.resolved_at.is_none() {
            self.resolved_at = Some(Utc::now());
        }
        self.status = status;
    }
}

/// Filter, sort and pagination parameters for inquiry listings.
#[derive(Debug, Clone)]
pub struct InquiryFilter {
    /// Substring match over name, email, company, subject and message.
    pub search: Option<String>,
    pub status: Option<InquiryStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl Default for InquiryFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            priority: None,
            category: None,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 10,
        }
    }
}

/// Repository for inquiry operations on the document store.
pub struct InquiryRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> InquiryRepository<'a> {
    /// Create a new InquiryRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if an inquiry exists.
    pub fn exists(&self, inquiry_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().inquiry(inquiry_id))
    }

    /// Get an inquiry by ID.
    pub fn get(&self, inquiry_id: &str) -> StorageResult<StoredInquiry> {
        let path = self.storage.paths().inquiry(inquiry_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Inquiry {inquiry_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new inquiry.
    pub fn create(&self, inquiry: &StoredInquiry) -> StorageResult<()> {
        if self.exists(&inquiry.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Inquiry {}",
                inquiry.id
            )));
        }

        self.storage
            .write_json(self.storage.paths().inquiry(&inquiry.id), inquiry)
    }

    /// Update an existing inquiry.
    pub fn update(&self, inquiry: &StoredInquiry) -> StorageResult<()> {
        if !self.exists(&inquiry.id) {
            return Err(StorageError::NotFound(format!("Inquiry {}", inquiry.id)));
        }

        self.storage
            .write_json(self.storage.paths().inquiry(&inquiry.id), inquiry)
    }

    /// Delete an inquiry.
    pub fn delete(&self, inquiry_id: &str) -> StorageResult<()> {
        if !self.exists(inquiry_id) {
            return Err(StorageError::NotFound(format!("Inquiry {inquiry_id}")));
        }
        self.storage
            .delete(self.storage.paths().inquiry(inquiry_id))
    }

    /// Count all inquiries.
    pub fn count(&self) -> StorageResult<usize> {
        Ok(self.list_ids()?.len())
    }

    /// List inquiries with filtering, sorting and pagination.
    pub fn list(&self, filter: &InquiryFilter) -> StorageResult<(Vec<StoredInquiry>, usize)> {
        let mut inquiries: Vec<StoredInquiry> = Vec::new();
        for id in self.list_ids()? {
            if let Ok(inquiry) = self.get(&id) {
                inquiries.push(inquiry);
            }
        }

        inquiries.retain(|i| {
            let search_ok = filter.search.as_deref().is_none_or(|s| {
                matches_search(&i.name, s)
                    || matches_search(&i.email, s)
                    || matches_search(&i.subject, s)
                    || matches_search(&i.message, s)
                    || i.company.as_deref().is_some_and(|v| matches_search(v, s))
            });
            search_ok
                && filter.status.is_none_or(|st| i.status == st)
                && filter.priority.is_none_or(|p| i.priority == p)
                && filter
                    .category
                    .as_deref()
                    .is_none_or(|c| i.category.eq_ignore_ascii_case(c))
        });

        sort_inquiries(&mut inquiries, &filter.sort_by, filter.sort_order);
        Ok(paginate(inquiries, filter.page, filter.limit))
    }

    fn list_ids(&self) -> StorageResult<Vec<String>> {
        self.storage
            .list_files(self.storage.paths().inquiries_dir(), "json")
    }
}

fn sort_inquiries(inquiries: &mut [StoredInquiry], sort_by: &str, order: SortOrder) {
    inquiries.sort_by(|a, b| {
        let ord = match sort_by {
            "name" => a.name.cmp(&b.name),
            "email" => a.email.cmp(&b.email),
            "subject" => a.subject.cmp(&b.subject),
            _ => a.created_at.cmp(&b.created_at),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path());
        let mut storage = DocumentStore::new(paths);
        storage.initialize().expect("Failed to initialize");
        (temp, storage)
    }

    pub(crate) fn test_inquiry(id: &str) -> StoredInquiry {
        StoredInquiry {
            id: id.to_string(),
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: None,
            company: Some("Navy Labs".to_string()),
            subject: "Compiler consulting".to_string(),
            message: "We need help building a compiler.".to_string(),
            status: InquiryStatus::default(),
            priority: Priority::default(),
            category: "consulting".to_string(),
            source: InquirySource::default(),
            assigned_to: None,
            notes: Vec::new(),
            tags: Vec::new(),
            is_archived: false,
            response_time: None,
            resolved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_get_inquiry() {
        let (_temp, storage) = test_storage();
        let repo = InquiryRepository::new(&storage);

        let inquiry = test_inquiry("i-1");
        repo.create(&inquiry).unwrap();

        let loaded = repo.get("i-1").unwrap();
        assert_eq!(loaded.status, InquiryStatus::Unread);
        assert_eq!(loaded.priority, Priority::Medium);
        assert_eq!(loaded.source, InquirySource::Website);
    }

    #[test]
    fn status_transition_sets_response_time_once() {
        let mut inquiry = test_inquiry("i-1");
        assert!(inquiry.response_time.is_none());

        inquiry.set_status(InquiryStatus::Read);
        let first = inquiry.response_time;
        assert!(first.is_some());

        inquiry.set_status(InquiryStatus::InProgress);
        assert_eq!(inquiry.response_time, first);
    }

    #[test]
    fn status_transition_sets_resolved_at_once() {
        let mut inquiry = test_inquiry("i-1");

        inquiry.set_status(InquiryStatus::Resolved);
        let first = inquiry.resolved_at;
        assert!(first.is_some());
        assert!(inquiry.response_time.is_some());

        inquiry.set_status(InquiryStatus::Closed);
        inquiry.set_status(InquiryStatus::Resolved);
        assert_eq!(inquiry.resolved_at, first);
    }

    #[test]
    fn list_filters_by_status_and_priority() {
        let (_temp, storage) = test_storage();
        let repo = InquiryRepository::new(&storage);

        let mut urgent = test_inquiry("i-1");
        urgent.priority = Priority::Urgent;
        repo.create(&urgent).unwrap();

        let mut read = test_inquiry("i-2");
        read.set_status(InquiryStatus::Read);
        repo.create(&read).unwrap();

        let (items, total) = repo
            .list(&InquiryFilter {
                priority: Some(Priority::Urgent),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, "i-1");

        let (items, total) = repo
            .list(&InquiryFilter {
                status: Some(InquiryStatus::Read),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, "i-2");
    }

    #[test]
    fn list_search_matches_subject_and_message() {
        let (_temp, storage) = test_storage();
        let repo = InquiryRepository::new(&storage);

        repo.create(&test_inquiry("i-1")).unwrap();
        let mut other = test_inquiry("i-2");
        other.subject = "Website redesign".to_string();
        other.message = "Landing page refresh".to_string();
        repo.create(&other).unwrap();

        let (items, total) = repo
            .list(&InquiryFilter {
                search: Some("compiler".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, "i-1");
    }

    #[test]
    fn delete_missing_inquiry_fails() {
        let (_temp, storage) = test_storage();
        let repo = InquiryRepository::new(&storage);
        assert!(matches!(
            repo.delete("ghost"),
            Err(StorageError::NotFound(_))
        ));
    }
}
