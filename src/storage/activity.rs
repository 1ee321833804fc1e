// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Activity logging for privileged actions.
//!
//! Mutating handlers append an entry after the primary write commits.
//! Entries are immutable: no update or delete operation exists on this
//! store. A failed log write never rolls back the triggering operation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DocumentStore, StorageError, StorageResult};

/// Severity of a logged action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Low
    }
}

/// Category of a logged action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Auth,
    User,
    Inquiry,
    Client,
    Project,
    System,
    Settings,
}

/// An activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Unique entry ID.
    pub id: String,
    /// User who performed the action.
    pub actor_id: String,
    /// Action code, e.g. `UPDATE_USER`.
    pub action: String,
    /// Resource type affected, e.g. `user`, `client`.
    pub resource: String,
    /// Affected resource id, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Severity of the action.
    #[serde(default)]
    pub severity: Severity,
    /// Category of the action.
    pub category: Category,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Create a new entry with default (low) severity and no resource id.
    pub fn new(
        actor_id: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor_id.into(),
            action: action.into(),
            resource: resource.into(),
            resource_id: None,
            description: description.into(),
            severity: Severity::Low,
            category,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Set the affected resource id.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add free-form metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Filter for activity log queries.
#[derive(Debug, Default, Clone)]
pub struct ActivityFilter {
    pub actor_id: Option<String>,
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// Repository for activity entries.
pub struct ActivityLog<'a> {
    storage: &'a DocumentStore,
}

impl<'a> ActivityLog<'a> {
    /// Create a new activity log over the given store.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Append an entry to the current day's log file (JSONL format).
    pub fn record(&self, entry: &ActivityEntry) -> StorageResult<()> {
        let date = entry.created_at.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().activity_day_file(&date);

        let mut line = serde_json::to_string(entry).map_err(|e| {
            StorageError::SerializationError(format!("Failed to serialize activity entry: {e}"))
        })?;
        line.push('\n');

        self.storage.append_raw(&path, line.as_bytes())
    }

    /// Read all entries for a specific date.
    pub fn read_day(&self, date: &str) -> StorageResult<Vec<ActivityEntry>> {
        let path = self.storage.paths().activity_day_file(date);
        if !self.storage.exists(&path) {
            return Ok(Vec::new());
        }

        let content = self.storage.read_raw(&path)?;
        let content = String::from_utf8(content).map_err(|e| {
            StorageError::SerializationError(format!("Invalid UTF-8 in activity log: {e}"))
        })?;

        let mut entries = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: ActivityEntry = serde_json::from_str(line).map_err(|e| {
                StorageError::SerializationError(format!(
                    "Failed to deserialize activity entry: {e}"
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read entries for an inclusive date range.
    pub fn read_range(&self, start_date: &str, end_date: &str) -> StorageResult<Vec<ActivityEntry>> {
        let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").map_err(|e| {
            StorageError::SerializationError(format!("Invalid start date: {e}"))
        })?;
        let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d").map_err(|e| {
            StorageError::SerializationError(format!("Invalid end date: {e}"))
        })?;

        let mut all = Vec::new();
        let mut current = start;
        while current <= end {
            let date_str = current.format("%Y-%m-%d").to_string();
            all.extend(self.read_day(&date_str)?);
            current = current
                .succ_opt()
                .ok_or_else(|| StorageError::SerializationError("Date overflow".to_string()))?;
        }

        Ok(all)
    }

    /// Query a date range with filters and offset/limit pagination.
    ///
    /// Returns the page of entries plus the total match count before
    /// pagination was applied.
    pub fn query(
        &self,
        start_date: &str,
        end_date: &str,
        filter: &ActivityFilter,
    ) -> StorageResult<(Vec<ActivityEntry>, usize)> {
        let mut entries: Vec<ActivityEntry> = self
            .read_range(start_date, end_date)?
            .into_iter()
            .filter(|e| {
                filter
                    .actor_id
                    .as_deref()
                    .is_none_or(|actor| e.actor_id == actor)
                    && filter.category.is_none_or(|c| e.category == c)
                    && filter.severity.is_none_or(|s| e.severity == s)
            })
            .collect();

        // Newest first
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = entries.len();
        let page: Vec<ActivityEntry> = entries
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(100))
            .collect();

        Ok((page, total))
    }
}

/// Append an entry, logging (but swallowing) failures.
///
/// Mutating handlers call this after the primary write has committed; the
/// primary operation must not fail because the log write did.
pub fn log_activity(storage: &DocumentStore, entry: ActivityEntry) {
    let log = ActivityLog::new(storage);
    if let Err(e) = log.record(&entry) {
        tracing::warn!(action = %entry.action, error = %e, "failed to write activity entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path());
        let mut storage = DocumentStore::new(paths);
        storage.initialize().unwrap();
        (temp, storage)
    }

    #[test]
    fn builder_sets_fields() {
        let entry = ActivityEntry::new("u-1", "CREATE_USER", "user", "Created new user", Category::User)
            .with_resource_id("u-2")
            .with_severity(Severity::Medium)
            .with_metadata(serde_json::json!({"role": "staff"}));

        assert_eq!(entry.actor_id, "u-1");
        assert_eq!(entry.action, "CREATE_USER");
        assert_eq!(entry.resource_id, Some("u-2".to_string()));
        assert_eq!(entry.severity, Severity::Medium);
        assert_eq!(entry.category, Category::User);
    }

    #[test]
    fn default_severity_is_low() {
        let entry = ActivityEntry::new("u-1", "LOGIN", "auth", "User logged in", Category::Auth);
        assert_eq!(entry.severity, Severity::Low);
    }

    #[test]
    fn record_and_read_entries() {
        let (_temp, storage) = setup();
        let log = ActivityLog::new(&storage);

        log.record(&ActivityEntry::new(
            "u-1",
            "LOGIN",
            "auth",
            "User logged in successfully",
            Category::Auth,
        ))
        .unwrap();
        log.record(
            &ActivityEntry::new("u-2", "CREATE_CLIENT", "client", "Created client", Category::Client)
                .with_severity(Severity::Medium),
        )
        .unwrap();

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let entries = log.read_day(&today).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "LOGIN");
        assert_eq!(entries[1].action, "CREATE_CLIENT");
    }

    #[test]
    fn read_day_missing_file_is_empty() {
        let (_temp, storage) = setup();
        let log = ActivityLog::new(&storage);
        assert!(log.read_day("1999-01-01").unwrap().is_empty());
    }

    #[test]
    fn query_filters_by_actor_and_category() {
        let (_temp, storage) = setup();
        let log = ActivityLog::new(&storage);

        log.record(&ActivityEntry::new("u-1", "LOGIN", "auth", "in", Category::Auth))
            .unwrap();
        log.record(&ActivityEntry::new("u-1", "UPDATE_USER", "user", "upd", Category::User))
            .unwrap();
        log.record(&ActivityEntry::new("u-2", "LOGIN", "auth", "in", Category::Auth))
            .unwrap();

        let today = Utc::now().format("%Y-%m-%d").to_string();

        let (entries, total) = log
            .query(
                &today,
                &today,
                &ActivityFilter {
                    actor_id: Some("u-1".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(entries.len(), 2);

        let (entries, total) = log
            .query(
                &today,
                &today,
                &ActivityFilter {
                    category: Some(Category::Auth),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(total, 2);
        assert!(entries.iter().all(|e| e.category == Category::Auth));
    }

    #[test]
    fn query_applies_offset_and_limit() {
        let (_temp, storage) = setup();
        let log = ActivityLog::new(&storage);

        for i in 0..5 {
            log.record(&ActivityEntry::new(
                "u-1",
                format!("ACTION_{i}"),
                "system",
                "x",
                Category::System,
            ))
            .unwrap();
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let (entries, total) = log
            .query(
                &today,
                &today,
                &ActivityFilter {
                    offset: 1,
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn log_activity_swallows_failures() {
        // Uninitialized store makes every write fail; must not panic.
        let storage = DocumentStore::new(StoragePaths::new("/tmp/never-init-activity"));
        log_activity(
            &storage,
            ActivityEntry::new("u-1", "LOGIN", "auth", "in", Category::Auth),
        );
    }
}
