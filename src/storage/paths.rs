// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the document storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for persistent documents.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user record.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Client Paths ==========

    /// Directory containing all client records.
    pub fn clients_dir(&self) -> PathBuf {
        self.root.join("clients")
    }

    /// Path to a specific client record.
    pub fn client(&self, client_id: &str) -> PathBuf {
        self.clients_dir().join(format!("{client_id}.json"))
    }

    // ========== Inquiry Paths ==========

    /// Directory containing all inquiry records.
    pub fn inquiries_dir(&self) -> PathBuf {
        self.root.join("inquiries")
    }

    /// Path to a specific inquiry record.
    pub fn inquiry(&self, inquiry_id: &str) -> PathBuf {
        self.inquiries_dir().join(format!("{inquiry_id}.json"))
    }

    // ========== Project Paths ==========

    /// Directory containing all project records.
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Path to a specific project record.
    pub fn project(&self, project_id: &str) -> PathBuf {
        self.projects_dir().join(format!("{project_id}.json"))
    }

    // ========== Settings Paths ==========

    /// Path to the singleton settings document.
    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    // ========== Activity Log Paths ==========

    /// Directory containing activity logs.
    pub fn activity_dir(&self) -> PathBuf {
        self.root.join("activity")
    }

    /// Path to a daily activity log file (JSONL format).
    pub fn activity_day_file(&self, date: &str) -> PathBuf {
        self.activity_dir().join(format!("{date}.jsonl"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("/data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(paths.root(), Path::new("/tmp/test-data"));
        assert_eq!(
            paths.user("u-123"),
            PathBuf::from("/tmp/test-data/users/u-123.json")
        );
    }

    #[test]
    fn entity_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.users_dir(), PathBuf::from("/data/users"));
        assert_eq!(paths.client("c1"), PathBuf::from("/data/clients/c1.json"));
        assert_eq!(
            paths.inquiry("i1"),
            PathBuf::from("/data/inquiries/i1.json")
        );
        assert_eq!(paths.project("p1"), PathBuf::from("/data/projects/p1.json"));
        assert_eq!(paths.settings_file(), PathBuf::from("/data/settings.json"));
    }

    #[test]
    fn activity_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.activity_dir(), PathBuf::from("/data/activity"));
        assert_eq!(
            paths.activity_day_file("2026-08-07"),
            PathBuf::from("/data/activity/2026-08-07.jsonl")
        );
    }
}
