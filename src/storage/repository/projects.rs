// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project repository for the document store.
//!
//! Whenever a project carries milestones, its progress percentage is
//! derived from milestone completion on every write that touches them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStore, StorageError, StorageResult};
use super::inquiries::Priority;
use super::{matches_search, paginate, Note, SortOrder};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

/// A project milestone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Project record as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredProject {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Referenced client id; must exist at creation time.
    pub client_id: String,
    /// Assigned user ids; at least one.
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    pub category: String,
    /// Services delivered; at least one.
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// 0-100; derived from milestones whenever any exist.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredProject {
    /// Recompute progress from milestone completion.
    ///
    /// No-op when the project has no milestones (progress stays manual).
    pub fn recompute_progress(&mut self) {
        if self.milestones.is_empty() {
            return;
        }
        let completed = self.milestones.iter().filter(|m| m.completed).count();
        self.progress =
            ((completed as f64 / self.milestones.len() as f64) * 100.0).round() as u8;
    }
}

/// Filter, sort and pagination parameters for project listings.
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    /// Substring match over title and description.
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub client_id: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            priority: None,
            category: None,
            client_id: None,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 10,
        }
    }
}

/// Repository for project operations on the document store.
pub struct ProjectRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new ProjectRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if a project exists.
    pub fn exists(&self, project_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().project(project_id))
    }

    /// Get a project by ID.
    pub fn get(&self, project_id: &str) -> StorageResult<StoredProject> {
        let path = self.storage.paths().project(project_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Project {project_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new project. Progress is recomputed before the write.
    pub fn create(&self, project: &StoredProject) -> StorageResult<()> {
        if self.exists(&project.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Project {}",
                project.id
            )));
        }

        let mut project = project.clone();
        project.recompute_progress();
        self.storage
            .write_json(self.storage.paths().project(&project.id), &project)
    }

    /// Update an existing project. Progress is recomputed before the write.
    pub fn update(&self, project: &StoredProject) -> StorageResult<()> {
        if !self.exists(&project.id) {
            return Err(StorageError::NotFound(format!("Project {}", project.id)));
        }

        let mut project = project.clone();
        project.recompute_progress();
        self.storage
            .write_json(self.storage.paths().project(&project.id), &project)
    }

    /// Delete a project.
    pub fn delete(&self, project_id: &str) -> StorageResult<()> {
        if !self.exists(project_id) {
            return Err(StorageError::NotFound(format!("Project {project_id}")));
        }
        self.storage
            .delete(self.storage.paths().project(project_id))
    }

    /// Count all projects.
    pub fn count(&self) -> StorageResult<usize> {
        Ok(self.list_ids()?.len())
    }

    /// List projects with filtering, sorting and pagination.
    pub fn list(&self, filter: &ProjectFilter) -> StorageResult<(Vec<StoredProject>, usize)> {
        let mut projects: Vec<StoredProject> = Vec::new();
        for id in self.list_ids()? {
            if let Ok(project) = self.get(&id) {
                projects.push(project);
            }
        }

        projects.retain(|p| {
            let search_ok = filter
                .search
                .as_deref()
                .is_none_or(|s| matches_search(&p.title, s) || matches_search(&p.description, s));
            search_ok
                && filter.status.is_none_or(|st| p.status == st)
                && filter.priority.is_none_or(|pr| p.priority == pr)
                && filter
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
                && filter
                    .client_id
                    .as_deref()
                    .is_none_or(|c| p.client_id == c)
        });

        sort_projects(&mut projects, &filter.sort_by, filter.sort_order);
        Ok(paginate(projects, filter.page, filter.limit))
    }

    fn list_ids(&self) -> StorageResult<Vec<String>> {
        self.storage
            .list_files(self.storage.paths().projects_dir(), "json")
    }
}

fn sort_projects(projects: &mut [StoredProject], sort_by: &str, order: SortOrder) {
    projects.sort_by(|a, b| {
        let ord = match sort_by {
            "title" => a.title.cmp(&b.title),
            "deadline" => a.deadline.cmp(&b.deadline),
            "progress" => a.progress.cmp(&b.progress),
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

    pub(crate) fn test_project(id: &str, client_id: &str) -> StoredProject {
        StoredProject {
            id: id.to_string(),
            title: "Website rebuild".to_string(),
            description: "Full rebuild of the marketing site.".to_string(),
            client_id: client_id.to_string(),
            assigned_to: vec!["u-1".to_string()],
            status: ProjectStatus::default(),
            priority: Priority::default(),
            category: "web".to_string(),
            services: vec!["design".to_string()],
            budget: Some(25_000.0),
            estimated_hours: Some(200.0),
            actual_hours: 0.0,
            start_date: None,
            end_date: None,
            deadline: None,
            progress: 0,
            tags: Vec::new(),
            milestones: Vec::new(),
            notes: Vec::new(),
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn milestone(title: &str, completed: bool) -> Milestone {
        Milestone {
            title: title.to_string(),
            description: None,
            due_date: None,
            completed,
            completed_at: completed.then(Utc::now),
        }
    }

    #[test]
    fn create_and_get_project() {
        let (_temp, storage) = test_storage();
        let repo = ProjectRepository::new(&storage);

        repo.create(&test_project("p-1", "c-1")).unwrap();
        let loaded = repo.get("p-1").unwrap();
        assert_eq!(loaded.status, ProjectStatus::Planning);
        assert_eq!(loaded.progress, 0);
    }

    #[test]
    fn progress_derived_from_milestones() {
        let mut project = test_project("p-1", "c-1");
        project.milestones = vec![
            milestone("Design", true),
            milestone("Build", true),
            milestone("Launch", false),
        ];
        project.recompute_progress();
        assert_eq!(project.progress, 67);

        project.milestones[2].completed = true;
        project.recompute_progress();
        assert_eq!(project.progress, 100);
    }

    #[test]
    fn progress_untouched_without_milestones() {
        let mut project = test_project("p-1", "c-1");
        project.progress = 40;
        project.recompute_progress();
        assert_eq!(project.progress, 40);
    }

    #[test]
    fn create_recomputes_progress() {
        let (_temp, storage) = test_storage();
        let repo = ProjectRepository::new(&storage);

        let mut project = test_project("p-1", "c-1");
        project.milestones = vec![milestone("Design", true), milestone("Build", false)];
        project.progress = 0;
        repo.create(&project).unwrap();

        let loaded = repo.get("p-1").unwrap();
        assert_eq!(loaded.progress, 50);
    }

    #[test]
    fn list_filters_by_status_and_client() {
        let (_temp, storage) = test_storage();
        let repo = ProjectRepository::new(&storage);

        let mut active = test_project("p-1", "c-1");
        active.status = ProjectStatus::InProgress;
        repo.create(&active).unwrap();
        repo.create(&test_project("p-2", "c-2")).unwrap();

        let (projects, total) = repo
            .list(&ProjectFilter {
                status: Some(ProjectStatus::InProgress),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(projects[0].id, "p-1");

        let (projects, total) = repo
            .list(&ProjectFilter {
                client_id: Some("c-2".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(projects[0].id, "p-2");
    }

    #[test]
    fn list_search_matches_title() {
        let (_temp, storage) = test_storage();
        let repo = ProjectRepository::new(&storage);

        repo.create(&test_project("p-1", "c-1")).unwrap();
        let mut other = test_project("p-2", "c-1");
        other.title = "Mobile app".to_string();
        other.description = "iOS and Android".to_string();
        repo.create(&other).unwrap();

        let (projects, total) = repo
            .list(&ProjectFilter {
                search: Some("mobile".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(projects[0].id, "p-2");
    }
}
