// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{CreateProjectRequest, MessageResponse, Pagination, ProjectListResponse, UpdateProjectRequest},
    state::AppState,
    storage::{
        log_activity, ActivityEntry, Category, ClientRepository, Priority, ProjectFilter,
        ProjectRepository, ProjectStatus, Severity, SortOrder, StoredProject,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub client_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl From<ProjectsQuery> for ProjectFilter {
    fn from(q: ProjectsQuery) -> Self {
        let defaults = ProjectFilter::default();
        ProjectFilter {
            search: q.search,
            status: q.status,
            priority: q.priority,
            category: q.category,
            client_id: q.client_id,
            sort_by: q.sort_by.unwrap_or(defaults.sort_by),
            sort_order: q.sort_order.unwrap_or(defaults.sort_order),
            page: q.page.unwrap_or(defaults.page),
            limit: q.limit.unwrap_or(defaults.limit),
        }
    }
}

/// List projects with filtering, sorting and pagination.
#[utoipa::path(
    get,
    path = "/v1/projects",
    params(ProjectsQuery),
    tag = "Projects",
    security(("bearer" = [])),
    responses((status = 200, description = "Page of projects", body = ProjectListResponse))
)]
pub async fn list_projects(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<ProjectsQuery>,
) -> Result<Json<ProjectListResponse>, ApiError> {
    let filter: ProjectFilter = query.into();
    let (page, limit) = (filter.page, filter.limit);

    let (projects, total) = ProjectRepository::new(&state.storage).list(&filter)?;

    Ok(Json(ProjectListResponse {
        projects,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Create a new project. The referenced client must exist.
#[utoipa::path(
    post,
    path = "/v1/projects",
    request_body = CreateProjectRequest,
    tag = "Projects",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created project", body = StoredProject),
        (status = 400, description = "Validation failure or unknown client"),
    )
)]
pub async fn create_project(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<StoredProject>), ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    if !ClientRepository::new(&state.storage).exists(&payload.client_id) {
        return Err(ApiError::bad_request("Referenced client does not exist"));
    }

    let project = StoredProject {
        id: uuid::Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        client_id: payload.client_id,
        assigned_to: payload.assigned_to,
        status: payload.status,
        priority: payload.priority,
        category: payload.category,
        services: payload.services,
        budget: payload.budget,
        estimated_hours: payload.estimated_hours,
        actual_hours: 0.0,
        start_date: payload.start_date,
        end_date: payload.end_date,
        deadline: payload.deadline,
        progress: 0,
        tags: payload.tags,
        milestones: payload.milestones,
        notes: Vec::new(),
        is_archived: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let repo = ProjectRepository::new(&state.storage);
    repo.create(&project)?;
    // Re-read for the milestone-derived progress.
    let project = repo.get(&project.id)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "CREATE_PROJECT",
            "project",
            format!("Created new project: {}", project.title),
            Category::Project,
        )
        .with_severity(Severity::Medium)
        .with_resource_id(&project.id)
        .with_metadata(serde_json::json!({
            "clientId": project.client_id,
            "category": project.category,
            "createdBy": user.user_id,
        })),
    );

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a single project.
#[utoipa::path(
    get,
    path = "/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    tag = "Projects",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Project", body = StoredProject),
        (status = 404, description = "No such project"),
    )
)]
pub async fn get_project(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredProject>, ApiError> {
    let project = ProjectRepository::new(&state.storage)
        .get(&id)
        .map_err(|_| ApiError::not_found("Project not found"))?;
    Ok(Json(project))
}

/// Update a project.
#[utoipa::path(
    put,
    path = "/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    tag = "Projects",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated project", body = StoredProject),
        (status = 404, description = "No such project"),
    )
)]
pub async fn update_project(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<StoredProject>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = ProjectRepository::new(&state.storage);
    let mut project = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("Project not found"))?;

    if let Some(title) = payload.title {
        project.title = title;
    }
    if let Some(description) = payload.description {
        project.description = description;
    }
    if let Some(assigned_to) = payload.assigned_to {
        if assigned_to.is_empty() {
            return Err(ApiError::bad_request(
                "At least one team member must be assigned",
            ));
        }
        project.assigned_to = assigned_to;
    }
    if let Some(status) = payload.status {
        project.status = status;
    }
    if let Some(priority) = payload.priority {
        project.priority = priority;
    }
    if let Some(category) = payload.category {
        project.category = category;
    }
    if let Some(services) = payload.services {
        if services.is_empty() {
            return Err(ApiError::bad_request("At least one service is required"));
        }
        project.services = services;
    }
    if let Some(budget) = payload.budget {
        project.budget = Some(budget);
    }
    if let Some(estimated_hours) = payload.estimated_hours {
        project.estimated_hours = Some(estimated_hours);
    }
    if let Some(actual_hours) = payload.actual_hours {
        project.actual_hours = actual_hours;
    }
    if let Some(start_date) = payload.start_date {
        project.start_date = Some(start_date);
    }
    if let Some(end_date) = payload.end_date {
        project.end_date = Some(end_date);
    }
    if let Some(deadline) = payload.deadline {
        project.deadline = Some(deadline);
    }
    if let Some(progress) = payload.progress {
        project.progress = progress;
    }
    if let Some(tags) = payload.tags {
        project.tags = tags;
    }
    if let Some(milestones) = payload.milestones {
        project.milestones = milestones;
    }
    if let Some(is_archived) = payload.is_archived {
        project.is_archived = is_archived;
    }
    project.updated_at = Utc::now();
    repo.update(&project)?;
    // Milestone changes recompute progress inside the repository.
    let project = repo.get(&id)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "UPDATE_PROJECT",
            "project",
            format!("Updated project: {}", project.title),
            Category::Project,
        )
        .with_resource_id(&project.id),
    );

    Ok(Json(project))
}

/// Delete a project (admin only).
#[utoipa::path(
    delete,
    path = "/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    tag = "Projects",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such project"),
    )
)]
pub async fn delete_project(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = ProjectRepository::new(&state.storage);
    let project = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("Project not found"))?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "DELETE_PROJECT",
            "project",
            format!("Deleted project: {}", project.title),
            Category::Project,
        )
        .with_severity(Severity::High)
        .with_resource_id(&project.id),
    );

    repo.delete(&id)?;

    Ok(Json(MessageResponse::ok("Project deleted successfully")))
}
