// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inquiry endpoints.
//!
//! Creation is unauthenticated: the public website contact form posts
//! here. Everything else requires a session; deletion requires an admin.

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
    models::{CreateInquiryRequest, InquiryListResponse, MessageResponse, Pagination, UpdateInquiryRequest},
    state::AppState,
    storage::{
        log_activity, repository::Note, ActivityEntry, Category, InquiryFilter, InquiryRepository,
        InquiryStatus, Priority, Severity, SortOrder, StoredInquiry,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InquiriesQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub status: Option<InquiryStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl From<InquiriesQuery> for InquiryFilter {
    fn from(q: InquiriesQuery) -> Self {
        let defaults = InquiryFilter::default();
        InquiryFilter {
            search: q.search,
            status: q.status,
            priority: q.priority,
            category: q.category,
            sort_by: q.sort_by.unwrap_or(defaults.sort_by),
            sort_order: q.sort_order.unwrap_or(defaults.sort_order),
            page: q.page.unwrap_or(defaults.page),
            limit: q.limit.unwrap_or(defaults.limit),
        }
    }
}

/// List inquiries with filtering, sorting and pagination.
#[utoipa::path(
    get,
    path = "/v1/inquiries",
    params(InquiriesQuery),
    tag = "Inquiries",
    security(("bearer" = [])),
    responses((status = 200, description = "Page of inquiries", body = InquiryListResponse))
)]
pub async fn list_inquiries(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<InquiriesQuery>,
) -> Result<Json<InquiryListResponse>, ApiError> {
    let filter: InquiryFilter = query.into();
    let (page, limit) = (filter.page, filter.limit);

    let (inquiries, total) = InquiryRepository::new(&state.storage).list(&filter)?;

    Ok(Json(InquiryListResponse {
        inquiries,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Submit an inquiry (public contact form, no authentication).
#[utoipa::path(
    post,
    path = "/v1/inquiries",
    request_body = CreateInquiryRequest,
    tag = "Inquiries",
    responses(
        (status = 201, description = "Created inquiry", body = StoredInquiry),
        (status = 400, description = "Validation failure"),
    )
)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<CreateInquiryRequest>,
) -> Result<(StatusCode, Json<StoredInquiry>), ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let inquiry = StoredInquiry {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        email: payload.email.to_lowercase(),
        phone: payload.phone,
        company: payload.company,
        subject: payload.subject,
        message: payload.message,
        status: InquiryStatus::default(),
        priority: payload.priority,
        category: payload.category,
        source: payload.source,
        assigned_to: None,
        notes: Vec::new(),
        tags: Vec::new(),
        is_archived: false,
        response_time: None,
        resolved_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    InquiryRepository::new(&state.storage).create(&inquiry)?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// Get a single inquiry.
#[utoipa::path(
    get,
    path = "/v1/inquiries/{id}",
    params(("id" = String, Path, description = "Inquiry id")),
    tag = "Inquiries",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Inquiry", body = StoredInquiry),
        (status = 404, description = "No such inquiry"),
    )
)]
pub async fn get_inquiry(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredInquiry>, ApiError> {
    let inquiry = InquiryRepository::new(&state.storage)
        .get(&id)
        .map_err(|_| ApiError::not_found("Inquiry not found"))?;
    Ok(Json(inquiry))
}

/// Update an inquiry (status, assignment, tags, notes).
#[utoipa::path(
    put,
    path = "/v1/inquiries/{id}",
    params(("id" = String, Path, description = "Inquiry id")),
    request_body = UpdateInquiryRequest,
    tag = "Inquiries",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated inquiry", body = StoredInquiry),
        (status = 404, description = "No such inquiry"),
    )
)]
pub async fn update_inquiry(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInquiryRequest>,
) -> Result<Json<StoredInquiry>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = InquiryRepository::new(&state.storage);
    let mut inquiry = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("Inquiry not found"))?;

    if let Some(status) = payload.status {
        inquiry.set_status(status);
    }
    if let Some(priority) = payload.priority {
        inquiry.priority = priority;
    }
    if let Some(category) = payload.category {
        inquiry.category = category;
    }
    if let Some(assigned_to) = payload.assigned_to {
        inquiry.assigned_to = Some(assigned_to);
    }
    if let Some(tags) = payload.tags {
        inquiry.tags = tags;
    }
    if let Some(is_archived) = payload.is_archived {
        inquiry.is_archived = is_archived;
    }
    if let Some(note) = payload.note {
        inquiry.notes.push(Note {
            content: note,
            created_by: user.user_id.clone(),
            created_at: Utc::now(),
        });
    }
    inquiry.updated_at = Utc::now();
    repo.update(&inquiry)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "UPDATE_INQUIRY",
            "inquiry",
            format!("Updated inquiry: {}", inquiry.subject),
            Category::Inquiry,
        )
        .with_resource_id(&inquiry.id),
    );

    Ok(Json(inquiry))
}

/// Delete an inquiry (admin only).
#[utoipa::path(
    delete,
    path = "/v1/inquiries/{id}",
    params(("id" = String, Path, description = "Inquiry id")),
    tag = "Inquiries",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such inquiry"),
    )
)]
pub async fn delete_inquiry(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = InquiryRepository::new(&state.storage);
    let inquiry = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("Inquiry not found"))?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "DELETE_INQUIRY",
            "inquiry",
            format!("Deleted inquiry: {}", inquiry.subject),
            Category::Inquiry,
        )
        .with_severity(Severity::High)
        .with_resource_id(&inquiry.id),
    );

    repo.delete(&id)?;

    Ok(Json(MessageResponse::ok("Inquiry deleted successfully")))
}
