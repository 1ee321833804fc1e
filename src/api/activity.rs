// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Activity log queries (admin only).
//!
//! The log itself is append-only; this module is read-only over it.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    state::AppState,
    storage::{ActivityEntry, ActivityFilter, ActivityLog, Category, Severity},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    /// Start date, `YYYY-MM-DD`. Defaults to today.
    pub start_date: Option<String>,
    /// End date, `YYYY-MM-DD`. Defaults to today.
    pub end_date: Option<String>,
    pub actor_id: Option<String>,
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub offset: Option<usize>,
    /// Maximum entries returned (default 100).
    pub limit: Option<usize>,
}

/// Response for activity log queries.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListResponse {
    pub entries: Vec<ActivityEntry>,
    /// Match count before offset/limit.
    pub total: usize,
    pub has_more: bool,
}

/// Query the activity log.
#[utoipa::path(
    get,
    path = "/v1/admin/activity",
    params(ActivityQuery),
    tag = "Activity",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Matching entries, newest first", body = ActivityListResponse),
        (status = 400, description = "Bad date range"),
        (status = 403, description = "Not an admin"),
    )
)]
pub async fn query_activity(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let start = query.start_date.unwrap_or_else(|| today.clone());
    let end = query.end_date.unwrap_or(today);

    let filter = ActivityFilter {
        actor_id: query.actor_id,
        category: query.category,
        severity: query.severity,
        offset: query.offset.unwrap_or(0),
        limit: Some(query.limit.unwrap_or(100)),
    };

    let log = ActivityLog::new(&state.storage);
    let (entries, total) = log
        .query(&start, &end, &filter)
        .map_err(|e| ApiError::bad_request(format!("Invalid activity query: {e}")))?;

    let has_more = filter.offset + entries.len() < total;

    Ok(Json(ActivityListResponse {
        entries,
        total,
        has_more,
    }))
}
