// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Settings endpoints (admin only).
//!
//! The settings document is a singleton; GET materializes defaults when no
//! document exists yet, PUT replaces one validated section at a time.

use axum::{extract::State, Json};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::UpdateSettingsRequest,
    state::AppState,
    storage::{
        log_activity, ActivityEntry, Category, Settings, SettingsRepository, StorageError,
    },
};

/// Get the full settings document.
#[utoipa::path(
    get,
    path = "/v1/settings",
    tag = "Settings",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Settings document", body = Settings),
        (status = 403, description = "Not an admin"),
    )
)]
pub async fn get_settings(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Settings>, ApiError> {
    let settings = SettingsRepository::new(&state.storage).load()?;
    Ok(Json(settings))
}

/// Replace one settings section.
#[utoipa::path(
    put,
    path = "/v1/settings",
    request_body = UpdateSettingsRequest,
    tag = "Settings",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated settings document", body = Settings),
        (status = 400, description = "Unknown section or invalid payload"),
        (status = 403, description = "Not an admin"),
    )
)]
pub async fn update_settings(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, ApiError> {
    let repo = SettingsRepository::new(&state.storage);
    let settings = repo
        .update_section(&payload.section, payload.data)
        .map_err(|e| match e {
            StorageError::SerializationError(msg) => ApiError::bad_request(msg),
            other => other.into(),
        })?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "UPDATE_SETTINGS",
            "settings",
            format!("Updated settings section: {}", payload.section),
            Category::Settings,
        ),
    );

    Ok(Json(settings))
}
