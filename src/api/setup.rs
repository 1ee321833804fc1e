// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-time bootstrap endpoints.
//!
//! `POST /v1/setup` creates the default super admin, but only while the
//! user collection is empty. Once any user exists the endpoint is a
//! no-op.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    error::ApiError,
    models::{MessageResponse, SetupRequest, SetupStatusResponse},
    state::AppState,
    storage::{log_activity, ActivityEntry, Category, Severity, StoredUser, UserRepository},
};
use crate::auth::Role;

/// Report bootstrap status.
#[utoipa::path(
    get,
    path = "/v1/setup",
    tag = "Setup",
    responses((status = 200, description = "Setup status", body = SetupStatusResponse))
)]
pub async fn setup_status(
    State(state): State<AppState>,
) -> Result<Json<SetupStatusResponse>, ApiError> {
    let repo = UserRepository::new(&state.storage);
    Ok(Json(SetupStatusResponse {
        user_count: repo.count()?,
        has_admin: repo.has_active_super_admin()?,
        storage_ready: state.storage.health_check().is_ok(),
    }))
}

/// Create the default super admin from the configured credentials.
#[utoipa::path(
    post,
    path = "/v1/setup",
    request_body = SetupRequest,
    tag = "Setup",
    responses(
        (status = 200, description = "Admin created or already present", body = MessageResponse),
        (status = 400, description = "Unknown action"),
    )
)]
pub async fn run_setup(
    State(state): State<AppState>,
    Json(payload): Json<SetupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.action != "create-admin" {
        return Err(ApiError::bad_request("Invalid action"));
    }

    let repo = UserRepository::new(&state.storage);
    if repo.count()? > 0 {
        return Ok(Json(MessageResponse::ok("Users already exist")));
    }

    let password_hash = bcrypt::hash(&state.bootstrap_admin.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let admin = StoredUser {
        id: uuid::Uuid::new_v4().to_string(),
        email: state.bootstrap_admin.email.to_lowercase(),
        password_hash,
        role: Role::SuperAdmin,
        is_active: true,
        first_name: "Super".to_string(),
        last_name: "Admin".to_string(),
        phone: None,
        department: Some("IT".to_string()),
        avatar: None,
        last_login: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    repo.create(&admin)?;

    tracing::info!(email = %admin.email, "default super admin created; change the password after first login");

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.id,
            "SETUP_ADMIN",
            "system",
            "Default super admin created",
            Category::System,
        )
        .with_severity(Severity::High),
    );

    Ok(Json(MessageResponse::ok(
        "Default admin user created successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use crate::state::BootstrapAdmin;
    use crate::storage::{DocumentStore, StoragePaths};
    use axum::http::StatusCode;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path());
        let mut storage = DocumentStore::new(paths);
        storage.initialize().unwrap();
        let tokens = TokenService::new("setup-api-test-secret", Duration::from_secs(3600));
        let state = AppState::new(storage, tokens).with_bootstrap_admin(BootstrapAdmin {
            email: "Root@Example.com".to_string(),
            password: "Bootstrap1!".to_string(),
        });
        (state, temp)
    }

    #[tokio::test]
    async fn status_reflects_empty_store() {
        let (state, _temp) = test_state();

        let Json(status) = setup_status(State(state)).await.unwrap();
        assert_eq!(status.user_count, 0);
        assert!(!status.has_admin);
        assert!(status.storage_ready);
    }

    #[tokio::test]
    async fn create_admin_is_idempotent() {
        let (state, _temp) = test_state();

        run_setup(
            State(state.clone()),
            Json(SetupRequest {
                action: "create-admin".to_string(),
            }),
        )
        .await
        .unwrap();

        let repo = UserRepository::new(&state.storage);
        assert_eq!(repo.count().unwrap(), 1);
        let admin = repo.find_by_email("root@example.com").unwrap();
        assert_eq!(admin.role, Role::SuperAdmin);
        assert!(bcrypt::verify("Bootstrap1!", &admin.password_hash).unwrap());

        // Second run is a no-op.
        run_setup(
            State(state.clone()),
            Json(SetupRequest {
                action: "create-admin".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(repo.count().unwrap(), 1);

        let Json(status) = setup_status(State(state)).await.unwrap();
        assert!(status.has_admin);
    }

    #[tokio::test]
    async fn unknown_action_is_400() {
        let (state, _temp) = test_state();

        let err = run_setup(
            State(state),
            Json(SetupRequest {
                action: "drop-tables".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
