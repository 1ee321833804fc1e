// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin user management endpoints.
//!
//! All routes sit behind the admin allow-list. Two rules go beyond it:
//! only a super admin may hand out the `admin`/`super_admin` roles, and
//! nobody may delete their own account.

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
    auth::{AdminOnly, Role},
    error::ApiError,
    models::{
        CreateUserRequest, MessageResponse, Pagination, ResetPasswordRequest, UpdateUserRequest,
        UserListResponse, UserPublic,
    },
    state::AppState,
    storage::{
        log_activity, ActivityEntry, Category, Severity, SortOrder, StoredUser, UserFilter,
        UserRepository,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub department: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl From<UsersQuery> for UserFilter {
    fn from(q: UsersQuery) -> Self {
        let defaults = UserFilter::default();
        UserFilter {
            search: q.search,
            role: q.role,
            is_active: q.is_active,
            department: q.department,
            sort_by: q.sort_by.unwrap_or(defaults.sort_by),
            sort_order: q.sort_order.unwrap_or(defaults.sort_order),
            page: q.page.unwrap_or(defaults.page),
            limit: q.limit.unwrap_or(defaults.limit),
        }
    }
}

/// List users with filtering, sorting and pagination.
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    params(UsersQuery),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of users", body = UserListResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not an admin"),
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let filter: UserFilter = query.into();
    let (page, limit) = (filter.page, filter.limit);

    let (users, total) = UserRepository::new(&state.storage).list(&filter)?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserPublic::from).collect(),
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/v1/admin/users",
    request_body = CreateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created user", body = UserPublic),
        (status = 400, description = "Validation failure or duplicate email"),
        (status = 403, description = "Role not assignable by caller"),
    )
)]
pub async fn create_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    // Only a super admin may create privileged accounts.
    if payload.role.is_admin() && admin.role != Role::SuperAdmin {
        return Err(ApiError::forbidden(
            "Insufficient permissions to create this user role",
        ));
    }

    let repo = UserRepository::new(&state.storage);
    let email = payload.email.to_lowercase();
    if repo.find_by_email(&email).is_ok() {
        return Err(ApiError::bad_request("Email address is already registered"));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = StoredUser {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        password_hash,
        role: payload.role,
        is_active: true,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        department: payload.department,
        avatar: None,
        last_login: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    repo.create(&user)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "CREATE_USER",
            "user",
            format!("Created new user: {} {}", user.first_name, user.last_name),
            Category::User,
        )
        .with_severity(Severity::Medium)
        .with_resource_id(&user.id)
        .with_metadata(serde_json::json!({
            "role": user.role,
            "department": user.department,
            "createdBy": admin.user_id,
        })),
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a single user.
#[utoipa::path(
    get,
    path = "/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User", body = UserPublic),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserPublic>, ApiError> {
    let user = UserRepository::new(&state.storage)
        .get(&id)
        .map_err(|_| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// Update a user.
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 400, description = "Validation failure or duplicate email"),
        (status = 403, description = "Role not assignable by caller"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn update_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserPublic>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = UserRepository::new(&state.storage);
    let mut user = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("User not found"))?;

    // Only a super admin may grant privileged roles.
    if let Some(role) = payload.role {
        if role.is_admin() && admin.role != Role::SuperAdmin {
            return Err(ApiError::forbidden(
                "Insufficient permissions to assign this role",
            ));
        }
    }

    // Email changes re-check uniqueness.
    if let Some(email) = &payload.email {
        let email = email.to_lowercase();
        if email != user.email {
            if repo.find_by_email(&email).is_ok() {
                return Err(ApiError::bad_request("Email address is already registered"));
            }
            user.email = email;
        }
    }

    let mut changed: Vec<&str> = Vec::new();
    if let Some(first_name) = payload.first_name {
        user.first_name = first_name;
        changed.push("firstName");
    }
    if let Some(last_name) = payload.last_name {
        user.last_name = last_name;
        changed.push("lastName");
    }
    if let Some(role) = payload.role {
        user.role = role;
        changed.push("role");
    }
    if let Some(phone) = payload.phone {
        user.phone = Some(phone);
        changed.push("phone");
    }
    if let Some(department) = payload.department {
        user.department = Some(department);
        changed.push("department");
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
        changed.push("isActive");
    }
    user.updated_at = Utc::now();
    repo.update(&user)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "UPDATE_USER",
            "user",
            format!("Updated user: {} {}", user.first_name, user.last_name),
            Category::User,
        )
        .with_resource_id(&user.id)
        .with_metadata(serde_json::json!({
            "updatedFields": changed,
            "updatedBy": admin.user_id,
        })),
    );

    Ok(Json(user.into()))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Self-deletion attempt"),
        (status = 403, description = "Cannot delete a super admin"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn delete_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = UserRepository::new(&state.storage);
    let user = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("User not found"))?;

    if user.role == Role::SuperAdmin && admin.role != Role::SuperAdmin {
        return Err(ApiError::forbidden("Cannot delete super admin users"));
    }

    if admin.user_id == id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    // Recorded before the delete so the entry survives even if it fails.
    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "DELETE_USER",
            "user",
            format!("Deleted user: {} {}", user.first_name, user.last_name),
            Category::User,
        )
        .with_severity(Severity::High)
        .with_resource_id(&user.id)
        .with_metadata(serde_json::json!({
            "deletedUserEmail": user.email,
            "deletedUserRole": user.role,
            "deletedBy": admin.user_id,
        })),
    );

    repo.delete(&id)?;

    Ok(Json(MessageResponse::ok("User deleted successfully")))
}

/// Reset a user's password (admin action).
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/password",
    params(("id" = String, Path, description = "User id")),
    request_body = ResetPasswordRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 404, description = "No such user"),
    )
)]
pub async fn reset_password(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = UserRepository::new(&state.storage);
    let mut user = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("User not found"))?;

    user.password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;
    user.updated_at = Utc::now();
    repo.update(&user)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "RESET_PASSWORD",
            "user",
            format!("Password reset for user: {} {}", user.first_name, user.last_name),
            Category::User,
        )
        .with_severity(Severity::High)
        .with_resource_id(&user.id)
        .with_metadata(serde_json::json!({ "resetBy": admin.user_id })),
    );

    Ok(Json(MessageResponse::ok("Password reset successfully")))
}
