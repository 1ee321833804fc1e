// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and profile endpoints.
//!
//! Unknown email and wrong password share one failure message; only the
//! deactivated-account case is named.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RefreshRequest,
        RefreshResponse, UpdateProfileRequest, UserPublic,
    },
    state::AppState,
    storage::{log_activity, ActivityEntry, Category, Severity, UserRepository},
};

/// Auth endpoints report failures as `{success: false, error}`.
fn auth_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
        .into_response()
}

/// Authenticate with email and password, returning a token pair.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Bad credentials or deactivated account"),
        (status = 429, description = "Too many attempts"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let email = payload.email.to_lowercase();

    if !state.rate_limiter.check(&email) {
        return Ok(auth_failure(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts. Please try again later.",
        ));
    }

    let repo = UserRepository::new(&state.storage);
    let Ok(mut user) = repo.find_by_email(&email) else {
        return Ok(auth_failure(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    };

    if !user.is_active {
        return Ok(auth_failure(
            StatusCode::UNAUTHORIZED,
            "Account is deactivated",
        ));
    }

    let password_ok = bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !password_ok {
        return Ok(auth_failure(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    let token = state
        .tokens
        .issue_access_token(&user)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;
    let refresh_token = state
        .tokens
        .issue_refresh_token(&user)
        .map_err(|e| ApiError::internal(format!("Failed to issue refresh token: {e}")))?;

    user.last_login = Some(Utc::now());
    if let Err(e) = repo.update(&user) {
        tracing::warn!(user_id = %user.id, error = %e, "failed to update last login");
    }

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.id,
            "LOGIN",
            "auth",
            "User logged in successfully",
            Category::Auth,
        ),
    );

    Ok(Json(LoginResponse {
        success: true,
        token,
        refresh_token,
        user: user.into(),
        message: "Login successful".to_string(),
    })
    .into_response())
}

/// Mint a new access token from a refresh token.
///
/// The refresh token and the user snapshot stay unchanged; only the access
/// token is re-issued.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 400, description = "Missing refresh token"),
        (status = 401, description = "Invalid or expired refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let claims = state
        .tokens
        .verify(&payload.refresh_token)
        .ok_or_else(|| {
            ApiError::new(StatusCode::UNAUTHORIZED, "Invalid or expired refresh token")
        })?;

    // The principal must still exist and be active.
    let repo = UserRepository::new(&state.storage);
    let user = repo
        .get(&claims.user_id)
        .map_err(|_| ApiError::new(StatusCode::UNAUTHORIZED, "Invalid or expired refresh token"))?;
    if !user.is_active {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid or expired refresh token",
        ));
    }

    let token = state
        .tokens
        .issue_access_token(&user)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    Ok(Json(RefreshResponse {
        success: true,
        token,
        message: "Token refreshed successfully".to_string(),
    }))
}

/// Best-effort logout for audit purposes.
///
/// Tokens are stateless; nothing is invalidated server-side. When the
/// bearer token decodes, a LOGOUT entry is recorded. Always returns 200.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logged out", body = MessageResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if let Some(claims) = token.and_then(|t| state.tokens.verify(t)) {
        log_activity(
            &state.storage,
            ActivityEntry::new(
                &claims.user_id,
                "LOGOUT",
                "auth",
                "User logged out",
                Category::Auth,
            ),
        );
    }

    Json(MessageResponse::ok("Logged out successfully"))
}

/// Get the caller's own profile.
#[utoipa::path(
    get,
    path = "/v1/auth/profile",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, description = "Unauthenticated"),
    )
)]
pub async fn get_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserPublic>, ApiError> {
    let stored = UserRepository::new(&state.storage).get(&user.user_id)?;
    Ok(Json(stored.into()))
}

/// Update the caller's own profile (name, phone, department only).
#[utoipa::path(
    put,
    path = "/v1/auth/profile",
    request_body = UpdateProfileRequest,
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 401, description = "Unauthenticated"),
    )
)]
pub async fn update_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserPublic>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = UserRepository::new(&state.storage);
    let mut stored = repo.get(&user.user_id)?;

    let mut changed: Vec<&str> = Vec::new();
    if let Some(first_name) = payload.first_name {
        stored.first_name = first_name;
        changed.push("firstName");
    }
    if let Some(last_name) = payload.last_name {
        stored.last_name = last_name;
        changed.push("lastName");
    }
    if let Some(phone) = payload.phone {
        stored.phone = Some(phone);
        changed.push("phone");
    }
    if let Some(department) = payload.department {
        stored.department = Some(department);
        changed.push("department");
    }
    stored.updated_at = Utc::now();
    repo.update(&stored)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "UPDATE_PROFILE",
            "user",
            "Profile updated",
            Category::User,
        )
        .with_metadata(serde_json::json!({ "updatedFields": changed })),
    );

    Ok(Json(stored.into()))
}

/// Change the caller's own password.
#[utoipa::path(
    put,
    path = "/v1/auth/profile/password",
    request_body = ChangePasswordRequest,
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password incorrect"),
    )
)]
pub async fn change_password(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = UserRepository::new(&state.storage);
    let mut stored = repo.get(&user.user_id)?;

    let current_ok =
        bcrypt::verify(&payload.current_password, &stored.password_hash).unwrap_or(false);
    if !current_ok {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    stored.password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;
    stored.updated_at = Utc::now();
    repo.update(&stored)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "CHANGE_PASSWORD",
            "auth",
            "Password changed successfully",
            Category::Auth,
        )
        .with_severity(Severity::Medium),
    );

    Ok(Json(MessageResponse::ok("Password changed successfully")))
}
