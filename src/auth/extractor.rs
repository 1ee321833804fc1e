// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! `AdminOnly` composes authentication with the
//! `["super_admin", "admin"]` allow-list as a single gate.
//!
//! Per-request outcome:
//!
//! - no/malformed header -> 401
//! - token invalid or expired -> 401
//! - principal missing or inactive -> 401
//! - role not in the allow-list -> 403
//! - otherwise the handler runs

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthenticatedUser, AuthError};
use crate::state::AppState;
use crate::storage::UserRepository;

/// Extractor for authenticated users.
///
/// Verifies the bearer token, then re-fetches the principal to confirm the
/// account still exists and is active. This re-fetch is the only
/// server-side channel for instant de-authorization: tokens are stateless
/// and never revoked before natural expiry.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A previous extractor on the same request already did the work.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::MissingToken)?;

        // Must be the literal `Bearer ` prefix followed by the token.
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.verify(token).ok_or(AuthError::InvalidToken)?;

        // Re-check the account against the store.
        let repo = UserRepository::new(&state.storage);
        let stored = repo
            .get(&claims.user_id)
            .map_err(|_| AuthError::PrincipalRejected)?;
        if !stored.is_active {
            return Err(AuthError::PrincipalRejected);
        }

        // Best-effort last-login refresh; a failed write must not reject
        // the request.
        if let Err(e) = repo.touch_last_login(&claims.user_id) {
            tracing::warn!(user_id = %claims.user_id, error = %e, "failed to update last login");
        }

        let user = AuthenticatedUser::from(claims);
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

/// Extractor requiring the admin allow-list (`super_admin` or `admin`).
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, TokenService};
    use crate::storage::{DocumentStore, StoragePaths, StoredUser};
    use axum::http::Request;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp.path());
        let mut storage = DocumentStore::new(paths);
        storage.initialize().expect("Failed to initialize storage");

        let tokens = TokenService::new("extractor-test-secret", Duration::from_secs(3600));
        (AppState::new(storage, tokens), temp)
    }

    fn seed_user(state: &AppState, id: &str, role: Role, active: bool) -> StoredUser {
        let user = StoredUser {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            role,
            is_active: active,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: None,
            department: None,
            avatar: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        UserRepository::new(&state.storage).create(&user).unwrap();
        user
    }

    fn request_parts(auth_header: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(header) = auth_header {
            builder = builder.header("Authorization", header);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let (state, _temp) = create_test_state();
        let mut parts = request_parts(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn non_bearer_header_is_401() {
        let (state, _temp) = create_test_state();
        let mut parts = request_parts(Some("Basic dXNlcjpwYXNz".to_string()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn bad_signature_is_401() {
        let (state, _temp) = create_test_state();
        let user = seed_user(&state, "u-1", Role::Staff, true);

        let foreign = TokenService::new("some-other-secret", Duration::from_secs(3600));
        let token = foreign.issue_access_token(&user).unwrap();
        let mut parts = request_parts(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn valid_token_missing_principal_is_401() {
        let (state, _temp) = create_test_state();
        let user = seed_user(&state, "u-1", Role::Staff, true);
        let token = state.tokens.issue_access_token(&user).unwrap();

        UserRepository::new(&state.storage).delete("u-1").unwrap();

        let mut parts = request_parts(Some(format!("Bearer {token}")));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::PrincipalRejected)));
    }

    #[tokio::test]
    async fn valid_token_inactive_principal_is_401() {
        let (state, _temp) = create_test_state();
        let user = seed_user(&state, "u-1", Role::Staff, false);
        let token = state.tokens.issue_access_token(&user).unwrap();

        let mut parts = request_parts(Some(format!("Bearer {token}")));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::PrincipalRejected)));
    }

    #[tokio::test]
    async fn valid_token_active_principal_succeeds() {
        let (state, _temp) = create_test_state();
        let user = seed_user(&state, "u-1", Role::Staff, true);
        let token = state.tokens.issue_access_token(&user).unwrap();

        let mut parts = request_parts(Some(format!("Bearer {token}")));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        let Auth(authed) = result.expect("authentication succeeds");
        assert_eq!(authed.user_id, "u-1");
        assert_eq!(authed.role, Role::Staff);
    }

    #[tokio::test]
    async fn authentication_touches_stale_last_login() {
        let (state, _temp) = create_test_state();
        let mut user = seed_user(&state, "u-1", Role::Staff, true);

        let repo = UserRepository::new(&state.storage);
        user.last_login = Some(Utc::now() - ChronoDuration::hours(3));
        repo.update(&user).unwrap();

        let token = state.tokens.issue_access_token(&user).unwrap();
        let mut parts = request_parts(Some(format!("Bearer {token}")));
        Auth::from_request_parts(&mut parts, &state).await.unwrap();

        let refreshed = repo.get("u-1").unwrap();
        let age = Utc::now() - refreshed.last_login.unwrap();
        assert!(age < ChronoDuration::minutes(1));
    }

    #[tokio::test]
    async fn admin_only_rejects_staff_with_403() {
        let (state, _temp) = create_test_state();
        let user = seed_user(&state, "u-1", Role::Staff, true);
        let token = state.tokens.issue_access_token(&user).unwrap();

        let mut parts = request_parts(Some(format!("Bearer {token}")));
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin_roles() {
        let (state, _temp) = create_test_state();

        for (id, role) in [("u-admin", Role::Admin), ("u-root", Role::SuperAdmin)] {
            let user = seed_user(&state, id, role, true);
            let token = state.tokens.issue_access_token(&user).unwrap();
            let mut parts = request_parts(Some(format!("Bearer {token}")));

            let result = AdminOnly::from_request_parts(&mut parts, &state).await;
            assert!(result.is_ok(), "{role} should pass the admin gate");
        }
    }

    #[tokio::test]
    async fn extractor_prefers_extensions() {
        let (state, _temp) = create_test_state();
        let mut parts = request_parts(None);

        let user = AuthenticatedUser {
            user_id: "u-from-middleware".to_string(),
            email: "mw@example.com".to_string(),
            role: Role::Admin,
            first_name: "M".to_string(),
            last_name: "W".to_string(),
        };
        parts.extensions.insert(user);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.user_id, "u-from-middleware");
    }
}
