// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every 401 collapses to the same generic body on the wire, so a caller
//! cannot tell which check rejected the request. The precise reason is
//! kept in the variant for logging and tests only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header, or not a `Bearer ` header
    #[error("Authorization header missing or malformed")]
    MissingToken,
    /// Token failed signature or expiry verification
    #[error("Token verification failed")]
    InvalidToken,
    /// Token verified but the principal is gone or deactivated
    #[error("Principal missing or inactive")]
    PrincipalRejected,
    /// Valid session, role not in the allow-list
    #[error("Insufficient permissions for this operation")]
    InsufficientPermissions,
    /// Internal error during authentication
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::PrincipalRejected => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire message. Generic for the whole 401 class.
    fn public_message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "Invalid or expired token",
            StatusCode::FORBIDDEN => "Insufficient permissions",
            _ => "Authentication failed",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "authentication failed unexpectedly");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = Json(AuthErrorBody {
            error: self.public_message().to_string(),
        });
        (status, body).into_response()
    }
}
