// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;
use crate::storage::StoredUser;

/// Claims carried by both access and refresh tokens.
///
/// Wire names are camelCase for compatibility with the admin frontend:
/// `{userId, email, role, firstName, lastName, iat, exp}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject: the user's unique id
    pub user_id: String,
    /// User's email at issuance time
    pub email: String,
    /// User's role at issuance time
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Snapshot a principal into token claims with the given validity window.
    pub fn from_user(user: &StoredUser, iat: i64, exp: i64) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            iat,
            exp,
        }
    }
}

/// Authenticated user information extracted from a verified token.
///
/// This is the primary type handlers use to represent the user making the
/// request. It is a claims snapshot; handlers needing the live record
/// re-fetch it from the user repository.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Canonical user ID (token subject)
    pub user_id: String,
    /// Email claim
    pub email: String,
    /// Role claim
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            first_name: claims.first_name,
            last_name: claims.last_name,
        }
    }
}

impl AuthenticatedUser {
    /// Check this user against a role allow-list. An empty list allows any
    /// authenticated user.
    pub fn is_allowed(&self, allowed: &[Role]) -> bool {
        self.role.is_allowed(allowed)
    }

    /// Check if this user clears the admin gate.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
