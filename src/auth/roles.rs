// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `SuperAdmin` - Full access, including managing admin accounts
/// - `Admin` - Full access to admin endpoints, cannot manage admins
/// - `Staff` - Regular panel user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, may manage other admins
    SuperAdmin,
    /// Administrative access
    Admin,
    /// Regular staff user
    Staff,
}

impl Role {
    /// Whether this role clears the admin gate (`super_admin` or `admin`).
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Whether this role is in the given allow-list. An empty list means
    /// "any authenticated user".
    pub fn is_allowed(&self, allowed: &[Role]) -> bool {
        allowed.is_empty() || allowed.contains(self)
    }

    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is Staff (least privilege).
    fn default() -> Self {
        Role::Staff
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::SuperAdmin => write!(f, "super_admin"),
            Role::Admin => write!(f, "admin"),
            Role::Staff => write!(f, "staff"),
        }
    }
}
