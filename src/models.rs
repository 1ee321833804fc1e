// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation; request bodies additionally derive `Validate`.
//!
//! The [`UserPublic`] view is the only user shape that ever leaves the
//! API: it has no password field at all, so the hash cannot leak through
//! serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Role;
use crate::storage::repository::clients::Address;
use crate::storage::{
    ClientSource, ClientStatus, InquirySource, InquiryStatus, Milestone, Priority, ProjectStatus,
    StoredUser,
};

// =============================================================================
// Pagination
// =============================================================================

/// Pagination block returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Build the block from the request page/limit and the total match
    /// count.
    pub fn new(page: usize, limit: usize, total_items: usize) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let total_pages = total_items.div_ceil(limit);
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

// =============================================================================
// User Views
// =============================================================================

/// Sanitized user record. The stored password hash is not part of this
/// type, so it cannot appear in any response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredUser> for UserPublic {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            department: user.department,
            avatar: user.avatar,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// =============================================================================
// Auth Requests / Responses
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login response with the token pair and a sanitized user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub user: UserPublic,
    pub message: String,
}

/// Token refresh request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Token refresh response. Only the access token is re-issued.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}

/// Generic success envelope for operations without a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Self-service profile update (no role or active-flag changes).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
}

/// Password change request (self-service).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

// =============================================================================
// User Administration
// =============================================================================

/// Admin request to create a user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
}

/// Admin request to update a user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub is_active: Option<bool>,
}

/// Admin password reset.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Response for user listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserPublic>,
    pub pagination: Pagination,
}

// =============================================================================
// Clients
// =============================================================================

/// Request to create a client.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    pub address: Option<Address>,
    pub website: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[serde(default)]
    pub source: ClientSource,
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to update a client.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    pub address: Option<Address>,
    pub website: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    pub status: Option<ClientStatus>,
    pub source: Option<ClientSource>,
    pub assigned_to: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_archived: Option<bool>,
}

/// Response for client listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientListResponse {
    pub clients: Vec<crate::storage::StoredClient>,
    pub pagination: Pagination,
}

// =============================================================================
// Inquiries
// =============================================================================

/// Public contact-form submission.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,
    #[validate(length(min = 1, max = 50, message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub source: InquirySource,
}

/// Request to update an inquiry.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInquiryRequest {
    pub status: Option<InquiryStatus>,
    pub priority: Option<Priority>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_archived: Option<bool>,
    /// Appends a note authored by the caller.
    #[validate(length(min = 1, max = 1000))]
    pub note: Option<String>,
}

/// Response for inquiry listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct InquiryListResponse {
    pub inquiries: Vec<crate::storage::StoredInquiry>,
    pub pagination: Pagination,
}

// =============================================================================
// Projects
// =============================================================================

/// Request to create a project.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Project title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Project description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Client is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "At least one team member must be assigned"))]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[validate(length(min = 1, max = 50, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "At least one service is required"))]
    pub services: Vec<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 0.0))]
    pub estimated_hours: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

/// Request to update a project.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    pub assigned_to: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    pub services: Option<Vec<String>>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 0.0))]
    pub estimated_hours: Option<f64>,
    #[validate(range(min = 0.0))]
    pub actual_hours: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    /// Manual progress; ignored whenever milestones exist.
    #[validate(range(min = 0, max = 100))]
    pub progress: Option<u8>,
    pub tags: Option<Vec<String>>,
    pub milestones: Option<Vec<Milestone>>,
    pub is_archived: Option<bool>,
}

/// Response for project listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub projects: Vec<crate::storage::StoredProject>,
    pub pagination: Pagination,
}

// =============================================================================
// Settings
// =============================================================================

/// Request to replace one settings section.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    /// One of `general`, `notifications`, `security`, `appearance`,
    /// `integrations`, `backup`.
    pub section: String,
    /// Section payload, validated against the section's schema.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

// =============================================================================
// Setup
// =============================================================================

/// Bootstrap status probe.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatusResponse {
    pub user_count: usize,
    pub has_admin: bool,
    pub storage_ready: bool,
}

/// Bootstrap action request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetupRequest {
    /// Only `create-admin` is recognized.
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn pagination_math() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);

        let p = Pagination::new(3, 10, 25);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);

        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
    }

    #[test]
    fn user_public_has_no_password_field() {
        let user = StoredUser {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: Role::Staff,
            is_active: true,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            department: None,
            avatar: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public: UserPublic = user.into();
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$12$secret"));
    }

    #[test]
    fn login_request_validation() {
        let ok = LoginRequest {
            email: "jane@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_password = LoginRequest {
            email: "jane@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn create_user_request_validates_password_length() {
        let req = CreateUserRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "short".to_string(),
            role: Role::Staff,
            phone: None,
            department: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_project_requires_assignee_and_service() {
        let req = CreateProjectRequest {
            title: "Site".to_string(),
            description: "Rebuild".to_string(),
            client_id: "c-1".to_string(),
            assigned_to: vec![],
            status: ProjectStatus::Planning,
            priority: Priority::Medium,
            category: "web".to_string(),
            services: vec![],
            budget: None,
            estimated_hours: None,
            start_date: None,
            end_date: None,
            deadline: None,
            tags: vec![],
            milestones: vec![],
        };
        assert!(req.validate().is_err());
    }
}
