// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository for the document store.
//!
//! Each user is stored as a separate JSON file under `users/`. Email
//! uniqueness is enforced here with a check-then-insert sequence; two
//! concurrent creates with the same email can race. The document store has
//! no uniqueness primitive, so the race is documented and accepted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::super::{DocumentStore, StorageError, StorageResult};
use super::{matches_search, paginate, SortOrder};
use crate::auth::Role;

/// User record as persisted on disk.
///
/// The password hash is part of the stored document but must never reach an
/// API response; handlers convert to a sanitized view before serializing
/// outward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Lowercase email, globally unique
    pub email: String,
    /// bcrypt password hash
    pub password_hash: String,
    /// Authorization role
    pub role: Role,
    /// Whether the account may authenticate
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Last authenticated request older than one hour triggers a refresh
    /// of this stamp in the auth middleware.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter, sort and pagination parameters for user listings.
#[derive(Debug, Clone)]
pub struct UserFilter {
    /// Substring match over first name, last name, email and department.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub department: Option<String>,
    /// One of `firstName`, `lastName`, `email`, `role`, `createdAt`,
    /// `lastLogin`. Unknown fields fall back to `createdAt`.
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            search: None,
            role: None,
            is_active: None,
            department: None,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 10,
        }
    }
}

/// Repository for user operations on the document store.
pub struct UserRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if a user exists.
    pub fn exists(&self, user_id: &str) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Get a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StorageResult<StoredUser> {
        let email = email.to_lowercase();
        for id in self.list_ids()? {
            if let Ok(user) = self.get(&id) {
                if user.email == email {
                    return Ok(user);
                }
            }
        }
        Err(StorageError::NotFound(format!("User with email {email}")))
    }

    /// Create a new user.
    ///
    /// Rejects duplicate ids and duplicate emails. The email check is
    /// check-then-insert; a concurrent create with the same email can slip
    /// through (known gap, single-instance deployment).
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.exists(&user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }

        if self.find_by_email(&user.email).is_ok() {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Update an existing user.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        if !self.exists(&user.id) {
            return Err(StorageError::NotFound(format!("User {}", user.id)));
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Delete a user.
    pub fn delete(&self, user_id: &str) -> StorageResult<()> {
        if !self.exists(user_id) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.delete(self.storage.paths().user(user_id))
    }

    /// Refresh the last-login stamp when it is unset or older than an hour.
    ///
    /// Returns whether a write happened.
    pub fn touch_last_login(&self, user_id: &str) -> StorageResult<bool> {
        let mut user = self.get(user_id)?;
        let one_hour_ago = Utc::now() - Duration::hours(1);

        let stale = user.last_login.is_none_or(|t| t < one_hour_ago);
        if !stale {
            return Ok(false);
        }

        user.last_login = Some(Utc::now());
        self.update(&user)?;
        Ok(true)
    }

    /// Count all users.
    pub fn count(&self) -> StorageResult<usize> {
        Ok(self.list_ids()?.len())
    }

    /// Check whether an active super admin exists (bootstrap probe).
    pub fn has_active_super_admin(&self) -> StorageResult<bool> {
        for id in self.list_ids()? {
            if let Ok(user) = self.get(&id) {
                if user.role == Role::SuperAdmin && user.is_active {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// List users with filtering, sorting and pagination.
    ///
    /// Returns the page plus the total match count before pagination.
    pub fn list(&self, filter: &UserFilter) -> StorageResult<(Vec<StoredUser>, usize)> {
        let mut users: Vec<StoredUser> = Vec::new();
        for id in self.list_ids()? {
            if let Ok(user) = self.get(&id) {
                users.push(user);
            }
        }

        users.retain(|u| {
            let search_ok = filter.search.as_deref().is_none_or(|s| {
                matches_search(&u.first_name, s)
                    || matches_search(&u.last_name, s)
                    || matches_search(&u.email, s)
                    || u.department.as_deref().is_some_and(|d| matches_search(d, s))
            });
            search_ok
                && filter.role.is_none_or(|r| u.role == r)
                && filter.is_active.is_none_or(|a| u.is_active == a)
                && filter
                    .department
                    .as_deref()
                    .is_none_or(|d| u.department.as_deref().is_some_and(|ud| matches_search(ud, d)))
        });

        sort_users(&mut users, &filter.sort_by, filter.sort_order);
        Ok(paginate(users, filter.page, filter.limit))
    }

    fn list_ids(&self) -> StorageResult<Vec<String>> {
        self.storage
            .list_files(self.storage.paths().users_dir(), "json")
    }
}

fn sort_users(users: &mut [StoredUser], sort_by: &str, order: SortOrder) {
    users.sort_by(|a, b| {
        let ord = match sort_by {
            "firstName" => a.first_name.cmp(&b.first_name),
            "lastName" => a.last_name.cmp(&b.last_name),
            "email" => a.email.cmp(&b.email),
            "role" => a.role.to_string().cmp(&b.role.to_string()),
            "lastLogin" => a.last_login.cmp(&b.last_login),
            _ => a.created_at.cmp(&b.created_at),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
