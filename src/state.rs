// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use crate::auth::{RateLimiter, TokenService};
use crate::storage::DocumentStore;

/// Credentials for the one-time bootstrap admin.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            email: "admin@opsdesk.local".to_string(),
            password: "Admin123!".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub storage: DocumentStore,
    pub tokens: TokenService,
    pub rate_limiter: RateLimiter,
    pub bootstrap_admin: BootstrapAdmin,
}

impl AppState {
    pub fn new(storage: DocumentStore, tokens: TokenService) -> Self {
        Self {
            storage,
            tokens,
            rate_limiter: RateLimiter::new(100, Duration::from_secs(15 * 60)),
            bootstrap_admin: BootstrapAdmin::default(),
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_bootstrap_admin(mut self, bootstrap_admin: BootstrapAdmin) -> Self {
        self.bootstrap_admin = bootstrap_admin;
        self
    }
}
