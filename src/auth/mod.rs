// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT session authentication for the admin panel API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with email + password (`POST /v1/auth/login`)
//! 2. Server issues an HS256 access token (default 8 h) and a 30-day
//!    refresh token
//! 3. Every subsequent request sends `Authorization: Bearer <token>`
//! 4. The `Auth` extractor:
//!    - verifies signature and expiry against the server secret
//!    - re-fetches the principal and rejects missing/inactive accounts
//!    - refreshes the last-login stamp when stale (> 1 hour)
//! 5. `AdminOnly` additionally enforces the admin role allow-list
//!
//! ## Security
//!
//! - Tokens are stateless; there is no server-side revocation list.
//!   Deactivating an account is the instant kill switch (step 4).
//! - All 401 responses share one generic body; the rejected check is
//!   never disclosed.
//! - Clock skew tolerance for verification is 60 seconds.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod rate_limit;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, Claims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use rate_limit::RateLimiter;
pub use roles::Role;
pub use token::{expiration_millis, is_structurally_expired, TokenService};
