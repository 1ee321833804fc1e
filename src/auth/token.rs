// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification (HS256).
//!
//! Two deliberately separate operations:
//!
//! - [`TokenService::verify`] performs cryptographic verification and
//!   returns `None` on any failure. Callers treat `None` as
//!   "unauthenticated", never as an exceptional condition.
//! - [`is_structurally_expired`] decodes **without** verifying the
//!   signature and only inspects `exp`. It exists for local expiry
//!   pre-checks on the client; its claims are never trusted for
//!   authentication.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;
use crate::config::REFRESH_TOKEN_LIFETIME;
use crate::storage::StoredUser;

/// Clock skew tolerance for signature verification (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

struct TokenServiceInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime: Duration,
}

/// Issues and verifies HS256-signed tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<TokenServiceInner>,
}

impl TokenService {
    /// Create a token service from the signing secret and the configured
    /// access token lifetime.
    pub fn new(secret: &str, access_lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(TokenServiceInner {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                access_lifetime,
            }),
        }
    }

    /// Issue a short-lived access token for a principal.
    pub fn issue_access_token(&self, user: &StoredUser) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_lifetime(user, self.inner.access_lifetime)
    }

    /// Issue a 30-day refresh token for a principal.
    pub fn issue_refresh_token(&self, user: &StoredUser) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_lifetime(user, REFRESH_TOKEN_LIFETIME)
    }

    /// Issue a token with an explicit validity window.
    pub fn issue_with_lifetime(
        &self,
        user: &StoredUser,
        lifetime: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = Utc::now().timestamp();
        let exp = iat + lifetime.as_secs() as i64;
        let claims = Claims::from_user(user, iat, exp);
        encode(&Header::default(), &claims, &self.inner.encoding)
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Any failure (bad signature, malformed token, expired `exp`) yields
    /// `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        match decode::<Claims>(token, &self.inner.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "token verification failed");
                None
            }
        }
    }
}

/// Extract the expiry instant (Unix milliseconds) without verifying the
/// signature. Returns `None` when the token cannot be decoded.
pub fn expiration_millis(token: &str) -> Option<i64> {
    let data = jsonwebtoken::dangerous::insecure_decode::<Claims>(token).ok()?;
    Some(data.claims.exp * 1000)
}

/// Check expiry without verifying the signature (fail-closed).
///
/// A token that cannot be decoded at all counts as expired. The decoded
/// claims are discarded; only [`TokenService::verify`] may vouch for them.
pub fn is_structurally_expired(token: &str) -> bool {
    match expiration_millis(token) {
        Some(exp_ms) => Utc::now().timestamp_millis() >= exp_ms,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    pub(crate) fn test_user() -> StoredUser {
        StoredUser {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
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
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret-key-12345", Duration::from_secs(8 * 3600))
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let tokens = service();
        let user = test_user();

        let token = tokens.issue_access_token(&user).unwrap();
        let claims = tokens.verify(&token).expect("token verifies");

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, user.role);
        assert_eq!(claims.first_name, "Jane");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let tokens = service();
        let other = TokenService::new("different-secret", Duration::from_secs(3600));
        let token = tokens.issue_access_token(&test_user()).unwrap();

        assert!(other.verify(&token).is_none());
        assert!(tokens.verify(&token).is_some());
    }

    #[test]
    fn expired_token_fails_verification() {
        let tokens = service();
        // Expired two hours ago, well past the leeway.
        let token = tokens
            .issue_with_lifetime(&test_user(), Duration::ZERO)
            .unwrap();
        // exp == iat == now, still within leeway; push further into the past
        // by crafting an explicitly old window instead.
        let iat = Utc::now().timestamp() - 7200;
        let claims = Claims::from_user(&test_user(), iat, iat + 60);
        let old = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(tokens.verify(&old).is_none());
        assert!(is_structurally_expired(&old));
        // The zero-lifetime token is structurally expired immediately.
        assert!(is_structurally_expired(&token));
    }

    #[test]
    fn malformed_token_fails_closed() {
        let tokens = service();

        for garbage in ["", "not-a-token", "a.b", "a.b.c.d", "only one segment"] {
            assert!(tokens.verify(garbage).is_none());
            assert!(is_structurally_expired(garbage));
            assert!(expiration_millis(garbage).is_none());
        }
    }

    #[test]
    fn refresh_token_lives_thirty_days() {
        let tokens = service();
        let token = tokens.issue_refresh_token(&test_user()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn expiration_millis_matches_exp_claim() {
        let tokens = service();
        let token = tokens.issue_access_token(&test_user()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(expiration_millis(&token), Some(claims.exp * 1000));
    }

    #[test]
    fn token_has_three_segments() {
        let tokens = service();
        let token = tokens.issue_access_token(&test_user()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
