// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server transport for the session client.
//!
//! The trait seam lets tests count and gate refresh calls; production code
//! uses [`HttpAuthTransport`] over reqwest.

use async_trait::async_trait;
use serde::Deserialize;

/// Session client errors.
///
/// `Clone` because a refresh outcome is shared verbatim with every caller
/// coalesced onto the same in-flight operation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// No session state is available locally
    #[error("No session available")]
    NoSession,
    /// The server rejected the refresh token
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
    /// Transport-level failure (network, serialization)
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Auth endpoints the session client needs from the server.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError>;

    /// Best-effort logout notification (audit only).
    async fn logout(&self, access_token: &str) -> Result<(), SessionError>;
}

#[derive(Deserialize)]
struct RefreshBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation over the admin panel API.
pub struct HttpAuthTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthTransport {
    /// Create a transport for the API at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuthTransport for HttpAuthTransport {
    async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError> {
        let url = format!("{}/v1/auth/refresh", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status();
        let body: RefreshBody = response
            .json()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        match (status.is_success() && body.success, body.token) {
            (true, Some(token)) => Ok(token),
            _ => Err(SessionError::RefreshFailed(
                body.error.unwrap_or_else(|| format!("HTTP {status}")),
            )),
        }
    }

    async fn logout(&self, access_token: &str) -> Result<(), SessionError> {
        let url = format!("{}/v1/auth/logout", self.base_url);
        self.http
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        Ok(())
    }
}
