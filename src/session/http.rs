// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated HTTP client over the session manager.
//!
//! Attaches the bearer token from [`SessionManager::get_valid_token`] and
//! retries exactly once after a 401 by forcing a refresh. When the retry
//! fails too the session is terminated and the caller gets a
//! session-expired response; the embedder redirects to its login surface.

use reqwest::Method;
use serde_json::Value;

use super::manager::SessionManager;
use super::transport::SessionError;

/// Outcome of an API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub success: bool,
    pub status: u16,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ApiResponse {
    fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// HTTP client wrapper with automatic token handling.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionManager,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, session: SessionManager) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    /// The session manager this client authenticates with.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, SessionError> {
        self.request(Method::GET, path, None, true).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, SessionError> {
        self.request(Method::POST, path, Some(body), true).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, SessionError> {
        self.request(Method::PUT, path, Some(body), true).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, SessionError> {
        self.request(Method::DELETE, path, None, true).await
    }

    /// Perform a request, attaching and (once) refreshing the session
    /// token when `require_auth` is set.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        require_auth: bool,
    ) -> Result<ApiResponse, SessionError> {
        let token = if require_auth {
            match self.session.get_valid_token().await {
                Some(token) => Some(token),
                None => return Ok(ApiResponse::failure(401, "Authentication required")),
            }
        } else {
            None
        };

        let response = self.send(method.clone(), path, body.clone(), token).await?;

        if response.status().as_u16() == 401 && require_auth {
            // The server may have rejected a token our local expiry check
            // still considered fine. Force one refresh, retry once.
            if let Ok(refreshed) = self.session.refresh().await {
                let retry = self.send(method, path, body, Some(refreshed)).await?;
                if retry.status().is_success() {
                    return Self::into_api_response(retry).await;
                }
            }

            // Terminal: the caller must re-authenticate.
            self.session.logout().await;
            return Ok(ApiResponse::failure(
                401,
                "Session expired. Please login again.",
            ));
        }

        Self::into_api_response(response).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<String>,
    ) -> Result<reqwest::Response, SessionError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        request
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }

    async fn into_api_response(response: reqwest::Response) -> Result<ApiResponse, SessionError> {
        let status = response.status();
        let data: Option<Value> = response.json().await.ok();

        if status.is_success() {
            Ok(ApiResponse {
                success: true,
                status: status.as_u16(),
                data,
                error: None,
            })
        } else {
            let error = data
                .as_ref()
                .and_then(|d| d.get("error"))
                .and_then(|e| e.as_str())
                .unwrap_or("Request failed")
                .to_string();
            Ok(ApiResponse {
                success: false,
                status: status.as_u16(),
                data,
                error: Some(error),
            })
        }
    }
}
