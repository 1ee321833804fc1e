// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Document storage probe result.
    pub storage: String,
}

/// Liveness probe. Always 200 while the process runs.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe. Runs a write-read-delete probe against storage.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "All checks pass", body = ReadyResponse),
        (status = 503, description = "Storage unavailable", body = ReadyResponse),
    )
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    match state.storage.health_check() {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ok".to_string(),
                storage: "ok".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "storage readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "degraded".to_string(),
                    storage: "unavailable".to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use crate::storage::{DocumentStore, StoragePaths};
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn health_is_ok() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn ready_reports_storage_state() {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let state = AppState::new(
            storage,
            TokenService::new("health-test-secret", Duration::from_secs(3600)),
        );

        let (status, Json(response)) = ready(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.storage, "ok");
    }

    #[tokio::test]
    async fn ready_degrades_without_initialized_storage() {
        let storage = DocumentStore::new(StoragePaths::new("/nonexistent/ready-probe"));
        let state = AppState::new(
            storage,
            TokenService::new("health-test-secret", Duration::from_secs(3600)),
        );

        let (status, Json(response)) = ready(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, "degraded");
    }
}
