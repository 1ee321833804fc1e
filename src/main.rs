// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use opsdesk_server::api::router;
use opsdesk_server::auth::{RateLimiter, TokenService};
use opsdesk_server::config::Config;
use opsdesk_server::state::{AppState, BootstrapAdmin};
use opsdesk_server::storage::{DocumentStore, StoragePaths};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env();

    // Initialize document storage
    let mut storage = DocumentStore::new(StoragePaths::new(&config.data_dir));
    storage
        .initialize()
        .expect("Failed to initialize document storage");

    let tokens = TokenService::new(&config.jwt_secret, config.access_token_lifetime);
    let rate_limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window);

    let state = AppState::new(storage, tokens)
        .with_rate_limiter(rate_limiter)
        .with_bootstrap_admin(BootstrapAdmin {
            email: config.default_admin_email.clone(),
            password: config.default_admin_password.clone(),
        });
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(
        %addr,
        data_dir = %config.data_dir.display(),
        access_token_lifetime_secs = config.access_token_lifetime.as_secs(),
        "Opsdesk server listening (docs at /docs)"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        // Without a signal handler, park forever rather than exit early.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
    // Give in-flight requests a moment to complete.
    tokio::time::sleep(Duration::from_millis(100)).await;
}
