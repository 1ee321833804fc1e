// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        ChangePasswordRequest, ClientListResponse, CreateClientRequest, CreateInquiryRequest,
        CreateProjectRequest, CreateUserRequest, InquiryListResponse, LoginRequest, LoginResponse,
        MessageResponse, Pagination, ProjectListResponse, RefreshRequest, RefreshResponse,
        ResetPasswordRequest, SetupRequest, SetupStatusResponse, UpdateClientRequest,
        UpdateInquiryRequest, UpdateProfileRequest, UpdateProjectRequest, UpdateSettingsRequest,
        UpdateUserRequest, UserListResponse, UserPublic,
    },
    state::AppState,
    storage::{ActivityEntry, Settings, StoredClient, StoredInquiry, StoredProject},
};

pub mod activity;
pub mod auth;
pub mod clients;
pub mod health;
pub mod inquiries;
pub mod projects;
pub mod settings;
pub mod setup;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/auth/profile/password", put(auth::change_password))
        .route(
            "/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/admin/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/admin/users/{user_id}/password", put(users::reset_password))
        .route("/admin/activity", get(activity::query_activity))
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/{client_id}",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/inquiries",
            get(inquiries::list_inquiries).post(inquiries::create_inquiry),
        )
        .route(
            "/inquiries/{inquiry_id}",
            get(inquiries::get_inquiry)
                .put(inquiries::update_inquiry)
                .delete(inquiries::delete_inquiry),
        )
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/setup", get(setup::setup_status).post(setup::run_setup))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::refresh,
        auth::logout,
        auth::get_profile,
        auth::update_profile,
        auth::change_password,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::reset_password,
        activity::query_activity,
        clients::list_clients,
        clients::create_client,
        clients::get_client,
        clients::update_client,
        clients::delete_client,
        inquiries::list_inquiries,
        inquiries::create_inquiry,
        inquiries::get_inquiry,
        inquiries::update_inquiry,
        inquiries::delete_inquiry,
        projects::list_projects,
        projects::create_project,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        settings::get_settings,
        settings::update_settings,
        setup::setup_status,
        setup::run_setup,
        health::health,
        health::ready
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            RefreshResponse,
            MessageResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            CreateUserRequest,
            UpdateUserRequest,
            ResetPasswordRequest,
            UserListResponse,
            UserPublic,
            Pagination,
            CreateClientRequest,
            UpdateClientRequest,
            ClientListResponse,
            StoredClient,
            CreateInquiryRequest,
            UpdateInquiryRequest,
            InquiryListResponse,
            StoredInquiry,
            CreateProjectRequest,
            UpdateProjectRequest,
            ProjectListResponse,
            StoredProject,
            UpdateSettingsRequest,
            Settings,
            ActivityEntry,
            activity::ActivityListResponse,
            SetupRequest,
            SetupStatusResponse,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    tags(
        (name = "Auth", description = "Session lifecycle and profile"),
        (name = "Users", description = "User administration"),
        (name = "Activity", description = "Activity log queries"),
        (name = "Clients", description = "Client management"),
        (name = "Inquiries", description = "Inquiry intake and triage"),
        (name = "Projects", description = "Project management"),
        (name = "Settings", description = "Panel settings"),
        (name = "Setup", description = "One-time bootstrap"),
        (name = "Health", description = "Probes")
    )
)]
struct ApiDoc;
