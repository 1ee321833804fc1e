// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{ClientListResponse, CreateClientRequest, MessageResponse, Pagination, UpdateClientRequest},
    state::AppState,
    storage::{
        log_activity, ActivityEntry, Category, ClientFilter, ClientRepository, ClientStatus,
        Severity, SortOrder, StoredClient,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ClientsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub industry: Option<String>,
    pub assigned_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl From<ClientsQuery> for ClientFilter {
    fn from(q: ClientsQuery) -> Self {
        let defaults = ClientFilter::default();
        ClientFilter {
            search: q.search,
            status: q.status,
            industry: q.industry,
            assigned_to: q.assigned_to,
            sort_by: q.sort_by.unwrap_or(defaults.sort_by),
            sort_order: q.sort_order.unwrap_or(defaults.sort_order),
            page: q.page.unwrap_or(defaults.page),
            limit: q.limit.unwrap_or(defaults.limit),
        }
    }
}

/// List clients with filtering, sorting and pagination.
#[utoipa::path(
    get,
    path = "/v1/clients",
    params(ClientsQuery),
    tag = "Clients",
    security(("bearer" = [])),
    responses((status = 200, description = "Page of clients", body = ClientListResponse))
)]
pub async fn list_clients(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<ClientsQuery>,
) -> Result<Json<ClientListResponse>, ApiError> {
    let filter: ClientFilter = query.into();
    let (page, limit) = (filter.page, filter.limit);

    let (clients, total) = ClientRepository::new(&state.storage).list(&filter)?;

    Ok(Json(ClientListResponse {
        clients,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Create a new client.
#[utoipa::path(
    post,
    path = "/v1/clients",
    request_body = CreateClientRequest,
    tag = "Clients",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created client", body = StoredClient),
        (status = 400, description = "Validation failure or duplicate email"),
    )
)]
pub async fn create_client(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<StoredClient>), ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = ClientRepository::new(&state.storage);
    let email = payload.email.to_lowercase();
    if repo.find_by_email(&email).is_ok() {
        return Err(ApiError::bad_request("Email address is already registered"));
    }

    let client = StoredClient {
        id: uuid::Uuid::new_v4().to_string(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        email,
        phone: payload.phone,
        company: payload.company,
        position: payload.position,
        address: payload.address,
        website: payload.website,
        industry: payload.industry,
        status: ClientStatus::default(),
        source: payload.source,
        assigned_to: payload.assigned_to,
        tags: payload.tags,
        notes: Vec::new(),
        is_archived: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    repo.create(&client)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "CREATE_CLIENT",
            "client",
            format!("Created new client: {} {}", client.first_name, client.last_name),
            Category::Client,
        )
        .with_severity(Severity::Medium)
        .with_resource_id(&client.id)
        .with_metadata(serde_json::json!({
            "company": client.company,
            "industry": client.industry,
            "source": client.source,
            "createdBy": user.user_id,
        })),
    );

    Ok((StatusCode::CREATED, Json(client)))
}

/// Get a single client.
#[utoipa::path(
    get,
    path = "/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    tag = "Clients",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Client", body = StoredClient),
        (status = 404, description = "No such client"),
    )
)]
pub async fn get_client(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredClient>, ApiError> {
    let client = ClientRepository::new(&state.storage)
        .get(&id)
        .map_err(|_| ApiError::not_found("Client not found"))?;
    Ok(Json(client))
}

/// Update a client.
#[utoipa::path(
    put,
    path = "/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    request_body = UpdateClientRequest,
    tag = "Clients",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated client", body = StoredClient),
        (status = 404, description = "No such client"),
    )
)]
pub async fn update_client(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<StoredClient>, ApiError> {
    payload.validate().map_err(|e| ApiError::validation(&e))?;

    let repo = ClientRepository::new(&state.storage);
    let mut client = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("Client not found"))?;

    if let Some(email) = &payload.email {
        let email = email.to_lowercase();
        if email != client.email {
            if repo.find_by_email(&email).is_ok() {
                return Err(ApiError::bad_request("Email address is already registered"));
            }
            client.email = email;
        }
    }

    if let Some(first_name) = payload.first_name {
        client.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        client.last_name = last_name;
    }
    if let Some(phone) = payload.phone {
        client.phone = Some(phone);
    }
    if let Some(company) = payload.company {
        client.company = Some(company);
    }
    if let Some(position) = payload.position {
        client.position = Some(position);
    }
    if let Some(address) = payload.address {
        client.address = Some(address);
    }
    if let Some(website) = payload.website {
        client.website = Some(website);
    }
    if let Some(industry) = payload.industry {
        client.industry = Some(industry);
    }
    if let Some(status) = payload.status {
        client.status = status;
    }
    if let Some(source) = payload.source {
        client.source = source;
    }
    if let Some(assigned_to) = payload.assigned_to {
        client.assigned_to = Some(assigned_to);
    }
    if let Some(tags) = payload.tags {
        client.tags = tags;
    }
    if let Some(is_archived) = payload.is_archived {
        client.is_archived = is_archived;
    }
    client.updated_at = Utc::now();
    repo.update(&client)?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &user.user_id,
            "UPDATE_CLIENT",
            "client",
            format!("Updated client: {} {}", client.first_name, client.last_name),
            Category::Client,
        )
        .with_resource_id(&client.id),
    );

    Ok(Json(client))
}

/// Delete a client (admin only).
#[utoipa::path(
    delete,
    path = "/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    tag = "Clients",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such client"),
    )
)]
pub async fn delete_client(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = ClientRepository::new(&state.storage);
    let client = repo
        .get(&id)
        .map_err(|_| ApiError::not_found("Client not found"))?;

    log_activity(
        &state.storage,
        ActivityEntry::new(
            &admin.user_id,
            "DELETE_CLIENT",
            "client",
            format!("Deleted client: {} {}", client.first_name, client.last_name),
            Category::Client,
        )
        .with_severity(Severity::High)
        .with_resource_id(&client.id),
    );

    repo.delete(&id)?;

    Ok(Json(MessageResponse::ok("Client deleted successfully")))
}
