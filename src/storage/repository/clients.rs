// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client repository for the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStore, StorageError, StorageResult};
use super::{matches_search, paginate, Note, SortOrder};

/// Lifecycle status of a client relationship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
    Prospect,
    Former,
}

impl Default for ClientStatus {
    fn default() -> Self {
        ClientStatus::Prospect
    }
}

/// How the client relationship originated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClientSource {
    Inquiry,
    Referral,
    ColdOutreach,
    Conference,
    SocialMedia,
    Other,
}

impl Default for ClientSource {
    fn default() -> Self {
        ClientSource::Inquiry
    }
}

/// Postal address. Every field optional; absent fields stay off the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Client record as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredClient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Lowercase email, unique across clients
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub source: ClientSource,
    /// User id this client is assigned to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter, sort and pagination parameters for client listings.
#[derive(Debug, Clone)]
pub struct ClientFilter {
    /// Substring match over first name, last name, email and company.
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub industry: Option<String>,
    pub assigned_to: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl Default for ClientFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            industry: None,
            assigned_to: None,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 10,
        }
    }
}

/// Repository for client operations on the document store.
pub struct ClientRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> ClientRepository<'a> {
    /// Create a new ClientRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if a client exists.
    pub fn exists(&self, client_id: &str) -> bool {
        self.storage.exists(self.storage.paths().client(client_id))
    }

    /// Get a client by ID.
    pub fn get(&self, client_id: &str) -> StorageResult<StoredClient> {
        let path = self.storage.paths().client(client_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Client {client_id}")));
        }
        self.storage.read_json(path)
    }

    /// Get a client by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StorageResult<StoredClient> {
        let email = email.to_lowercase();
        for id in self.list_ids()? {
            if let Ok(client) = self.get(&id) {
                if client.email == email {
                    return Ok(client);
                }
            }
        }
        Err(StorageError::NotFound(format!("Client with email {email}")))
    }

    /// Create a new client. Duplicate emails are rejected.
    pub fn create(&self, client: &StoredClient) -> StorageResult<()> {
        if self.exists(&client.id) {
            return Err(StorageError::AlreadyExists(format!("Client {}", client.id)));
        }

        if self.find_by_email(&client.email).is_ok() {
            return Err(StorageError::AlreadyExists(format!(
                "Client with email {}",
                client.email
            )));
        }

        self.storage
            .write_json(self.storage.paths().client(&client.id), client)
    }

    /// Update an existing client.
    pub fn update(&self, client: &StoredClient) -> StorageResult<()> {
        if !self.exists(&client.id) {
            return Err(StorageError::NotFound(format!("Client {}", client.id)));
        }

        self.storage
            .write_json(self.storage.paths().client(&client.id), client)
    }

    /// Delete a client.
    pub fn delete(&self, client_id: &str) -> StorageResult<()> {
        if !self.exists(client_id) {
            return Err(StorageError::NotFound(format!("Client {client_id}")));
        }
        self.storage.delete(self.storage.paths().client(client_id))
    }

    /// Count all clients.
    pub fn count(&self) -> StorageResult<usize> {
        Ok(self.list_ids()?.len())
    }

    /// List clients with filtering, sorting and pagination.
    pub fn list(&self, filter: &ClientFilter) -> StorageResult<(Vec<StoredClient>, usize)> {
        let mut clients: Vec<StoredClient> = Vec::new();
        for id in self.list_ids()? {
            if let Ok(client) = self.get(&id) {
                clients.push(client);
            }
        }

        clients.retain(|c| {
            let search_ok = filter.search.as_deref().is_none_or(|s| {
                matches_search(&c.first_name, s)
                    || matches_search(&c.last_name, s)
                    || matches_search(&c.email, s)
                    || c.company.as_deref().is_some_and(|v| matches_search(v, s))
            });
            search_ok
                && filter.status.is_none_or(|st| c.status == st)
                && filter
                    .industry
                    .as_deref()
                    .is_none_or(|i| c.industry.as_deref().is_some_and(|ci| matches_search(ci, i)))
                && filter
                    .assigned_to
                    .as_deref()
                    .is_none_or(|a| c.assigned_to.as_deref() == Some(a))
        });

        sort_clients(&mut clients, &filter.sort_by, filter.sort_order);
        Ok(paginate(clients, filter.page, filter.limit))
    }

    fn list_ids(&self) -> StorageResult<Vec<String>> {
        self.storage
            .list_files(self.storage.paths().clients_dir(), "json")
    }
}

fn sort_clients(clients: &mut [StoredClient], sort_by: &str, order: SortOrder) {
    clients.sort_by(|a, b| {
        let ord = match sort_by {
            "firstName" => a.first_name.cmp(&b.first_name),
            "lastName" => a.last_name.cmp(&b.last_name),
            "email" => a.email.cmp(&b.email),
            "company" => a.company.cmp(&b.company),
            _ => a.created_at.cmp(&b.created_at),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
