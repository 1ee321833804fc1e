// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! Persistent storage over plain JSON documents under a data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   users/{user_id}.json
//!   clients/{client_id}.json
//!   inquiries/{inquiry_id}.json
//!   projects/{project_id}.json
//!   settings.json            # Singleton settings document
//!   activity/{date}.jsonl    # Daily activity logs, one JSON object per line
//! ```
//!
//! Writes are atomic (temp file + rename); activity logs are append-only.

pub mod activity;
pub mod document_fs;
pub mod paths;
pub mod repository;

pub use activity::{log_activity, ActivityEntry, ActivityFilter, ActivityLog, Category, Severity};
pub use document_fs::{DocumentStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    ClientFilter, ClientRepository, ClientSource, ClientStatus, InquiryFilter, InquiryRepository,
    InquirySource, InquiryStatus, Milestone, Priority, ProjectFilter, ProjectRepository,
    ProjectStatus, Settings, SettingsRepository, SortOrder, StoredClient, StoredInquiry,
    StoredProject, StoredUser, UserFilter, UserRepository,
};
