// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Client Module
//!
//! Client-side counterpart of the auth API: caches the token pair plus a
//! user snapshot, refreshes the access token five minutes before expiry,
//! coalesces concurrent refreshes into one in-flight call, and polls for
//! unrecoverable expiry on a 60-second watchdog.
//!
//! The native admin shell embeds this module; the web frontend implements
//! the same contract over `localStorage`.

pub mod http;
pub mod manager;
pub mod store;
pub mod transport;

pub use http::{ApiClient, ApiResponse};
pub use manager::{SessionManager, SessionSnapshot, SessionStatus};
pub use store::{MemoryStore, SessionStore};
pub use transport::{AuthTransport, HttpAuthTransport, SessionError};
