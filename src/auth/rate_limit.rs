// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window rate limiting.
//!
//! In-process only: counters reset on restart and are not shared across
//! instances (single-instance deployment). The limiter is explicit state
//! owned by [`crate::state::AppState`], never a module-level global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by an opaque identifier
/// (email, IP, ...).
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window` per identifier.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Record a request for `identifier`. Returns `false` when the caller
    /// has exhausted the current window.
    ///
    /// Expired windows are evicted opportunistically on every call, so the
    /// map stays bounded by the set of identifiers active within one window.
    pub fn check(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        windows.retain(|_, w| w.reset_at > now);

        match windows.get_mut(identifier) {
            Some(w) => {
                if w.count >= self.max_requests {
                    return false;
                }
                w.count += 1;
                true
            }
            None => {
                windows.insert(
                    identifier.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}
