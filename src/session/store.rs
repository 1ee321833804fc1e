// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key-value persistence for the session client.
//!
//! The browser build of the admin panel keeps the session in
//! `localStorage`; embedders of this library provide the same three-slot
//! contract through [`SessionStore`]. [`MemoryStore`] is the default
//! in-process implementation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Storage slot names, shared with the web frontend.
pub const KEY_TOKEN: &str = "token";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_USER: &str = "user";

/// Minimal synchronous key-value store for session state.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory session store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(KEY_TOKEN), None);

        store.set(KEY_TOKEN, "abc");
        assert_eq!(store.get(KEY_TOKEN), Some("abc".to_string()));

        store.remove(KEY_TOKEN);
        assert_eq!(store.get(KEY_TOKEN), None);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.remove("never-set");
    }
}
