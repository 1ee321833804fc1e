// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-side session cache with proactive refresh.
//!
//! Holds the token pair plus a denormalized user snapshot behind a
//! [`SessionStore`]. Expiry is pre-checked locally with the unverified
//! decode helper; actual trust in claims stays on the server.
//!
//! ## Refresh coalescing
//!
//! Concurrent [`SessionManager::get_valid_token`] callers over an expired
//! cache share one in-flight refresh: a single shared future is memoized
//! in a slot, every caller awaits the same result, and the slot is cleared
//! when the operation settles so the next expiry starts a fresh cycle.
//! Refresh failure is terminal for the session: all local state is
//! cleared and no retry is attempted.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::store::{SessionStore, KEY_REFRESH_TOKEN, KEY_TOKEN, KEY_USER};
use super::transport::{AuthTransport, SessionError};
use crate::auth::token::{expiration_millis, is_structurally_expired};
use crate::models::UserPublic;

/// Refresh this long before the access token expires.
const REFRESH_LEAD: Duration = Duration::from_secs(5 * 60);

/// Watchdog poll interval.
const WATCHDOG_TICK: Duration = Duration::from_secs(60);

/// The cached session: token pair, user snapshot, derived expiry instant
/// (Unix milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub token: String,
    pub refresh_token: String,
    pub user: UserPublic,
    pub expires_at: i64,
}

/// Observable session phase, for embedders that drive a login surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedOut,
    Active,
    /// The session could not be re-established; redirect to login.
    Expired,
}

type SharedRefresh = Shared<BoxFuture<'static, Result<String, SessionError>>>;

struct ManagerInner {
    store: Box<dyn SessionStore>,
    transport: Box<dyn AuthTransport>,
    pending_refresh: Mutex<Option<SharedRefresh>>,
    refresh_timer: StdMutex<Option<JoinHandle<()>>>,
    status_tx: watch::Sender<SessionStatus>,
}

impl ManagerInner {
    fn read_snapshot(&self) -> Option<SessionSnapshot> {
        let token = self.store.get(KEY_TOKEN);
        let refresh_token = self.store.get(KEY_REFRESH_TOKEN);
        let user_json = self.store.get(KEY_USER);

        let (Some(token), Some(refresh_token), Some(user_json)) =
            (token, refresh_token, user_json)
        else {
            // Self-healing: partial state is as good as none.
            self.clear_values();
            return None;
        };

        let Ok(user) = serde_json::from_str::<UserPublic>(&user_json) else {
            self.clear_values();
            return None;
        };

        Some(SessionSnapshot {
            expires_at: expiration_millis(&token).unwrap_or(0),
            token,
            refresh_token,
            user,
        })
    }

    fn clear_values(&self) {
        self.store.remove(KEY_TOKEN);
        self.store.remove(KEY_REFRESH_TOKEN);
        self.store.remove(KEY_USER);
    }

    fn abort_timer(&self) {
        let handle = match self.refresh_timer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn store_timer(&self, handle: JoinHandle<()>) {
        let mut guard = match self.refresh_timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(old) = guard.replace(handle) {
            old.abort();
        }
    }
}

/// Client-side session manager. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

impl SessionManager {
    /// Create a manager over the given store and transport.
    pub fn new(store: Box<dyn SessionStore>, transport: Box<dyn AuthTransport>) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::SignedOut);
        Self {
            inner: Arc::new(ManagerInner {
                store,
                transport,
                pending_refresh: Mutex::new(None),
                refresh_timer: StdMutex::new(None),
                status_tx,
            }),
        }
    }

    /// Observe session phase changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Read the cached session. Returns `None` (and clears partial state)
    /// when any of the three stored values is missing or unparsable.
    pub fn get_tokens(&self) -> Option<SessionSnapshot> {
        self.inner.read_snapshot()
    }

    /// The cached user, if a session exists.
    pub fn current_user(&self) -> Option<UserPublic> {
        self.get_tokens().map(|s| s.user)
    }

    /// Whether a non-expired session is cached.
    pub fn is_authenticated(&self) -> bool {
        self.get_tokens()
            .map(|s| !is_structurally_expired(&s.token))
            .unwrap_or(false)
    }

    /// Persist a token pair + user snapshot and (re)schedule the proactive
    /// refresh timer for five minutes before expiry. When that instant has
    /// already passed no timer is scheduled; the next read refreshes
    /// synchronously instead.
    pub fn set_tokens(&self, token: &str, refresh_token: &str, user: &UserPublic) {
        self.inner.store.set(KEY_TOKEN, token);
        self.inner.store.set(KEY_REFRESH_TOKEN, refresh_token);
        match serde_json::to_string(user) {
            Ok(user_json) => self.inner.store.set(KEY_USER, &user_json),
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session user");
                return;
            }
        }
        let _ = self.inner.status_tx.send(SessionStatus::Active);

        self.schedule_refresh_timer(token);
    }

    fn schedule_refresh_timer(&self, token: &str) {
        self.inner.abort_timer();

        let Some(expires_at) = expiration_millis(token) else {
            return;
        };
        let lead_ms = REFRESH_LEAD.as_millis() as i64;
        let delay_ms = expires_at - chrono::Utc::now().timestamp_millis() - lead_ms;
        if delay_ms <= 0 {
            return;
        }

        // Outside a runtime (sync embedders) the timer is skipped; the
        // expiry check on the next read covers it.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let manager = self.clone();
        let task = handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
            let _ = manager.get_valid_token().await;
        });
        self.inner.store_timer(task);
    }

    /// Return a token fit for an `Authorization` header.
    ///
    /// The cached access token is returned as-is while unexpired;
    /// otherwise one coalesced refresh is attempted.
    pub async fn get_valid_token(&self) -> Option<String> {
        let snapshot = self.get_tokens()?;

        if !is_structurally_expired(&snapshot.token) {
            return Some(snapshot.token);
        }

        self.refresh().await.ok()
    }

    /// Refresh the access token, sharing one in-flight operation among
    /// concurrent callers. On success only the access token changes; on
    /// failure all session state is cleared and the error is returned to
    /// every coalesced caller.
    pub async fn refresh(&self) -> Result<String, SessionError> {
        let shared = {
            let mut slot = self.inner.pending_refresh.lock().await;
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let manager = self.clone();
                    let fut: SharedRefresh = async move {
                        let result = manager.do_refresh().await;
                        // Clear the slot so the next expiry starts a new
                        // cycle; this future still occupies it.
                        *inner.pending_refresh.lock().await = None;
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        shared.await
    }

    async fn do_refresh(&self) -> Result<String, SessionError> {
        let Some(snapshot) = self.get_tokens() else {
            return Err(SessionError::NoSession);
        };

        match self
            .inner
            .transport
            .refresh(&snapshot.refresh_token)
            .await
        {
            Ok(new_token) => {
                // Refresh token and user snapshot are carried forward
                // unchanged.
                self.set_tokens(&new_token, &snapshot.refresh_token, &snapshot.user);
                Ok(new_token)
            }
            Err(e) => {
                tracing::debug!(error = %e, "token refresh failed; clearing session");
                self.inner.clear_values();
                self.inner.abort_timer();
                let _ = self.inner.status_tx.send(SessionStatus::Expired);
                Err(e)
            }
        }
    }

    /// Best-effort server logout, then unconditional local clear.
    /// Safe to call repeatedly.
    pub async fn logout(&self) {
        if let Some(snapshot) = self.get_tokens() {
            if let Err(e) = self.inner.transport.logout(&snapshot.token).await {
                tracing::debug!(error = %e, "logout notification failed");
            }
        }

        self.inner.clear_values();
        self.inner.abort_timer();
        let _ = self.inner.status_tx.send(SessionStatus::SignedOut);
    }

    /// One watchdog pass: force logout when the cached token is expired
    /// and no valid session can be re-established.
    pub(crate) async fn check_expiry(&self) {
        let Some(snapshot) = self.get_tokens() else {
            return;
        };
        if !is_structurally_expired(&snapshot.token) {
            return;
        }
        if self.get_valid_token().await.is_none() {
            self.logout().await;
            let _ = self.inner.status_tx.send(SessionStatus::Expired);
        }
    }

    /// Spawn the 60-second expiry watchdog. Runs until cancelled.
    pub fn spawn_watchdog(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(WATCHDOG_TICK);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => manager.check_expiry().await,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, TokenService};
    use crate::session::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn token_service() -> TokenService {
        TokenService::new("session-test-secret", Duration::from_secs(3600))
    }

    fn test_user_public() -> UserPublic {
        UserPublic {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::Staff,
            is_active: true,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            department: None,
            avatar: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stored_user() -> crate::storage::StoredUser {
        crate::storage::StoredUser {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Staff,
            is_active: true,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            department: None,
            avatar: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Transport double that counts refreshes and can hold them open
    /// until every caller has queued up.
    struct MockTransport {
        refresh_calls: AtomicUsize,
        logout_calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
        fail_refresh: bool,
        issued: TokenService,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                refresh_calls: AtomicUsize::new(0),
                logout_calls: AtomicUsize::new(0),
                gate: None,
                fail_refresh: false,
                issued: token_service(),
            }
        }

        fn failing() -> Self {
            Self {
                fail_refresh: true,
                ..Self::new()
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl AuthTransport for MockTransport {
        async fn refresh(&self, _refresh_token: &str) -> Result<String, SessionError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_refresh {
                return Err(SessionError::RefreshFailed("invalid refresh token".into()));
            }
            self.issued
                .issue_access_token(&stored_user())
                .map_err(|e| SessionError::Transport(e.to_string()))
        }

        async fn logout(&self, _access_token: &str) -> Result<(), SessionError> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager_with(transport: MockTransport) -> (SessionManager, Arc<MockTransport>) {
        let transport = Arc::new(transport);

        struct Forward(Arc<MockTransport>);
        #[async_trait]
        impl AuthTransport for Forward {
            async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError> {
                self.0.refresh(refresh_token).await
            }
            async fn logout(&self, access_token: &str) -> Result<(), SessionError> {
                self.0.logout(access_token).await
            }
        }

        let manager = SessionManager::new(
            Box::new(MemoryStore::new()),
            Box::new(Forward(Arc::clone(&transport))),
        );
        (manager, transport)
    }

    fn fresh_token() -> String {
        token_service().issue_access_token(&stored_user()).unwrap()
    }

    fn expired_token() -> String {
        token_service()
            .issue_with_lifetime(&stored_user(), Duration::ZERO)
            .unwrap()
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (manager, _) = manager_with(MockTransport::new());
        let token = fresh_token();
        let user = test_user_public();

        manager.set_tokens(&token, "refresh-token", &user);

        let snapshot = manager.get_tokens().expect("session present");
        assert_eq!(snapshot.token, token);
        assert_eq!(snapshot.refresh_token, "refresh-token");
        assert_eq!(snapshot.user, user);
        assert_eq!(snapshot.expires_at, expiration_millis(&token).unwrap());
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn partial_state_reads_as_absent_and_heals() {
        let (manager, _) = manager_with(MockTransport::new());
        manager.inner.store.set(KEY_TOKEN, "dangling-token");
        // refreshToken and user missing

        assert!(manager.get_tokens().is_none());
        // The partial value was cleared too.
        assert!(manager.inner.store.get(KEY_TOKEN).is_none());
    }

    #[tokio::test]
    async fn unparsable_user_reads_as_absent() {
        let (manager, _) = manager_with(MockTransport::new());
        manager.inner.store.set(KEY_TOKEN, &fresh_token());
        manager.inner.store.set(KEY_REFRESH_TOKEN, "r");
        manager.inner.store.set(KEY_USER, "{not json");

        assert!(manager.get_tokens().is_none());
        assert!(manager.inner.store.get(KEY_REFRESH_TOKEN).is_none());
    }

    #[tokio::test]
    async fn valid_token_returned_without_refresh() {
        let (manager, transport) = manager_with(MockTransport::new());
        let token = fresh_token();
        manager.set_tokens(&token, "r", &test_user_public());

        let got = manager.get_valid_token().await;
        assert_eq!(got, Some(token));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_token_triggers_refresh_and_keeps_refresh_token() {
        let (manager, transport) = manager_with(MockTransport::new());
        manager.set_tokens(&expired_token(), "the-refresh-token", &test_user_public());

        let new_token = manager.get_valid_token().await.expect("refresh succeeds");
        assert!(!is_structurally_expired(&new_token));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);

        let snapshot = manager.get_tokens().unwrap();
        assert_eq!(snapshot.token, new_token);
        assert_eq!(snapshot.refresh_token, "the-refresh-token");
        assert_eq!(snapshot.user, test_user_public());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let gate = Arc::new(Notify::new());
        let (manager, transport) = manager_with(MockTransport::gated(Arc::clone(&gate)));
        manager.set_tokens(&expired_token(), "r", &test_user_public());

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let m = manager.clone();
            tasks.push(tokio::spawn(async move { m.get_valid_token().await }));
        }

        // Let every task reach the shared future, then release the one
        // in-flight transport call.
        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.notify_one();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap().expect("token"));
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn refresh_slot_clears_after_settling() {
        let (manager, transport) = manager_with(MockTransport::new());
        manager.set_tokens(&expired_token(), "r", &test_user_public());

        manager.get_valid_token().await.expect("first refresh");

        // Expire again; a second cycle must issue a second call.
        manager.set_tokens(&expired_token(), "r", &test_user_public());
        manager.get_valid_token().await.expect("second refresh");

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_fails_all_callers_and_clears_state() {
        let (manager, transport) = manager_with(MockTransport::failing());
        manager.set_tokens(&expired_token(), "r", &test_user_public());
        let mut status = manager.subscribe();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let m = manager.clone();
            tasks.push(tokio::spawn(async move { m.get_valid_token().await }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), None);
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(manager.get_tokens().is_none());
        assert!(!manager.is_authenticated());

        status.changed().await.unwrap();
        assert_eq!(*status.borrow(), SessionStatus::Expired);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (manager, transport) = manager_with(MockTransport::new());
        manager.set_tokens(&fresh_token(), "r", &test_user_public());

        manager.logout().await;
        assert!(manager.get_tokens().is_none());
        assert_eq!(transport.logout_calls.load(Ordering::SeqCst), 1);

        // Second logout: no session, no server call, no panic.
        manager.logout().await;
        assert!(manager.get_tokens().is_none());
        assert_eq!(transport.logout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn watchdog_pass_logs_out_unrecoverable_session() {
        let (manager, transport) = manager_with(MockTransport::failing());
        manager.set_tokens(&expired_token(), "r", &test_user_public());

        manager.check_expiry().await;

        assert!(manager.get_tokens().is_none());
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*manager.subscribe().borrow(), SessionStatus::Expired);
    }

    #[tokio::test]
    async fn watchdog_pass_keeps_valid_session() {
        let (manager, transport) = manager_with(MockTransport::new());
        manager.set_tokens(&fresh_token(), "r", &test_user_public());

        manager.check_expiry().await;

        assert!(manager.get_tokens().is_some());
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(transport.logout_calls.load(Ordering::SeqCst), 0);
    }
}
