//! Client-side permission cache.
//!
//! A [`PermissionCache`] holds the signed-in user's super-admin flag and
//! grant list for one console session. It fills itself from the durable
//! store or from token claims without touching the network
//! ([`PermissionCache::initialize`]), and is overwritten from the backend
//! after a login ([`PermissionCache::fetch_and_cache`]). Visibility queries
//! read the in-memory state synchronously.
//!
//! Nothing here returns an error: decode and persistence failures are
//! logged and read as "no cache", backend failures resolve to `false`, and
//! callers deny by default.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};

use crate::claims::{Claims, parse_claims};
use crate::credential::CredentialSource;
use crate::error::AuthError;
use crate::permissions::GrantSet;
use crate::source::PermissionSource;
use crate::store::DurableStore;
use crate::types::{PermissionCacheRecord, PermissionGrant, UserPermissions};
use crate::visibility::{MenuItem, VisibilityConfig};

/// Key the cache record is persisted under.
pub const CACHE_KEY: &str = "user_permissions_cache";

/// Result of an initialization or fetch, shared by every caller that asks
/// while it is pending or after it resolved.
pub type PendingInit = Shared<BoxFuture<'static, bool>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    Empty,
    Initializing,
    Ready,
}

#[derive(Debug)]
struct CacheState {
    phase: CachePhase,
    is_super_admin: bool,
    grants: GrantSet,
}

impl CacheState {
    fn empty() -> Self {
        Self {
            phase: CachePhase::Empty,
            is_super_admin: false,
            grants: GrantSet::default(),
        }
    }
}

struct Inner {
    store: Arc<dyn DurableStore>,
    credentials: Arc<dyn CredentialSource>,
    source: Arc<dyn PermissionSource>,
    visibility: VisibilityConfig,
    state: Mutex<CacheState>,
    pending: Mutex<Option<PendingInit>>,
}

/// Cheaply cloneable handle to one session's permission cache.
#[derive(Clone)]
pub struct PermissionCache {
    inner: Arc<Inner>,
}

impl PermissionCache {
    pub fn new(
        store: Arc<dyn DurableStore>,
        credentials: Arc<dyn CredentialSource>,
        source: Arc<dyn PermissionSource>,
        visibility: VisibilityConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                credentials,
                source,
                visibility,
                state: Mutex::new(CacheState::empty()),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Fill the cache from local data only.
    ///
    /// Tries the durable store, then a super-admin claim in the current
    /// token; resolves `false` and stays empty when neither applies. The
    /// local load runs before this returns, so the cache is settled whether
    /// or not the returned future is ever awaited. Calls made while a fetch
    /// is pending, or after a previous run resolved, get that same result
    /// back without re-running anything.
    pub fn initialize(&self) -> PendingInit {
        let mut pending = self.inner.pending();
        if let Some(existing) = pending.as_ref() {
            return existing.clone();
        }
        let loaded = self.inner.load_local();
        let fut = future::ready(loaded).boxed().shared();
        *pending = Some(fut.clone());
        fut
    }

    /// Replace the cache with the backend's view after a login.
    ///
    /// Clears any existing state first. Super admins are recognised from the
    /// token without a request; everyone else costs exactly one call to the
    /// permission source. Resolves `false` and leaves the cache empty when
    /// the response is malformed or the call fails.
    ///
    /// The request runs on a Tokio task, so it completes and updates the
    /// cache even if the returned future is dropped. Must be called from
    /// within a Tokio runtime.
    pub fn fetch_and_cache(&self) -> PendingInit {
        let mut pending = self.inner.pending();
        self.inner.reset();

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.fetch_remote().await });
        let fut = async move {
            task.await.unwrap_or_else(|e| {
                tracing::warn!("permission fetch task failed: {e}");
                false
            })
        }
        .boxed()
        .shared();
        *pending = Some(fut.clone());
        fut
    }

    /// Drop everything and initialize again from local data.
    pub fn refresh(&self) -> PendingInit {
        self.clear();
        self.initialize()
    }

    /// Forget the cached permissions, in memory and on disk.
    pub fn clear(&self) {
        let mut pending = self.inner.pending();
        *pending = None;
        self.inner.reset();
    }

    /// Read the persisted record, discarding it if it is malformed or
    /// belongs to a different account than the current token.
    pub fn load_from_store(&self) -> Option<PermissionCacheRecord> {
        self.inner.load_from_store()
    }

    /// Persist a record stamped with the current account and time.
    /// Failures are logged; the in-memory state stays authoritative.
    pub fn save_to_store(&self, is_super_admin: bool, permissions: &[PermissionGrant]) {
        self.inner.save_to_store(is_super_admin, permissions)
    }

    /// Delete the persisted record only.
    pub fn clear_store(&self) {
        self.inner.clear_store()
    }

    pub fn phase(&self) -> CachePhase {
        self.inner.state().phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase() == CachePhase::Ready
    }

    pub fn is_super_admin(&self) -> bool {
        self.inner.state().is_super_admin
    }

    pub fn permissions(&self) -> Vec<PermissionGrant> {
        self.inner.state().grants.grants()
    }

    /// Claims of the current token, if it has readable ones.
    pub fn claims(&self) -> Option<Claims> {
        self.inner.current_claims()
    }

    pub fn visibility(&self) -> &VisibilityConfig {
        &self.inner.visibility
    }

    pub fn has_permission(&self, path: &str, method: &str) -> bool {
        let state = self.inner.state();
        state.is_super_admin || state.grants.allows(path, method)
    }

    /// Menus without a requirement are always visible.
    pub fn is_menu_visible(&self, menu_path: &str) -> bool {
        let Some(required) = self.inner.visibility.menu_requirement(menu_path) else {
            return true;
        };
        let visible = self.has_permission(&required.path, &required.method);
        tracing::debug!(
            menu_path,
            required_path = %required.path,
            required_method = %required.method,
            visible,
            "menu visibility"
        );
        visible
    }

    /// Buttons without a configured requirement are hidden, except for super
    /// admins who see everything.
    pub fn is_button_visible(&self, page_path: &str, button_key: &str) -> bool {
        if self.is_super_admin() {
            return true;
        }
        match self.inner.visibility.button_requirement(page_path, button_key) {
            Some(required) => self.has_permission(&required.path, &required.method),
            None => false,
        }
    }

    /// Menu entries to render, in configured order. Until the cache is ready
    /// only entries without a requirement are listed.
    pub fn visible_menus(&self) -> Vec<&MenuItem> {
        let ready = self.is_initialized();
        self.inner
            .visibility
            .menus
            .iter()
            .filter(|menu| match menu.permission {
                None => true,
                Some(_) if !ready => false,
                Some(_) => self.is_menu_visible(&menu.path),
            })
            .collect()
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingInit>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_claims(&self) -> Option<Claims> {
        self.credentials
            .current()
            .and_then(|token| parse_claims(&token))
    }

    fn set_phase(&self, phase: CachePhase) {
        self.state().phase = phase;
    }

    fn adopt(&self, is_super_admin: bool, permissions: Vec<PermissionGrant>) {
        let mut state = self.state();
        state.phase = CachePhase::Ready;
        state.is_super_admin = is_super_admin;
        state.grants = GrantSet::new(permissions);
    }

    fn reset(&self) {
        *self.state() = CacheState::empty();
        self.clear_store();
    }

    fn load_from_store(&self) -> Option<PermissionCacheRecord> {
        let raw = match self.store.read(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("cannot read permission cache: {e}");
                return None;
            }
        };

        let record = match serde_json::from_str(&raw) {
            Ok(value) => PermissionCacheRecord::from_value(&value),
            Err(e) => {
                tracing::warn!("permission cache is not JSON: {e}");
                None
            }
        };
        let Some(record) = record else {
            tracing::debug!("ignoring malformed permission cache record");
            return None;
        };

        if let (Some(cached_user), Some(claims)) = (&record.user_id, self.current_claims()) {
            if claims.user_id.as_ref() != Some(cached_user) {
                tracing::info!(
                    cached_user = %cached_user,
                    "account switch detected, evicting permission cache"
                );
                self.clear_store();
                return None;
            }
        }

        Some(record)
    }

    fn save_to_store(&self, is_super_admin: bool, permissions: &[PermissionGrant]) {
        let record = PermissionCacheRecord {
            is_super_admin,
            permissions: permissions.to_vec(),
            user_id: self.current_claims().and_then(|c| c.user_id),
            cached_at: chrono::Utc::now().timestamp_millis(),
        };
        let result = serde_json::to_string(&record)
            .map_err(AuthError::from)
            .and_then(|raw| self.store.write(CACHE_KEY, &raw));
        if let Err(e) = result {
            tracing::warn!("cannot persist permission cache: {e}");
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.remove(CACHE_KEY) {
            tracing::warn!("cannot clear permission cache: {e}");
        }
    }

    /// Adopt a super-admin claim from the current token, if there is one.
    fn adopt_super_admin_claim(&self) -> bool {
        if !self.current_claims().is_some_and(|c| c.is_super_admin) {
            return false;
        }
        self.adopt(true, Vec::new());
        self.save_to_store(true, &[]);
        true
    }

    fn load_local(&self) -> bool {
        self.set_phase(CachePhase::Initializing);

        if let Some(record) = self.load_from_store() {
            tracing::info!(
                is_super_admin = record.is_super_admin,
                permissions = record.permissions.len(),
                "permissions loaded from cache"
            );
            self.adopt(record.is_super_admin, record.permissions);
            return true;
        }

        if self.adopt_super_admin_claim() {
            tracing::info!("super admin recognised from token");
            return true;
        }

        *self.state() = CacheState::empty();
        tracing::info!("no cached permissions, waiting for login");
        false
    }

    async fn fetch_remote(&self) -> bool {
        if self.adopt_super_admin_claim() {
            tracing::info!("login: super admin recognised from token, cached");
            return true;
        }

        self.set_phase(CachePhase::Initializing);
        let body = match self.source.fetch_permissions().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("failed to fetch permissions: {e:#}");
                *self.state() = CacheState::empty();
                return false;
            }
        };

        let Some(fetched) = UserPermissions::from_value(&body) else {
            tracing::warn!(%body, "failed to fetch permissions: unexpected response shape");
            *self.state() = CacheState::empty();
            return false;
        };

        self.save_to_store(fetched.is_super_admin, &fetched.permissions);
        tracing::info!(
            is_super_admin = fetched.is_super_admin,
            permissions = fetched.permissions.len(),
            "login: permissions fetched and cached"
        );
        self.adopt(fetched.is_super_admin, fetched.permissions);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::UserId;
    use crate::credential::StaticCredential;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn token(claims: Value) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.sig",
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    struct FakeSource {
        response: Option<Value>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn replying(response: Value) -> Arc<Self> {
            Arc::new(Self {
                response: Some(response),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PermissionSource for FakeSource {
        async fn fetch_permissions(&self) -> anyhow::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    /// Source whose reply is held back until the test releases it.
    #[derive(Default)]
    struct GatedSource {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PermissionSource for GatedSource {
        async fn fetch_permissions(&self) -> anyhow::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(json!({
                "is_super_admin": false,
                "permissions": [{"path": "/admin/api/roles/:id", "method": "GET"}],
            }))
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    impl DurableStore for CountingStore {
        fn read(&self, key: &str) -> Result<Option<String>, AuthError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(key)
        }
        fn write(&self, key: &str, value: &str) -> Result<(), AuthError> {
            self.inner.write(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), AuthError> {
            self.inner.remove(key)
        }
    }

    struct BrokenStore;

    impl DurableStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, AuthError> {
            Err(AuthError::Internal("unavailable".into()))
        }
        fn write(&self, _key: &str, _value: &str) -> Result<(), AuthError> {
            Err(AuthError::Internal("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), AuthError> {
            Err(AuthError::Internal("unavailable".into()))
        }
    }

    fn cache_with(
        store: Arc<dyn DurableStore>,
        token: Option<String>,
        source: Arc<FakeSource>,
    ) -> PermissionCache {
        PermissionCache::new(
            store,
            Arc::new(StaticCredential::new(token)),
            source,
            VisibilityConfig::default(),
        )
    }

    fn stored_record(store: &dyn DurableStore) -> Option<Value> {
        store
            .read(CACHE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[tokio::test]
    async fn concurrent_initialize_shares_one_run() {
        let store = Arc::new(CountingStore::default());
        let cache = cache_with(store.clone(), None, FakeSource::failing());

        let first = cache.initialize();
        let second = cache.initialize();
        assert!(first.ptr_eq(&second));

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, b);
        assert!(!a);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);

        // Resolved results are reused too.
        assert!(!cache.initialize().await);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn initialize_adopts_stored_record() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 5}))),
            FakeSource::failing(),
        );
        cache.save_to_store(false, &[PermissionGrant::new("/admin/api/users", "GET")]);

        assert!(cache.initialize().await);
        assert_eq!(cache.phase(), CachePhase::Ready);
        assert!(!cache.is_super_admin());
        assert!(cache.has_permission("/admin/api/users", "GET"));
        assert!(cache.is_menu_visible("/admin/users"));
        assert!(!cache.is_menu_visible("/admin/roles"));
    }

    #[tokio::test]
    async fn saved_super_admin_record_reads_back() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store, None, FakeSource::failing());
        cache.save_to_store(true, &[]);

        let record = cache.load_from_store().unwrap();
        assert!(record.is_super_admin);
        assert!(record.permissions.is_empty());
        assert_eq!(record.user_id, None);
        assert!(record.cached_at > 0);
    }

    #[tokio::test]
    async fn record_of_other_account_is_evicted() {
        let store = Arc::new(MemoryStore::new());
        let old = cache_with(
            store.clone(),
            Some(token(json!({"user_id": "u1"}))),
            FakeSource::failing(),
        );
        old.save_to_store(false, &[PermissionGrant::new("/admin/api/roles", "GET")]);
        assert_eq!(
            old.load_from_store().unwrap().user_id,
            Some(UserId::Text("u1".into()))
        );

        let switched = cache_with(
            store.clone(),
            Some(token(json!({"user_id": "u2"}))),
            FakeSource::failing(),
        );
        assert!(switched.load_from_store().is_none());
        assert!(stored_record(store.as_ref()).is_none());
    }

    #[tokio::test]
    async fn record_is_kept_without_readable_token() {
        let store = Arc::new(MemoryStore::new());
        let writer = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 3}))),
            FakeSource::failing(),
        );
        writer.save_to_store(false, &[]);

        let reader = cache_with(store.clone(), Some("garbage".into()), FakeSource::failing());
        assert!(reader.load_from_store().is_some());
    }

    #[tokio::test]
    async fn malformed_records_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(store.clone(), None, FakeSource::failing());

        for raw in ["not json", "[]", r#"{"permissions": []}"#, r#"{"is_super_admin": true}"#] {
            store.write(CACHE_KEY, raw).unwrap();
            assert!(cache.load_from_store().is_none(), "{raw}");
        }
    }

    #[tokio::test]
    async fn initialize_recognises_super_admin_claim() {
        let store = Arc::new(MemoryStore::new());
        let source = FakeSource::failing();
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 1, "is_super_admin": true}))),
            source.clone(),
        );

        assert!(cache.initialize().await);
        assert!(cache.is_super_admin());
        assert!(cache.permissions().is_empty());
        assert!(cache.is_button_visible("/admin/nowhere", "anything"));
        assert_eq!(source.calls(), 0);

        let persisted = stored_record(store.as_ref()).unwrap();
        assert_eq!(persisted["is_super_admin"], true);
        assert_eq!(persisted["user_id"], 1);
    }

    #[tokio::test]
    async fn initialize_without_cache_or_claims_stays_empty() {
        let source = FakeSource::failing();
        let cache = cache_with(
            Arc::new(MemoryStore::new()),
            Some(token(json!({"user_id": 2}))),
            source.clone(),
        );

        assert!(!cache.initialize().await);
        assert_eq!(cache.phase(), CachePhase::Empty);
        assert!(!cache.has_permission("/admin/api/users", "GET"));
        assert_eq!(source.calls(), 0);

        let menus: Vec<_> = cache.visible_menus().into_iter().map(|m| m.path.as_str()).collect();
        assert_eq!(menus, ["/admin"]);
    }

    #[tokio::test]
    async fn fetch_adopts_backend_grants() {
        let store = Arc::new(MemoryStore::new());
        let source = FakeSource::replying(json!({
            "is_super_admin": false,
            "permissions": [{"path": "/admin/api/users", "method": "GET"}],
        }));
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 8}))),
            source.clone(),
        );

        assert!(cache.fetch_and_cache().await);
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.phase(), CachePhase::Ready);
        assert!(!cache.is_super_admin());
        assert_eq!(
            cache.permissions(),
            vec![PermissionGrant::new("/admin/api/users", "GET")]
        );

        let persisted = cache.load_from_store().unwrap();
        assert!(!persisted.is_super_admin);
        assert_eq!(persisted.permissions, cache.permissions());
        assert_eq!(persisted.user_id, Some(UserId::Int(8)));

        // A later initialize reuses the fetch result.
        assert!(cache.initialize().await);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_rejects_malformed_response() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 8}))),
            FakeSource::replying(json!("forbidden")),
        );
        cache.save_to_store(true, &[]);

        assert!(!cache.fetch_and_cache().await);
        assert_eq!(cache.phase(), CachePhase::Empty);
        assert!(!cache.is_super_admin());
        assert!(stored_record(store.as_ref()).is_none());
    }

    #[tokio::test]
    async fn fetch_transport_failure_resolves_false() {
        let cache = cache_with(
            Arc::new(MemoryStore::new()),
            Some(token(json!({"user_id": 8}))),
            FakeSource::failing(),
        );
        assert!(!cache.fetch_and_cache().await);
        assert!(!cache.is_initialized());
    }

    #[tokio::test]
    async fn fetch_skips_network_for_super_admin() {
        let source = FakeSource::replying(json!({"is_super_admin": false}));
        let cache = cache_with(
            Arc::new(MemoryStore::new()),
            Some(token(json!({"user_id": 1, "is_super_admin": true}))),
            source.clone(),
        );
        assert!(cache.fetch_and_cache().await);
        assert!(cache.is_super_admin());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn persistence_failures_are_swallowed() {
        let source = FakeSource::replying(json!({
            "is_super_admin": false,
            "permissions": [{"path": "/admin/api/roles", "method": ""}],
        }));
        let cache = cache_with(
            Arc::new(BrokenStore),
            Some(token(json!({"user_id": 4}))),
            source,
        );

        assert!(cache.fetch_and_cache().await);
        assert!(cache.has_permission("/admin/api/roles", "DELETE"));
        assert!(cache.load_from_store().is_none());
        cache.clear();
        assert!(!cache.is_initialized());
    }

    #[tokio::test]
    async fn refresh_rereads_local_state() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 6}))),
            FakeSource::failing(),
        );
        assert!(!cache.initialize().await);

        // Without a refresh the resolved result sticks.
        cache.save_to_store(false, &[PermissionGrant::new("/admin/api/roles", "GET")]);
        assert!(!cache.initialize().await);

        // Refresh clears the store too, so only claims are left to consult.
        assert!(!cache.refresh().await);
        assert!(stored_record(store.as_ref()).is_none());
    }

    #[tokio::test]
    async fn refresh_readopts_super_admin_claim() {
        let store = Arc::new(MemoryStore::new());
        let source = FakeSource::failing();
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 1, "is_super_admin": true}))),
            source.clone(),
        );
        assert!(cache.initialize().await);
        store.remove(CACHE_KEY).unwrap();

        assert!(cache.refresh().await);
        assert_eq!(cache.phase(), CachePhase::Ready);
        assert!(cache.is_super_admin());
        assert_eq!(source.calls(), 0);

        let persisted = stored_record(store.as_ref()).unwrap();
        assert_eq!(persisted["is_super_admin"], true);
        assert_eq!(persisted["user_id"], 1);
    }

    #[tokio::test]
    async fn late_initialize_does_not_undo_fetch() {
        let source = FakeSource::replying(json!({
            "is_super_admin": false,
            "permissions": [{"path": "/admin/api/users", "method": "GET"}],
        }));
        let cache = cache_with(
            Arc::new(BrokenStore),
            Some(token(json!({"user_id": 8}))),
            source,
        );

        let boot = cache.initialize();
        assert_eq!(cache.phase(), CachePhase::Empty);

        assert!(cache.fetch_and_cache().await);
        assert!(cache.has_permission("/admin/api/users", "GET"));

        // The earlier call settled when it was made; awaiting it now only
        // reports that outcome.
        assert!(!boot.await);
        assert_eq!(cache.phase(), CachePhase::Ready);
        assert!(cache.has_permission("/admin/api/users", "GET"));
    }

    #[tokio::test]
    async fn initialize_during_fetch_awaits_fetch() {
        let store = Arc::new(CountingStore::default());
        let source = Arc::new(GatedSource::default());
        let cache = PermissionCache::new(
            store.clone(),
            Arc::new(StaticCredential::new(Some(token(json!({"user_id": 8}))))),
            source.clone(),
            VisibilityConfig::default(),
        );

        let fetch = cache.fetch_and_cache();
        let boot = cache.initialize();
        assert!(boot.ptr_eq(&fetch));
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);

        source.gate.notify_one();
        let (fetched, booted) = tokio::join!(fetch, boot);
        assert!(fetched);
        assert_eq!(fetched, booted);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert!(cache.has_permission("/admin/api/roles/3", "GET"));
    }

    #[tokio::test]
    async fn clear_resets_memory_and_store() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(
            store.clone(),
            Some(token(json!({"user_id": 1, "is_super_admin": true}))),
            FakeSource::failing(),
        );
        assert!(cache.initialize().await);

        cache.clear();
        assert_eq!(cache.phase(), CachePhase::Empty);
        assert!(!cache.is_super_admin());
        assert!(stored_record(store.as_ref()).is_none());
    }

    #[tokio::test]
    async fn button_visibility_rules() {
        let source = FakeSource::replying(json!({
            "is_super_admin": false,
            "permissions": [
                {"path": "/admin/api/users/:id", "method": "PUT"},
                {"path": "/admin/api/dictionaries/*", "method": ""},
            ],
        }));
        let cache = cache_with(
            Arc::new(MemoryStore::new()),
            Some(token(json!({"user_id": 2}))),
            source,
        );
        assert!(cache.fetch_and_cache().await);

        assert!(cache.is_button_visible("/admin/users", "edit"));
        assert!(!cache.is_button_visible("/admin/users", "delete"));
        assert!(!cache.is_button_visible("/admin/users", "unknown"));
        assert!(!cache.is_button_visible("/admin/unknown", "edit"));
        assert!(cache.is_button_visible("/admin/dictionaries", "deleteItem"));
        assert!(cache.is_button_visible("/admin/dictionaries", "add"));

        let menus: Vec<_> = cache.visible_menus().into_iter().map(|m| m.path.as_str()).collect();
        assert_eq!(menus, ["/admin", "/admin/dictionaries"]);
    }
}
