use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::services::{
    alerts_service::AlertManager, api_client::ApiClient, dashboard_service::DashboardAggregator,
    list_service::ListViewer, session::Session,
};

/// Everything one signed-in browser works with: its session and the resource
/// managers holding the lists fetched for it.
pub struct Workspace {
    pub session: Session,
    pub alerts: AlertManager,
    pub dashboard: DashboardAggregator,
    pub list: ListViewer,
}

impl Workspace {
    pub fn new(api: ApiClient, token: Option<String>) -> Self {
        Self {
            session: Session::new(api, token),
            alerts: AlertManager::default(),
            dashboard: DashboardAggregator::default(),
            list: ListViewer::default(),
        }
    }
}

pub type SharedWorkspace = Arc<tokio::sync::Mutex<Workspace>>;

const IDLE_TTL: Duration = Duration::from_secs(30 * 60);
const CAPACITY: usize = 1024;

struct Entry {
    workspace: SharedWorkspace,
    last_used: Instant,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn sweep(&mut self, ttl: Duration) {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.last_used.elapsed() < ttl);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!(dropped, "idle workspaces expired");
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.seq)
            .map(|(k, _)| k.clone());
        if let Some(k) = oldest {
            self.entries.remove(&k);
            tracing::debug!("least recently used workspace dropped");
        }
    }
}

/// Workspaces keyed by bearer token.
///
/// Only tokens the backend has accepted are kept; anything else gets a
/// throwaway workspace. Entries idle longer than the TTL are swept, and the
/// least recently used one makes room when the store is full.
#[derive(Clone)]
pub struct WorkspaceStore {
    inner: Arc<Mutex<Inner>>,
    idle_ttl: Duration,
    capacity: usize,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::with_limits(IDLE_TTL, CAPACITY)
    }
}

impl WorkspaceStore {
    pub fn with_limits(idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            idle_ttl,
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The stored workspace for `token`, or a fresh one that is not kept.
    pub fn checkout(&self, api: &ApiClient, token: Option<&str>) -> SharedWorkspace {
        let token = token.filter(|t| !t.is_empty());

        if let Some(t) = token {
            let mut inner = self.lock();
            inner.sweep(self.idle_ttl);
            let seq = inner.tick();
            if let Some(entry) = inner.entries.get_mut(t) {
                entry.last_used = Instant::now();
                entry.seq = seq;
                return entry.workspace.clone();
            }
        }

        Arc::new(tokio::sync::Mutex::new(Workspace::new(
            api.clone(),
            token.map(str::to_string),
        )))
    }

    /// Keeps `workspace` under `token` for later requests.
    pub fn adopt(&self, token: &str, workspace: &SharedWorkspace) {
        if token.is_empty() {
            return;
        }

        let mut inner = self.lock();
        inner.sweep(self.idle_ttl);
        let seq = inner.tick();

        if let Some(entry) = inner.entries.get_mut(token) {
            entry.last_used = Instant::now();
            entry.seq = seq;
            return;
        }

        if inner.entries.len() >= self.capacity {
            inner.evict_oldest();
        }

        tracing::debug!("workspace stored");
        inner.entries.insert(
            token.to_string(),
            Entry {
                workspace: workspace.clone(),
                last_used: Instant::now(),
                seq,
            },
        );
    }

    pub fn contains(&self, token: &str) -> bool {
        self.lock().entries.contains_key(token)
    }

    pub fn evict(&self, token: &str) {
        if self.lock().entries.remove(token).is_some() {
            tracing::debug!("workspace dropped");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9", None)
    }

    #[test]
    fn checkout_alone_stores_nothing() {
        let store = WorkspaceStore::default();
        let a = store.checkout(&api(), Some("t1"));
        let b = store.checkout(&api(), Some("t1"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(store.is_empty());
    }

    #[test]
    fn adopted_token_shares_a_workspace() {
        let store = WorkspaceStore::default();
        let a = store.checkout(&api(), Some("t1"));
        store.adopt("t1", &a);
        let b = store.checkout(&api(), Some("t1"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);

        store.evict("t1");
        assert!(store.is_empty());
    }

    #[test]
    fn anonymous_workspaces_are_not_kept() {
        let store = WorkspaceStore::default();
        let a = store.checkout(&api(), None);
        let _ = store.checkout(&api(), Some(""));
        store.adopt("", &a);
        assert!(store.is_empty());
    }

    #[test]
    fn idle_workspaces_expire() {
        let store = WorkspaceStore::with_limits(Duration::ZERO, 8);
        let a = store.checkout(&api(), Some("t1"));
        store.adopt("t1", &a);

        let b = store.checkout(&api(), Some("t1"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(store.is_empty());
    }

    #[test]
    fn full_store_drops_least_recently_used() {
        let store = WorkspaceStore::with_limits(Duration::from_secs(60), 2);
        for t in ["t1", "t2"] {
            let ws = store.checkout(&api(), Some(t));
            store.adopt(t, &ws);
        }
        // t1 becomes the most recent
        let _ = store.checkout(&api(), Some("t1"));

        let ws = store.checkout(&api(), Some("t3"));
        store.adopt("t3", &ws);

        assert_eq!(store.len(), 2);
        assert!(store.contains("t1"));
        assert!(!store.contains("t2"));
        assert!(store.contains("t3"));
    }
}
