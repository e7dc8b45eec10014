use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::Session;

/// Sessions untouched for this long are dropped when new ones are created.
pub const SESSION_IDLE_HOURS: i64 = 12;
/// Upper bound on live sessions; the least recently seen one makes room for a new one.
pub const MAX_SESSIONS: usize = 10_000;

struct Entry {
    session: Session,
    last_seen: DateTime<Utc>,
}

/// Process-local session table keyed by the cookie token. Nothing is persisted.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Start a fresh `login` session and return its token.
    pub async fn create(&self) -> Uuid {
        let now = Utc::now();
        let cutoff = now - Duration::hours(SESSION_IDLE_HOURS);
        let token = Uuid::new_v4();

        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.last_seen > cutoff);
        let pruned = before - guard.len();
        if pruned > 0 {
            debug!(pruned, "dropped idle sessions");
        }

        while guard.len() >= self.capacity {
            let Some(oldest) = guard
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(token, _)| *token)
            else {
                break;
            };
            guard.remove(&oldest);
            debug!(capacity = self.capacity, "evicted least recently seen session");
        }

        guard.insert(
            token,
            Entry {
                session: Session::new(),
                last_seen: now,
            },
        );
        token
    }

    pub async fn get(&self, token: Uuid) -> Option<Session> {
        let mut guard = self.inner.write().await;
        let entry = guard.get_mut(&token)?;
        entry.last_seen = Utc::now();
        Some(entry.session.clone())
    }

    /// Apply `apply` to the session behind `token`, if it still exists.
    pub async fn update<F, R>(&self, token: Uuid, apply: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut guard = self.inner.write().await;
        let entry = guard.get_mut(&token)?;
        entry.last_seen = Utc::now();
        Some(apply(&mut entry.session))
    }

    /// Replace the state behind `token`. Returns false if the session has been dropped.
    pub async fn save(&self, token: Uuid, session: Session) -> bool {
        let mut guard = self.inner.write().await;
        match guard.get_mut(&token) {
            Some(entry) => {
                entry.session = session;
                entry.last_seen = Utc::now();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CredentialPolicy, Page, Role};

    #[tokio::test]
    async fn created_session_starts_on_login() {
        let store = SessionStore::new();
        let token = store.create().await;
        let session = store.get(token).await.expect("session exists");
        assert_eq!(session.page(), Page::Login);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn saved_state_is_visible_then_logout_resets_it() {
        let policy = CredentialPolicy::with_plain_admin_password(
            "admin",
            "admin123",
            crate::session::default_student_ranges(),
        )
        .unwrap();
        let store = SessionStore::new();
        let token = store.create().await;

        let mut session = store.get(token).await.unwrap();
        session.login(&policy, "22F01A4210", "22F01A4210").unwrap();
        assert!(store.save(token, session).await);
        assert_eq!(store.get(token).await.unwrap().role(), Some(Role::User));

        store.update(token, Session::logout).await.expect("session exists");
        let session = store.get(token).await.unwrap();
        assert_eq!(session.page(), Page::Login);
        assert_eq!(session.role(), None);
    }

    #[tokio::test]
    async fn unknown_token_yields_nothing() {
        let store = SessionStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
        assert!(store.update(Uuid::new_v4(), |_| ()).await.is_none());
        assert!(!store.save(Uuid::new_v4(), Session::new()).await);
    }

    async fn backdate(store: &SessionStore, token: Uuid, hours: i64) {
        let mut guard = store.inner.write().await;
        let entry = guard.get_mut(&token).expect("session exists");
        entry.last_seen = Utc::now() - Duration::hours(hours);
    }

    #[tokio::test]
    async fn idle_sessions_are_pruned_on_create() {
        let store = SessionStore::new();
        let stale = store.create().await;
        let fresh = store.create().await;
        backdate(&store, stale, SESSION_IDLE_HOURS + 1).await;
        backdate(&store, fresh, SESSION_IDLE_HOURS - 1).await;

        let newest = store.create().await;
        assert!(store.get(stale).await.is_none());
        assert!(store.get(fresh).await.is_some());
        assert!(store.get(newest).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn full_store_evicts_least_recently_seen() {
        let store = SessionStore::with_capacity(2);
        let first = store.create().await;
        let second = store.create().await;
        backdate(&store, first, 1).await;
        backdate(&store, second, 2).await;

        let third = store.create().await;
        assert_eq!(store.len().await, 2);
        assert!(store.get(second).await.is_none());
        assert!(store.get(first).await.is_some());
        assert!(store.get(third).await.is_some());

        for _ in 0..5 {
            store.create().await;
        }
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        let first = store.create().await;
        let second = store.create().await;
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }
}
