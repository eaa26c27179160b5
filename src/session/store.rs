//! Session persistence and change notification.
//!
//! The store is the single owner of the cached session record: an opaque
//! bearer token, its issuer, and the last User the backends answered with.
//! It is a display cache, not a trust source; nothing here decides
//! authorization. Watchers subscribe for session-changed notifications and
//! `refresh()` lets any external transport (another process, a file watcher,
//! a test) re-synchronize the in-memory view with the persisted record.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::User;

/// Who issued the current bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenIssuer {
    Backend,
    Identity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub token: String,
    pub issuer: TokenIssuer,
    pub user: User,
}

/// Where the session record lives between runs. Implementations are
/// best-effort: a failed write must not fail the sign-in that produced it.
pub trait StateBackend: Send + Sync {
    fn read(&self) -> Option<SessionRecord>;
    fn write(&self, rec: &SessionRecord);
    fn clear(&self);
}

/// Process-local backend; the default for tests and embedders that manage
/// persistence themselves.
#[derive(Default)]
pub struct MemoryBackend {
    slot: RwLock<Option<SessionRecord>>,
}

impl StateBackend for MemoryBackend {
    fn read(&self) -> Option<SessionRecord> {
        self.slot.read().clone()
    }
    fn write(&self, rec: &SessionRecord) {
        *self.slot.write() = Some(rec.clone());
    }
    fn clear(&self) {
        *self.slot.write() = None;
    }
}

/// JSON file backend, the localStorage analog for the console.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StateBackend for FileBackend {
    fn read(&self) -> Option<SessionRecord> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(rec) => Some(rec),
            Err(e) => {
                warn!("session file {} unreadable, ignoring: {}", self.path.display(), e);
                None
            }
        }
    }

    fn write(&self, rec: &SessionRecord) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("cannot create state dir {}: {}", parent.display(), e);
                return;
            }
        }
        match serde_json::to_string_pretty(rec) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!("cannot persist session to {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("cannot serialize session record: {}", e),
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("cannot remove session file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Best-effort expiry peek into a JWT bearer token. Display only; the
/// signature is not checked here; the server remains the judge of validity.
pub fn token_expiry(token: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    use base64::Engine;
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    chrono::TimeZone::timestamp_opt(&chrono::Utc, exp, 0).single()
}

pub type Watcher = Box<dyn Fn(Option<&User>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherId(u64);

pub struct SessionStore {
    backend: Box<dyn StateBackend>,
    current: RwLock<Option<SessionRecord>>,
    watchers: RwLock<Vec<(u64, Watcher)>>,
    next_watcher: AtomicU64,
}

impl SessionStore {
    pub fn new(backend: Box<dyn StateBackend>) -> Self {
        let current = backend.read();
        Self {
            backend,
            current: RwLock::new(current),
            watchers: RwLock::new(Vec::new()),
            next_watcher: AtomicU64::new(1),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    pub fn on_disk(path: PathBuf) -> Self {
        Self::new(Box::new(FileBackend::new(path)))
    }

    pub fn current(&self) -> Option<SessionRecord> {
        self.current.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|r| r.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.read().as_ref().map(|r| r.user.clone())
    }

    /// Commit a new session: memory, backend, then one broadcast.
    pub fn set(&self, rec: SessionRecord) {
        debug!("session.set user={} issuer={:?}", rec.user.id, rec.issuer);
        self.backend.write(&rec);
        let user = rec.user.clone();
        *self.current.write() = Some(rec);
        self.notify(Some(&user));
    }

    /// Replace the stored user, keeping the token. No-op when signed out.
    pub fn update_user(&self, user: User) {
        let updated = {
            let mut cur = self.current.write();
            match cur.as_mut() {
                Some(rec) => {
                    rec.user = user.clone();
                    self.backend.write(rec);
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify(Some(&user));
        }
    }

    /// Swap the bearer token in place (token refresh). Keeps the user and
    /// does not broadcast: the perceived identity did not change.
    pub fn replace_token(&self, token: String, issuer: TokenIssuer) {
        let mut cur = self.current.write();
        if let Some(rec) = cur.as_mut() {
            rec.token = token;
            rec.issuer = issuer;
            self.backend.write(rec);
        }
    }

    /// Drop the session everywhere and broadcast a signed-out state.
    /// Always broadcasts, so sign-out reliably produces its event even when
    /// the store was already empty.
    pub fn clear(&self) {
        debug!("session.clear");
        self.backend.clear();
        *self.current.write() = None;
        self.notify(None);
    }

    /// Re-read the backend (another process may have written it) and
    /// broadcast when the perceived session changed. Returns true on change.
    pub fn refresh(&self) -> bool {
        let fresh = self.backend.read();
        let changed = {
            let mut cur = self.current.write();
            if *cur == fresh {
                false
            } else {
                *cur = fresh.clone();
                true
            }
        };
        if changed {
            debug!("session.refresh picked up external change");
            match fresh {
                Some(rec) => self.notify(Some(&rec.user)),
                None => self.notify(None),
            }
        }
        changed
    }

    pub fn subscribe(&self, watcher: Watcher) -> WatcherId {
        let id = self.next_watcher.fetch_add(1, Ordering::Relaxed);
        self.watchers.write().push((id, watcher));
        WatcherId(id)
    }

    pub fn unsubscribe(&self, id: WatcherId) {
        self.watchers.write().retain(|(wid, _)| *wid != id.0);
    }

    fn notify(&self, user: Option<&User>) {
        let watchers = self.watchers.read();
        for (_, w) in watchers.iter() {
            w(user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn record(id: &str, token: &str) -> SessionRecord {
        let mut user = User::default();
        user.id = id.to_string();
        user.email = format!("{}@example.com", id);
        SessionRecord { token: token.to_string(), issuer: TokenIssuer::Backend, user }
    }

    #[test]
    fn set_then_current_and_token() {
        let store = SessionStore::in_memory();
        assert!(store.current().is_none());
        store.set(record("u1", "tok1"));
        assert_eq!(store.token().as_deref(), Some("tok1"));
        assert_eq!(store.user().unwrap().id, "u1");
    }

    #[test]
    fn watchers_see_set_and_clear() {
        let store = SessionStore::in_memory();
        let seen = Arc::new(AtomicUsize::new(0));
        let cleared = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        let cleared2 = cleared.clone();
        store.subscribe(Box::new(move |u| match u {
            Some(_) => { seen2.fetch_add(1, Ordering::SeqCst); }
            None => { cleared2.fetch_add(1, Ordering::SeqCst); }
        }));
        store.set(record("u1", "tok1"));
        store.clear();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(cleared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = SessionStore::in_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let id = store.subscribe(Box::new(move |_| { count2.fetch_add(1, Ordering::SeqCst); }));
        store.set(record("u1", "tok1"));
        store.unsubscribe(id);
        store.clear();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replace_token_keeps_user_without_broadcast() {
        let store = SessionStore::in_memory();
        store.set(record("u1", "tok1"));
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        store.subscribe(Box::new(move |_| { count2.fetch_add(1, Ordering::SeqCst); }));
        store.replace_token("tok2".into(), TokenIssuer::Identity);
        assert_eq!(store.token().as_deref(), Some("tok2"));
        assert_eq!(store.user().unwrap().id, "u1");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn token_expiry_reads_exp_claim() {
        use base64::Engine;
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(br#"{"exp":4102444800}"#);
        let token = format!("h.{}.sig", payload);
        let exp = token_expiry(&token).expect("expiry");
        assert_eq!(exp.timestamp(), 4102444800);
        assert!(token_expiry("not-a-jwt").is_none());
        assert!(token_expiry("a.b.c").is_none());
    }

    #[test]
    fn clear_on_empty_store_still_broadcasts() {
        let store = SessionStore::in_memory();
        let cleared = Arc::new(AtomicUsize::new(0));
        let cleared2 = cleared.clone();
        store.subscribe(Box::new(move |u| {
            if u.is_none() { cleared2.fetch_add(1, Ordering::SeqCst); }
        }));
        store.clear();
        assert_eq!(cleared.load(Ordering::SeqCst), 1);
    }
}
