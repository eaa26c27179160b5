//! Session store persistence tests: file backend round-trips, corrupt-state
//! tolerance, and cross-process convergence through `refresh()`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::tempdir;

use stoop::session::store::{SessionRecord, SessionStore, TokenIssuer};
use stoop::types::User;

fn record(id: &str, token: &str) -> SessionRecord {
    let mut user = User::default();
    user.id = id.to_string();
    user.email = format!("{}@example.com", id);
    user.username = Some(id.to_string());
    SessionRecord { token: token.to_string(), issuer: TokenIssuer::Backend, user }
}

#[test]
fn file_backend_round_trips_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = SessionStore::on_disk(path.clone());
    store.set(record("u1", "tok1"));
    drop(store);

    // A fresh store picks the persisted session up at construction
    let reopened = SessionStore::on_disk(path);
    let current = reopened.current().expect("persisted session");
    assert_eq!(current.token, "tok1");
    assert_eq!(current.user.id, "u1");
    assert_eq!(current.issuer, TokenIssuer::Backend);
}

#[test]
fn clear_removes_the_persisted_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = SessionStore::on_disk(path.clone());
    store.set(record("u1", "tok1"));
    assert!(path.exists());
    store.clear();
    assert!(!path.exists());

    let reopened = SessionStore::on_disk(path);
    assert!(reopened.current().is_none());
}

#[test]
fn corrupt_session_file_is_treated_as_signed_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = SessionStore::on_disk(path);
    assert!(store.current().is_none());
    // And the store remains usable
    store.set(record("u1", "tok1"));
    assert_eq!(store.token().as_deref(), Some("tok1"));
}

#[test]
fn missing_state_dir_is_created_on_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deep").join("nested").join("session.json");

    let store = SessionStore::on_disk(path.clone());
    store.set(record("u1", "tok1"));
    assert!(path.exists());
}

#[test]
fn refresh_converges_two_stores_on_the_same_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    // Two "tabs" over the same persisted state
    let tab_a = SessionStore::on_disk(path.clone());
    let tab_b = SessionStore::on_disk(path);

    let seen = Arc::new(AtomicUsize::new(0));
    let cleared = Arc::new(AtomicUsize::new(0));
    let seen2 = seen.clone();
    let cleared2 = cleared.clone();
    tab_b.subscribe(Box::new(move |u| match u {
        Some(_) => {
            seen2.fetch_add(1, Ordering::SeqCst);
        }
        None => {
            cleared2.fetch_add(1, Ordering::SeqCst);
        }
    }));

    // Sign-in in tab A propagates to tab B on refresh
    tab_a.set(record("u1", "tok1"));
    assert!(tab_b.current().is_none(), "not yet refreshed");
    assert!(tab_b.refresh());
    assert_eq!(tab_b.token().as_deref(), Some("tok1"));
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // No-op refresh does not broadcast again
    assert!(!tab_b.refresh());
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // Sign-out in tab A propagates as a null session
    tab_a.clear();
    assert!(tab_b.refresh());
    assert!(tab_b.current().is_none());
    assert_eq!(cleared.load(Ordering::SeqCst), 1);
}

#[test]
fn last_write_wins_between_stores() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let tab_a = SessionStore::on_disk(path.clone());
    let tab_b = SessionStore::on_disk(path);

    tab_a.set(record("u1", "tok1"));
    tab_b.set(record("u2", "tok2"));

    // Both converge on the most recent write
    assert!(tab_a.refresh());
    assert_eq!(tab_a.user().unwrap().id, "u2");
    assert_eq!(tab_b.user().unwrap().id, "u2");
}
