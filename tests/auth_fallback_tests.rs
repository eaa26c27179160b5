//! Auth shim integration tests: fallback ordering, commit/broadcast
//! discipline, sign-out totality and current-user resolution, exercised
//! against scripted in-process providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use stoop::api::users::ProfileUpdate;
use stoop::session::provider::{
    AuthProvider, ProviderError, ProviderResult, ProviderSession, SignUpRequest,
};
use stoop::session::store::{SessionStore, TokenIssuer};
use stoop::session::AuthManager;
use stoop::types::{Role, User};

fn user(id: &str, email: &str) -> User {
    let mut u = User::default();
    u.id = id.to_string();
    u.email = email.to_string();
    u
}

/// Scripted provider. `fail_auth` makes every credentialed operation fail
/// with that message; otherwise sign-in/up answer `token` plus the current
/// `profile`. `fetch_profile`/`update_profile` are stateful so round-trips
/// observe writes.
struct FakeProvider {
    name: &'static str,
    issuer: TokenIssuer,
    token: Option<String>,
    fail_auth: Option<String>,
    fail_sign_out: bool,
    live_session: Mutex<Option<(String, User)>>,
    profile: Mutex<Option<User>>,
    reject_bearer: Mutex<bool>,
    sign_in_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl FakeProvider {
    fn new(name: &'static str, issuer: TokenIssuer) -> Arc<Self> {
        Arc::new(Self {
            name,
            issuer,
            token: None,
            fail_auth: None,
            fail_sign_out: false,
            live_session: Mutex::new(None),
            profile: Mutex::new(None),
            reject_bearer: Mutex::new(false),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        })
    }

    fn working(name: &'static str, issuer: TokenIssuer, token: &str, u: User) -> Arc<Self> {
        Arc::new(Self {
            name,
            issuer,
            token: Some(token.to_string()),
            fail_auth: None,
            fail_sign_out: false,
            live_session: Mutex::new(None),
            profile: Mutex::new(Some(u)),
            reject_bearer: Mutex::new(false),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str, issuer: TokenIssuer, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            issuer,
            token: None,
            fail_auth: Some(message.to_string()),
            fail_sign_out: true,
            live_session: Mutex::new(None),
            profile: Mutex::new(None),
            reject_bearer: Mutex::new(false),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        })
    }

    fn session(&self) -> ProviderResult<ProviderSession> {
        if let Some(msg) = &self.fail_auth {
            return Err(ProviderError::Other(msg.clone()));
        }
        let user = self.profile.lock().clone().unwrap_or_default();
        Ok(ProviderSession {
            token: self.token.clone(),
            issuer: self.issuer,
            user,
            message: None,
        })
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn sign_up(&self, _req: &SignUpRequest) -> ProviderResult<ProviderSession> {
        self.session()
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> ProviderResult<ProviderSession> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.session()
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            return Err(ProviderError::Other("sign-out rejected".into()));
        }
        Ok(())
    }

    async fn get_session(&self) -> ProviderResult<Option<ProviderSession>> {
        Ok(self.live_session.lock().clone().map(|(token, user)| ProviderSession {
            token: Some(token),
            issuer: self.issuer,
            user,
            message: None,
        }))
    }

    async fn fetch_profile(&self) -> ProviderResult<User> {
        if *self.reject_bearer.lock() {
            return Err(ProviderError::Api(stoop::error::ApiError::from_status(
                401,
                "jwt expired".into(),
            )));
        }
        match self.profile.lock().clone() {
            Some(u) => Ok(u),
            None => Err(ProviderError::Other("profile unavailable".into())),
        }
    }

    async fn forgot_password(&self, _email: &str) -> ProviderResult<String> {
        match &self.fail_auth {
            Some(msg) => Err(ProviderError::Other(msg.clone())),
            None => Ok("Password reset email sent.".into()),
        }
    }

    async fn reset_password(&self, _new_password: &str, token: Option<&str>) -> ProviderResult<String> {
        // Backend handles token resets, identity handles in-session resets
        let applicable = match self.issuer {
            TokenIssuer::Backend => token.is_some(),
            TokenIssuer::Identity => token.is_none(),
        };
        if !applicable {
            return Err(ProviderError::Unsupported);
        }
        match &self.fail_auth {
            Some(msg) => Err(ProviderError::Other(msg.clone())),
            None => Ok("Password updated successfully.".into()),
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ProviderResult<User> {
        if let Some(msg) = &self.fail_auth {
            return Err(ProviderError::Other(msg.clone()));
        }
        let mut guard = self.profile.lock();
        let Some(u) = guard.as_mut() else {
            return Err(ProviderError::Other("profile unavailable".into()));
        };
        if let Some(v) = &update.username {
            u.username = Some(v.clone());
        }
        if let Some(v) = &update.full_name {
            u.full_name = Some(v.clone());
        }
        if let Some(v) = &update.bio {
            u.bio = Some(v.clone());
        }
        Ok(u.clone())
    }
}

struct Fixture {
    auth: AuthManager,
    store: Arc<SessionStore>,
    events: Arc<Mutex<Vec<Option<String>>>>,
}

fn fixture(primary: Arc<FakeProvider>, fallback: Arc<FakeProvider>) -> Fixture {
    let store = Arc::new(SessionStore::in_memory());
    let events: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    store.subscribe(Box::new(move |u| {
        sink.lock().push(u.map(|u| u.id.clone()));
    }));
    let auth = AuthManager::new(vec![Box::new(primary), Box::new(fallback)], store.clone());
    Fixture { auth, store, events }
}

#[tokio::test]
async fn primary_success_never_invokes_fallback() {
    let primary = FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"));
    let fallback = FakeProvider::working("identity", TokenIssuer::Identity, "tok-i", user("u1", "a@b.com"));
    let fx = fixture(primary.clone(), fallback.clone());

    let sess = fx.auth.sign_in("a@b.com", "pw").await.expect("sign in");
    assert_eq!(sess.token, "tok-b");
    assert_eq!(fallback.sign_in_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fx.store.token().as_deref(), Some("tok-b"));
    assert_eq!(fx.store.current().unwrap().issuer, TokenIssuer::Backend);
}

#[tokio::test]
async fn fallback_token_persisted_and_one_event_fired() {
    let primary = FakeProvider::failing("backend", TokenIssuer::Backend, "HTTP 500 on /auth/login");
    let fallback = FakeProvider::working("identity", TokenIssuer::Identity, "tok1", user("u1", "a@b.com"));
    let fx = fixture(primary, fallback);

    let sess = fx.auth.sign_in("a@b.com", "pw").await.expect("fallback sign in");
    assert_eq!(sess.token, "tok1");
    assert_eq!(sess.user.id, "u1");
    assert_eq!(sess.user.email, "a@b.com");
    assert_eq!(sess.user.role, Role::User);
    assert_eq!(fx.store.token().as_deref(), Some("tok1"));
    assert_eq!(fx.store.current().unwrap().issuer, TokenIssuer::Identity);

    let events = fx.events.lock();
    assert_eq!(events.len(), 1, "exactly one session-changed broadcast");
    assert_eq!(events[0].as_deref(), Some("u1"));
}

#[tokio::test]
async fn both_failing_prefers_primary_message() {
    let primary = FakeProvider::failing("backend", TokenIssuer::Backend, "invalid credentials");
    let fallback = FakeProvider::failing("identity", TokenIssuer::Identity, "Invalid login credentials");
    let fx = fixture(primary, fallback);

    let err = fx.auth.sign_in("a@b.com", "pw").await.expect_err("both fail");
    assert_eq!(err.to_string(), "invalid credentials");
    assert!(fx.store.current().is_none());
    assert!(fx.events.lock().is_empty(), "no broadcast on failure");
}

#[tokio::test]
async fn fallback_message_used_when_primary_has_none() {
    // In-session reset: backend is not applicable (no token), so the only
    // recorded message is the identity provider's.
    let primary = FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"));
    let fallback = FakeProvider::failing("identity", TokenIssuer::Identity, "weak password");
    let fx = fixture(primary, fallback);

    let err = fx.auth.reset_password("pw2", None).await.expect_err("reset fails");
    assert_eq!(err.to_string(), "weak password");
}

#[tokio::test]
async fn sign_out_is_total_and_idempotent() {
    let primary = FakeProvider::failing("backend", TokenIssuer::Backend, "boom");
    let fallback = FakeProvider::failing("identity", TokenIssuer::Identity, "boom");
    let fx = fixture(primary.clone(), fallback.clone());

    fx.store.set(stoop::session::SessionRecord {
        token: "tok".into(),
        issuer: TokenIssuer::Backend,
        user: user("u1", "a@b.com"),
    });
    fx.events.lock().clear();

    fx.auth.sign_out().await;
    assert!(fx.store.current().is_none(), "cache cleared despite both rejections");
    assert_eq!(primary.sign_out_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fallback.sign_out_calls.load(Ordering::SeqCst), 1);
    {
        let events = fx.events.lock();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_none(), "broadcasts a null session");
    }

    // Signing out again still succeeds and still broadcasts
    fx.auth.sign_out().await;
    assert!(fx.store.current().is_none());
    assert_eq!(fx.events.lock().len(), 2);
}

#[tokio::test]
async fn current_user_with_nothing_anywhere_is_none() {
    let primary = FakeProvider::new("backend", TokenIssuer::Backend);
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary, fallback);
    assert!(fx.auth.current_user().await.is_none());
}

#[tokio::test]
async fn current_user_prefers_fresh_primary_profile() {
    let primary = FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"));
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary.clone(), fallback);

    fx.store.set(stoop::session::SessionRecord {
        token: "tok-b".into(),
        issuer: TokenIssuer::Backend,
        user: user("stale", "stale@b.com"),
    });

    // Fresh profile replaces the stale cached user
    *primary.profile.lock() = Some(user("u1", "fresh@b.com"));
    let u = fx.auth.current_user().await.expect("resolves");
    assert_eq!(u.email, "fresh@b.com");
    assert_eq!(fx.store.user().unwrap().email, "fresh@b.com", "re-persisted");
}

#[tokio::test]
async fn current_user_adopts_identity_live_session() {
    let primary = FakeProvider::failing("backend", TokenIssuer::Backend, "down");
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    *fallback.live_session.lock() = Some(("tok-live".into(), user("u9", "live@b.com")));
    let fx = fixture(primary, fallback);

    fx.store.set(stoop::session::SessionRecord {
        token: "tok-old".into(),
        issuer: TokenIssuer::Backend,
        user: user("old", "old@b.com"),
    });

    let u = fx.auth.current_user().await.expect("resolves");
    assert_eq!(u.id, "u9");
    assert_eq!(fx.store.token().as_deref(), Some("tok-live"));
    assert_eq!(fx.store.current().unwrap().issuer, TokenIssuer::Identity);
}

#[tokio::test]
async fn current_user_falls_back_to_stale_cache() {
    let primary = FakeProvider::failing("backend", TokenIssuer::Backend, "down");
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary, fallback);

    let cached = user("u2", "c@d.com");
    fx.store.set(stoop::session::SessionRecord {
        token: "tok-cached".into(),
        issuer: TokenIssuer::Backend,
        user: cached.clone(),
    });

    let u = fx.auth.current_user().await.expect("stale cache serves");
    assert_eq!(u, cached, "cached object returned unchanged");
}

#[tokio::test]
async fn current_user_never_errors_across_all_combinations() {
    for token_cached in [false, true] {
        for primary_up in [false, true] {
            for idp_session in [false, true] {
                for cache_present in [false, true] {
                    let primary = if primary_up {
                        FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"))
                    } else {
                        FakeProvider::failing("backend", TokenIssuer::Backend, "down")
                    };
                    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
                    if idp_session {
                        *fallback.live_session.lock() = Some(("tok-i".into(), user("u9", "i@b.com")));
                    }
                    let fx = fixture(primary, fallback);
                    if cache_present || token_cached {
                        fx.store.set(stoop::session::SessionRecord {
                            token: "tok-cached".into(),
                            issuer: TokenIssuer::Backend,
                            user: user("u2", "c@d.com"),
                        });
                    }
                    // Must never panic or error, whatever the combination
                    let resolved = fx.auth.current_user().await;
                    let expect_some = (token_cached && primary_up)
                        || idp_session
                        || cache_present
                        || token_cached;
                    assert_eq!(resolved.is_some(), expect_some,
                        "token_cached={} primary_up={} idp_session={} cache_present={}",
                        token_cached, primary_up, idp_session, cache_present);
                }
            }
        }
    }
}

#[tokio::test]
async fn update_profile_roundtrip_observes_new_username() {
    let primary = FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"));
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary, fallback);

    fx.auth.sign_in("a@b.com", "pw").await.expect("sign in");
    let mut update = ProfileUpdate::default();
    update.username = Some("x".into());
    let updated = fx.auth.update_profile(&update).await.expect("update");
    assert_eq!(updated.username.as_deref(), Some("x"));

    let current = fx.auth.current_user().await.expect("resolves");
    assert_eq!(current.username.as_deref(), Some("x"));
    assert_eq!(fx.store.user().unwrap().username.as_deref(), Some("x"));
}

#[tokio::test]
async fn update_profile_broadcasts_session_change() {
    let primary = FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"));
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary, fallback);

    fx.auth.sign_in("a@b.com", "pw").await.expect("sign in");
    fx.events.lock().clear();

    let mut update = ProfileUpdate::default();
    update.bio = Some("hello".into());
    fx.auth.update_profile(&update).await.expect("update");
    assert_eq!(fx.events.lock().len(), 1);
}

#[tokio::test]
async fn provider_events_resynchronize_the_store() {
    use stoop::session::AuthEvent;

    let primary = FakeProvider::new("backend", TokenIssuer::Backend);
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary, fallback);

    fx.auth.apply_provider_event(AuthEvent::SignedIn {
        token: "tok-oauth".into(),
        user: user("u5", "oauth@b.com"),
    });
    assert_eq!(fx.store.token().as_deref(), Some("tok-oauth"));

    fx.auth.apply_provider_event(AuthEvent::TokenRefreshed { token: "tok-oauth-2".into() });
    assert_eq!(fx.store.token().as_deref(), Some("tok-oauth-2"));
    assert_eq!(fx.store.user().unwrap().id, "u5", "user survives token refresh");

    fx.auth.apply_provider_event(AuthEvent::SignedOut);
    assert!(fx.store.current().is_none());
}

#[tokio::test]
async fn sign_up_without_session_commits_nothing() {
    // Identity answered "confirmation email pending": user but no token
    let primary = FakeProvider::failing("backend", TokenIssuer::Backend, "registration closed");
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    *fallback.profile.lock() = Some(user("u7", "new@b.com"));
    let fx = fixture(primary, fallback);

    let outcome = fx.auth.sign_up("new@b.com", "pw", None, None).await.expect("accepted");
    assert_eq!(outcome.user.id, "u7");
    assert!(outcome.token.is_none());
    assert!(fx.store.current().is_none(), "no session persisted while unconfirmed");
    assert!(fx.events.lock().is_empty());
}

#[tokio::test]
async fn rejected_bearer_token_drops_the_session() {
    let primary = FakeProvider::working("backend", TokenIssuer::Backend, "tok-b", user("u1", "a@b.com"));
    let fallback = FakeProvider::new("identity", TokenIssuer::Identity);
    let fx = fixture(primary.clone(), fallback);

    fx.auth.sign_in("a@b.com", "pw").await.expect("sign in");
    *primary.reject_bearer.lock() = true;

    // A definite 401 invalidates the cached session instead of serving it stale
    assert!(fx.auth.current_user().await.is_none());
    assert!(fx.store.current().is_none());
}
