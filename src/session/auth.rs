//! Session reconciliation across an ordered list of auth providers.
//!
//! Every operation walks the provider list in order and commits exactly one
//! success: persistence and broadcast happen only after a provider has
//! definitely answered, and fallback is attempted only after the one before
//! it has definitely failed. The persisted record is a display cache; a
//! stale read is acceptable, an authorization decision from it is not.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::users::ProfileUpdate;
use crate::session::provider::{AuthProvider, ProviderError, ProviderSession, SignUpRequest};
use crate::session::store::{SessionRecord, SessionStore, TokenIssuer};
use crate::types::User;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Failure from the primary backend on a primary-only path.
    #[error("{0}")]
    Primary(String),
    /// Failure from the identity provider on an identity-only path.
    #[error("{0}")]
    Identity(String),
    /// Every provider in the chain failed. The display message prefers the
    /// primary's, since that is the system of record.
    #[error("{message}")]
    BothFailed {
        message: String,
        primary: Option<String>,
        fallback: Option<String>,
    },
}

impl AuthError {
    fn both(primary: Option<String>, fallback: Option<String>, fallback_text: &str) -> Self {
        let message = primary
            .clone()
            .or_else(|| fallback.clone())
            .unwrap_or_else(|| fallback_text.to_string());
        AuthError::BothFailed { message, primary, fallback }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Result of a committed sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub issuer: TokenIssuer,
}

/// Result of sign-up; `token` is absent when activation is pending.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: User,
    pub token: Option<String>,
    pub message: String,
}

/// Auth-state change reported by a provider's own notification channel.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn { token: String, user: User },
    SignedOut,
    TokenRefreshed { token: String },
}

pub struct AuthManager {
    providers: Vec<Box<dyn AuthProvider>>,
    store: Arc<SessionStore>,
}

impl AuthManager {
    /// `providers` in fallback order: the first entry is the system of
    /// record, later entries are tried only after it definitely failed.
    pub fn new(providers: Vec<Box<dyn AuthProvider>>, store: Arc<SessionStore>) -> Self {
        Self { providers, store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
        full_name: Option<&str>,
    ) -> AuthResult<SignUpOutcome> {
        let req = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            username: username.map(str::to_string),
            full_name: full_name.map(str::to_string),
        };
        let mut errors = ChainErrors::default();
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.sign_up(&req).await {
                Ok(sess) => {
                    let message = sess
                        .message
                        .clone()
                        .unwrap_or_else(|| "Account created successfully!".into());
                    let token = sess.token.clone();
                    let user = self.commit_if_session(sess);
                    return Ok(SignUpOutcome { user, token, message });
                }
                Err(ProviderError::Unsupported) => continue,
                Err(e) => errors.record(idx, provider.name(), "sign-up", e),
            }
        }
        Err(errors.into_error("Failed to create account"))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let mut errors = ChainErrors::default();
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.sign_in(email, password).await {
                Ok(sess) => {
                    let Some(token) = sess.token.clone() else {
                        errors.record(
                            idx,
                            provider.name(),
                            "sign-in",
                            ProviderError::Other("sign-in produced no token".into()),
                        );
                        continue;
                    };
                    let issuer = sess.issuer;
                    let user = self.commit_if_session(sess);
                    info!("signed in user={} via {}", user.id, provider.name());
                    return Ok(AuthSession { user, token, issuer });
                }
                Err(ProviderError::Unsupported) => continue,
                Err(e) => errors.record(idx, provider.name(), "sign-in", e),
            }
        }
        Err(errors.into_error("Failed to sign in"))
    }

    /// Total sign-out: every provider is asked to invalidate its session and
    /// every failure is swallowed; the local cache is cleared and a `None`
    /// session broadcast regardless. Never returns an error.
    pub async fn sign_out(&self) {
        for provider in &self.providers {
            if let Err(e) = provider.sign_out().await {
                warn!("sign-out via {} failed (ignored): {}", provider.name(), e.message());
            }
        }
        self.store.clear();
        info!("signed out");
    }

    /// Resolve the current user without ever failing:
    /// (a) cached token: fresh profile from the primary, re-persisted;
    /// (b) any provider holding a live session: adopt and persist it;
    /// (c) the stale persisted user, if any.
    pub async fn current_user(&self) -> Option<User> {
        if self.store.token().is_some() {
            if let Some(primary) = self.providers.first() {
                match primary.fetch_profile().await {
                    Ok(user) => {
                        self.store.update_user(user.clone());
                        return Some(user);
                    }
                    Err(e) => {
                        // A definite 401/403 means the token is dead; a
                        // network failure keeps the stale-cache fallback.
                        if let ProviderError::Api(api) = &e {
                            if api.is_auth_failure() {
                                debug!("bearer token rejected by {}, dropping session", primary.name());
                                self.store.clear();
                            }
                        }
                        debug!("profile fetch via {} failed: {}", primary.name(), e.message())
                    }
                }
            }
        }
        for provider in &self.providers {
            match provider.get_session().await {
                Ok(Some(sess)) => {
                    if let Some(token) = sess.token.clone() {
                        let user = sess.user.clone();
                        self.store.set(SessionRecord { token, issuer: sess.issuer, user: user.clone() });
                        return Some(user);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("session probe via {} failed: {}", provider.name(), e.message()),
            }
        }
        self.store.user()
    }

    pub async fn forgot_password(&self, email: &str) -> AuthResult<String> {
        let mut errors = ChainErrors::default();
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.forgot_password(email).await {
                Ok(message) => return Ok(message),
                Err(ProviderError::Unsupported) => continue,
                Err(e) => errors.record(idx, provider.name(), "forgot-password", e),
            }
        }
        Err(errors.into_error("Failed to send reset email"))
    }

    /// With a reset token the primary backend's flow applies; without one the
    /// identity provider updates the authenticated user's password.
    pub async fn reset_password(&self, new_password: &str, token: Option<&str>) -> AuthResult<String> {
        let mut errors = ChainErrors::default();
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.reset_password(new_password, token).await {
                Ok(message) => return Ok(message),
                Err(ProviderError::Unsupported) => continue,
                Err(e) => errors.record(idx, provider.name(), "reset-password", e),
            }
        }
        Err(errors.into_error("Failed to reset password"))
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> AuthResult<User> {
        let mut errors = ChainErrors::default();
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.update_profile(update).await {
                Ok(user) => {
                    // Re-persist and broadcast so every view converges
                    self.store.update_user(user.clone());
                    return Ok(user);
                }
                Err(ProviderError::Unsupported) => continue,
                Err(e) => errors.record(idx, provider.name(), "update-profile", e),
            }
        }
        Err(errors.into_error("Failed to update profile"))
    }

    /// Refresh the bearer token wherever a provider can; the refreshed
    /// session replaces the persisted one without an identity change event.
    pub async fn refresh_token(&self) -> AuthResult<AuthSession> {
        let mut errors = ChainErrors::default();
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.refresh_session().await {
                Ok(sess) => {
                    let Some(token) = sess.token.clone() else { continue };
                    self.store.replace_token(token.clone(), sess.issuer);
                    return Ok(AuthSession { user: sess.user, token, issuer: sess.issuer });
                }
                Err(ProviderError::Unsupported) => continue,
                Err(e) => errors.record(idx, provider.name(), "refresh", e),
            }
        }
        Err(errors.into_error("Failed to refresh session"))
    }

    /// Apply an auth-state change pushed by a provider's notification
    /// channel (the cross-tab / OAuth-completion path).
    pub fn apply_provider_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn { token, user } => {
                self.store.set(SessionRecord { token, issuer: TokenIssuer::Identity, user });
            }
            AuthEvent::SignedOut => self.store.clear(),
            AuthEvent::TokenRefreshed { token } => {
                self.store.replace_token(token, TokenIssuer::Identity);
            }
        }
    }

    /// Persist and broadcast when the provider produced a usable session;
    /// sign-up pending confirmation commits nothing.
    fn commit_if_session(&self, sess: ProviderSession) -> User {
        let user = sess.user.clone();
        if let Some(token) = sess.token {
            self.store.set(SessionRecord { token, issuer: sess.issuer, user: user.clone() });
        }
        user
    }
}

/// Collects per-provider failure messages during a fallback walk. The first
/// provider's message is "primary", the first message from any later
/// provider is "fallback".
#[derive(Default)]
struct ChainErrors {
    primary: Option<String>,
    fallback: Option<String>,
}

impl ChainErrors {
    fn record(&mut self, idx: usize, provider: &str, op: &str, err: ProviderError) {
        let message = err.message();
        debug!("{} via {} failed: {}", op, provider, message);
        if idx == 0 {
            if self.primary.is_none() {
                self.primary = Some(message);
            }
        } else if self.fallback.is_none() {
            self.fallback = Some(message);
        }
    }

    fn into_error(self, fallback_text: &str) -> AuthError {
        AuthError::both(self.primary, self.fallback, fallback_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_failed_prefers_primary_message() {
        let e = AuthError::both(Some("primary says no".into()), Some("idp says no".into()), "generic");
        assert_eq!(e.to_string(), "primary says no");
        let e = AuthError::both(None, Some("idp says no".into()), "generic");
        assert_eq!(e.to_string(), "idp says no");
        let e = AuthError::both(None, None, "generic");
        assert_eq!(e.to_string(), "generic");
    }
}
