//! The provider seam of the auth shim.
//!
//! Fallback order is data, not control flow: the shim walks an ordered list
//! of [`AuthProvider`]s and stops at the first success. Every provider
//! exposes the same capability set; an operation a provider cannot perform
//! answers [`ProviderError::Unsupported`] and the chain moves on.

use async_trait::async_trait;
use thiserror::Error;

use crate::api::users::ProfileUpdate;
use crate::api::Api;
use crate::error::ApiError;
use crate::session::store::TokenIssuer;
use crate::types::User;

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

/// What a provider answers for session-producing operations. `token` is
/// `None` when the provider accepted the operation but produced no usable
/// session yet (sign-up pending email confirmation).
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub token: Option<String>,
    pub issuer: TokenIssuer,
    pub user: User,
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Other(String),
    /// The provider has no equivalent of this operation; the chain skips it.
    #[error("operation not supported by this provider")]
    Unsupported,
}

impl ProviderError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Uniform capability set every authentication backend exposes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sign_up(&self, req: &SignUpRequest) -> ProviderResult<ProviderSession>;

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<ProviderSession>;

    /// Invalidate whatever session this provider holds. Callers swallow the
    /// error; sign-out must always complete locally.
    async fn sign_out(&self) -> ProviderResult<()>;

    /// A live session this provider itself holds, if any. Probed when the
    /// primary profile fetch cannot resolve the current user.
    async fn get_session(&self) -> ProviderResult<Option<ProviderSession>>;

    /// Fresh profile for the currently cached bearer token.
    async fn fetch_profile(&self) -> ProviderResult<User>;

    async fn forgot_password(&self, email: &str) -> ProviderResult<String>;

    /// `token` present routes through a reset-token flow; absent means the
    /// caller is already authenticated and just sets a new password.
    async fn reset_password(&self, new_password: &str, token: Option<&str>) -> ProviderResult<String>;

    async fn update_profile(&self, update: &ProfileUpdate) -> ProviderResult<User>;

    async fn refresh_session(&self) -> ProviderResult<ProviderSession> {
        Err(ProviderError::Unsupported)
    }
}

/// Forward the provider capability set through a shared `Arc`, so an
/// `Arc<T>` can stand in wherever a `dyn AuthProvider` is expected.
#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn sign_up(&self, req: &SignUpRequest) -> ProviderResult<ProviderSession> {
        (**self).sign_up(req).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<ProviderSession> {
        (**self).sign_in(email, password).await
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        (**self).sign_out().await
    }

    async fn get_session(&self) -> ProviderResult<Option<ProviderSession>> {
        (**self).get_session().await
    }

    async fn fetch_profile(&self) -> ProviderResult<User> {
        (**self).fetch_profile().await
    }

    async fn forgot_password(&self, email: &str) -> ProviderResult<String> {
        (**self).forgot_password(email).await
    }

    async fn reset_password(&self, new_password: &str, token: Option<&str>) -> ProviderResult<String> {
        (**self).reset_password(new_password, token).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ProviderResult<User> {
        (**self).update_profile(update).await
    }

    async fn refresh_session(&self) -> ProviderResult<ProviderSession> {
        (**self).refresh_session().await
    }
}

/// Primary backend REST API as an auth provider.
pub struct BackendProvider {
    api: Api,
}

impl BackendProvider {
    pub fn new(api: Api) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthProvider for BackendProvider {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn sign_up(&self, req: &SignUpRequest) -> ProviderResult<ProviderSession> {
        let resp = self
            .api
            .auth()
            .register(&req.email, &req.password, req.username.as_deref(), req.full_name.as_deref())
            .await?;
        let (Some(mut user), Some(token)) = (resp.user, resp.token) else {
            return Err(ProviderError::Other("registration response carried no session".into()));
        };
        if user.username.is_none() {
            user.username = req.username.clone();
        }
        if user.full_name.is_none() {
            user.full_name = req.full_name.clone();
        }
        Ok(ProviderSession {
            token: Some(token),
            issuer: TokenIssuer::Backend,
            user,
            message: Some(resp.message.unwrap_or_else(|| "Account created successfully!".into())),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<ProviderSession> {
        let resp = self.api.auth().login(email, password).await?;
        let (Some(user), Some(token)) = (resp.user, resp.token) else {
            return Err(ProviderError::Other("login response carried no session".into()));
        };
        Ok(ProviderSession { token: Some(token), issuer: TokenIssuer::Backend, user, message: None })
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        self.api.auth().logout().await?;
        Ok(())
    }

    async fn get_session(&self) -> ProviderResult<Option<ProviderSession>> {
        // The backend keeps no session besides the bearer token we carry
        Ok(None)
    }

    async fn fetch_profile(&self) -> ProviderResult<User> {
        Ok(self.api.users().profile(None).await?)
    }

    async fn forgot_password(&self, email: &str) -> ProviderResult<String> {
        Ok(self.api.auth().forgot_password(email).await?)
    }

    async fn reset_password(&self, new_password: &str, token: Option<&str>) -> ProviderResult<String> {
        match token {
            Some(t) => Ok(self.api.auth().reset_password(t, new_password).await?),
            None => Err(ProviderError::Unsupported),
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ProviderResult<User> {
        Ok(self.api.users().update_profile(update).await?)
    }

    async fn refresh_session(&self) -> ProviderResult<ProviderSession> {
        let resp = self.api.auth().refresh().await?;
        let (Some(user), Some(token)) = (resp.user, resp.token) else {
            return Err(ProviderError::Other("refresh response carried no session".into()));
        };
        Ok(ProviderSession { token: Some(token), issuer: TokenIssuer::Backend, user, message: None })
    }
}
