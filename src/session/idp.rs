//! Identity-provider client (GoTrue-compatible REST surface) and its
//! [`AuthProvider`] adapter. This is the fallback backend: it holds its own
//! native session (access token, optional refresh token, user) and maps the
//! provider's user shape into the platform [`User`].

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::api::users::ProfileUpdate;
use crate::error::{ApiError, ApiResult};
use crate::session::provider::{
    AuthProvider, ProviderError, ProviderResult, ProviderSession, SignUpRequest,
};
use crate::session::store::TokenIssuer;
use crate::types::{Role, User};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdpUser {
    pub id: String,
    pub email: Option<String>,
    pub user_metadata: Map<String, Value>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdpSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<IdpUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    fn slug(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

/// Map the identity provider's user representation into the platform shape.
/// Username defaults to the email local part, role to `user`.
pub fn map_identity_user(idp: &IdpUser) -> User {
    let meta = &idp.user_metadata;
    let str_meta = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|k| meta.get(*k).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let email = idp.email.clone().unwrap_or_default();
    let username = str_meta(&["username"])
        .or_else(|| email.split('@').next().filter(|s| !s.is_empty()).map(str::to_string));
    let role = str_meta(&["role"])
        .and_then(|r| serde_json::from_value(Value::String(r)).ok())
        .unwrap_or(Role::User);
    let mut user = User::default();
    user.id = idp.id.clone();
    user.email = email;
    user.username = username;
    user.full_name = str_meta(&["full_name", "fullName"]);
    user.avatar_url = str_meta(&["avatar_url", "avatarUrl"]);
    user.role = role;
    user.created_at = idp.created_at.clone();
    user
}

pub struct IdentityClient {
    base: Url,
    key: String,
    http: reqwest::Client,
    session: RwLock<Option<IdpSession>>,
}

impl IdentityClient {
    pub fn new(base_url: &str, key: &str, timeout_secs: u64) -> ApiResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::config("bad_idp_url".into(), format!("{}: {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { base, key: key.to_string(), http, session: RwLock::new(None) })
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let mut base = self.base.as_str().trim_end_matches('/').to_string();
        base.push_str("/auth/v1/");
        base.push_str(path.trim_start_matches('/'));
        Url::parse(&base).map_err(|e| ApiError::config("bad_idp_url".into(), e.to_string()))
    }

    fn headers(&self, bearer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.key) {
            headers.insert("apikey", v);
        }
        let token = bearer.unwrap_or(&self.key);
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let url = self.endpoint(path)?;
        let mut req = self.http.request(method.clone(), url.clone()).headers(self.headers(bearer));
        if let Some(b) = body {
            req = req.json(&b);
        }
        debug!("idp {} {}", method, url.path());
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = idp_error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("identity request failed").to_string());
            warn!("idp error: {} {} => {}", status.as_u16(), path, message);
            return Err(ApiError::from_status(status.as_u16(), message));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn remember(&self, session: IdpSession) {
        *self.session.write() = Some(session);
    }

    fn bearer(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn native_session(&self) -> Option<IdpSession> {
        self.session.read().clone()
    }

    pub fn forget_session(&self) {
        *self.session.write() = None;
    }

    /// Password sign-up. Depending on project settings the answer is either a
    /// full session or a bare user awaiting email confirmation.
    pub async fn sign_up(&self, req: &SignUpRequest) -> ApiResult<(Option<IdpSession>, IdpUser)> {
        let username = req
            .username
            .clone()
            .unwrap_or_else(|| req.email.split('@').next().unwrap_or(&req.email).to_string());
        let body = json!({
            "email": req.email,
            "password": req.password,
            "data": {
                "username": username,
                "full_name": req.full_name.clone().unwrap_or_default(),
            },
        });
        let v = self.call(Method::POST, "signup", None, Some(body)).await?;
        if v.get("access_token").is_some() {
            let session: IdpSession = serde_json::from_value(v)?;
            let user = session.user.clone().unwrap_or_default();
            self.remember(session.clone());
            return Ok((Some(session), user));
        }
        // No session: confirmation email pending
        let user: IdpUser = serde_json::from_value(v)?;
        Ok((None, user))
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ApiResult<IdpSession> {
        let body = json!({"email": email, "password": password});
        let v = self
            .call(Method::POST, "token?grant_type=password", None, Some(body))
            .await?;
        let session: IdpSession = serde_json::from_value(v)?;
        self.remember(session.clone());
        Ok(session)
    }

    pub async fn refresh(&self) -> ApiResult<IdpSession> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| ApiError::auth("no_refresh_token", "no refresh token held"))?;
        let body = json!({"refresh_token": refresh_token});
        let v = self
            .call(Method::POST, "token?grant_type=refresh_token", None, Some(body))
            .await?;
        let session: IdpSession = serde_json::from_value(v)?;
        self.remember(session.clone());
        Ok(session)
    }

    pub async fn get_user(&self) -> ApiResult<IdpUser> {
        let bearer = self.bearer();
        let v = self.call(Method::GET, "user", bearer.as_deref(), None).await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Update password and/or metadata on the identity user.
    pub async fn update_user(&self, password: Option<&str>, metadata: Option<Value>) -> ApiResult<IdpUser> {
        let mut body = Map::new();
        if let Some(p) = password {
            body.insert("password".into(), Value::String(p.into()));
        }
        if let Some(m) = metadata {
            body.insert("data".into(), m);
        }
        let bearer = self.bearer();
        let v = self
            .call(Method::PUT, "user", bearer.as_deref(), Some(Value::Object(body)))
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    pub async fn sign_out(&self) -> ApiResult<()> {
        let bearer = self.bearer();
        let res = self.call(Method::POST, "logout", bearer.as_deref(), None).await;
        self.forget_session();
        res.map(|_| ())
    }

    pub async fn recover(&self, email: &str) -> ApiResult<()> {
        self.call(Method::POST, "recover", None, Some(json!({"email": email}))).await?;
        Ok(())
    }

    /// Authorize URL for an OAuth dance; the caller opens it in a browser.
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> ApiResult<String> {
        let mut url = self.endpoint("authorize")?;
        let state = oauth_state_nonce();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("provider", provider.slug());
            q.append_pair("state", &state);
            if let Some(r) = redirect_to {
                q.append_pair("redirect_to", r);
            }
        }
        Ok(url.to_string())
    }
}

fn oauth_state_nonce() -> String {
    let mut buf = [0u8; 16];
    let _ = getrandom::getrandom(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

fn idp_error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    for key in ["error_description", "msg", "message", "error"] {
        if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// The identity client as the fallback entry in the provider list.
pub struct IdentityProvider {
    client: std::sync::Arc<IdentityClient>,
}

impl IdentityProvider {
    pub fn new(client: std::sync::Arc<IdentityClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for IdentityProvider {
    fn name(&self) -> &'static str {
        "identity"
    }

    async fn sign_up(&self, req: &SignUpRequest) -> ProviderResult<ProviderSession> {
        let (session, user) = self.client.sign_up(req).await?;
        let mapped = map_identity_user(&user);
        match session {
            Some(s) => Ok(ProviderSession {
                token: Some(s.access_token),
                issuer: TokenIssuer::Identity,
                user: mapped,
                message: Some("Account created successfully!".into()),
            }),
            None => Ok(ProviderSession {
                token: None,
                issuer: TokenIssuer::Identity,
                user: mapped,
                message: Some("Please check your email to confirm your account.".into()),
            }),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<ProviderSession> {
        let session = self.client.sign_in_with_password(email, password).await?;
        let user = session
            .user
            .as_ref()
            .map(map_identity_user)
            .ok_or_else(|| ProviderError::Other("identity sign-in returned no user".into()))?;
        Ok(ProviderSession {
            token: Some(session.access_token),
            issuer: TokenIssuer::Identity,
            user,
            message: None,
        })
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        self.client.sign_out().await?;
        Ok(())
    }

    async fn get_session(&self) -> ProviderResult<Option<ProviderSession>> {
        let Some(native) = self.client.native_session() else {
            return Ok(None);
        };
        let user = match native.user.as_ref() {
            Some(u) => map_identity_user(u),
            None => map_identity_user(&self.client.get_user().await?),
        };
        Ok(Some(ProviderSession {
            token: Some(native.access_token),
            issuer: TokenIssuer::Identity,
            user,
            message: None,
        }))
    }

    async fn fetch_profile(&self) -> ProviderResult<User> {
        Ok(map_identity_user(&self.client.get_user().await?))
    }

    async fn forgot_password(&self, email: &str) -> ProviderResult<String> {
        self.client.recover(email).await?;
        Ok("Password reset email sent. Please check your inbox.".into())
    }

    async fn reset_password(&self, new_password: &str, token: Option<&str>) -> ProviderResult<String> {
        if token.is_some() {
            // Reset tokens belong to the primary backend's flow
            return Err(ProviderError::Unsupported);
        }
        self.client.update_user(Some(new_password), None).await?;
        Ok("Password updated successfully.".into())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ProviderResult<User> {
        let mut meta = Map::new();
        if let Some(v) = &update.username {
            meta.insert("username".into(), Value::String(v.clone()));
        }
        if let Some(v) = &update.full_name {
            meta.insert("full_name".into(), Value::String(v.clone()));
        }
        if let Some(v) = &update.avatar_url {
            meta.insert("avatar_url".into(), Value::String(v.clone()));
        }
        let user = self.client.update_user(None, Some(Value::Object(meta))).await?;
        Ok(map_identity_user(&user))
    }

    async fn refresh_session(&self) -> ProviderResult<ProviderSession> {
        let session = self.client.refresh().await?;
        let user = session
            .user
            .as_ref()
            .map(map_identity_user)
            .ok_or_else(|| ProviderError::Other("identity refresh returned no user".into()))?;
        Ok(ProviderSession {
            token: Some(session.access_token),
            issuer: TokenIssuer::Identity,
            user,
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idp_user(meta: Value) -> IdpUser {
        IdpUser {
            id: "u1".into(),
            email: Some("neighbor@example.com".into()),
            user_metadata: meta.as_object().cloned().unwrap_or_default(),
            created_at: Some("2026-01-01T00:00:00Z".into()),
        }
    }

    #[test]
    fn maps_metadata_fields() {
        let u = map_identity_user(&idp_user(serde_json::json!({
            "username": "neighbor",
            "full_name": "A. Neighbor",
            "avatar_url": "http://x/a.png",
            "role": "moderator",
        })));
        assert_eq!(u.id, "u1");
        assert_eq!(u.username.as_deref(), Some("neighbor"));
        assert_eq!(u.full_name.as_deref(), Some("A. Neighbor"));
        assert_eq!(u.avatar_url.as_deref(), Some("http://x/a.png"));
        assert_eq!(u.role, Role::Moderator);
    }

    #[test]
    fn username_defaults_to_email_local_part() {
        let u = map_identity_user(&idp_user(serde_json::json!({})));
        assert_eq!(u.username.as_deref(), Some("neighbor"));
        assert_eq!(u.role, Role::User);
    }

    #[test]
    fn camel_case_metadata_keys_accepted() {
        let u = map_identity_user(&idp_user(serde_json::json!({
            "fullName": "Camel Case",
            "avatarUrl": "http://x/b.png",
        })));
        assert_eq!(u.full_name.as_deref(), Some("Camel Case"));
        assert_eq!(u.avatar_url.as_deref(), Some("http://x/b.png"));
    }

    #[test]
    fn unknown_role_falls_back_to_user() {
        let u = map_identity_user(&idp_user(serde_json::json!({"role": "superuser"})));
        assert_eq!(u.role, Role::User);
    }

    #[test]
    fn idp_error_message_priority() {
        assert_eq!(
            idp_error_message(r#"{"error_description":"Invalid login credentials"}"#).as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(idp_error_message(r#"{"msg":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(idp_error_message("garbage"), None);
    }
}
