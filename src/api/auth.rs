//! `/auth/*` endpoints of the primary backend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::http::{decode, ApiClient};
use crate::types::{ApiEnvelope, User};

/// Shape the backend answers for register/login/refresh.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub token: Option<String>,
    pub message: Option<String>,
}

pub struct AuthApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
        full_name: Option<&str>,
    ) -> ApiResult<AuthResponse> {
        // Default the handle from the email local part, as the backend expects
        let username = username
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
        let body = json!({
            "email": email,
            "password": password,
            "username": username,
            "fullName": full_name,
        });
        decode(self.http.post_json("/auth/register", &body).await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = json!({"email": email, "password": password});
        decode(self.http.post_json("/auth/login", &body).await?)
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.http.post_json("/auth/logout", &json!({})).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> ApiResult<AuthResponse> {
        decode(self.http.post_json("/auth/refresh", &json!({})).await?)
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<String> {
        let v = self.http.post_json("/auth/forgot-password", &json!({"email": email})).await?;
        let env: ApiEnvelope<Value> = serde_json::from_value(v).unwrap_or_default();
        Ok(env
            .message
            .unwrap_or_else(|| "Password reset email sent. Please check your inbox.".into()))
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ApiResult<String> {
        let v = self
            .http
            .post_json("/auth/reset-password", &json!({"token": token, "password": password}))
            .await?;
        let env: ApiEnvelope<Value> = serde_json::from_value(v).unwrap_or_default();
        Ok(env.message.unwrap_or_else(|| "Password updated successfully.".into()))
    }

    pub async fn verify_email(&self, token: &str) -> ApiResult<()> {
        self.http.post_json("/auth/verify-email", &json!({"token": token})).await?;
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> ApiResult<()> {
        self.http.post_json("/auth/resend-verification", &json!({"email": email})).await?;
        Ok(())
    }
}
