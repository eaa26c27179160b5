//! `/users/*` endpoints: profiles, moderation, reviews.

use serde::Serialize;
use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{Paginated, Review, Role, User};

use super::PageParams;

/// Partial profile update; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

pub struct UsersApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl UsersApi<'_> {
    /// Own profile when `user_id` is `None`, another user's otherwise.
    pub async fn profile(&self, user_id: Option<&str>) -> ApiResult<User> {
        let path = match user_id {
            Some(id) => format!("/users/{}", encode(id)),
            None => "/users/profile".to_string(),
        };
        decode(self.http.get_json(&path, &[]).await?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        decode(self.http.put_json("/users/profile", update).await?)
    }

    pub async fn upload_avatar(&self, filename: &str, bytes: Vec<u8>) -> ApiResult<User> {
        let v = self
            .http
            .upload("/users/profile/avatar", vec![("avatar".into(), filename.into(), bytes)], vec![])
            .await?;
        decode(v)
    }

    pub async fn list(&self, search: Option<&str>, page: &PageParams) -> ApiResult<Paginated<User>> {
        let mut q = page.query();
        if let Some(s) = search {
            q.push(("search", s.to_string()));
        }
        decode_list(self.http.get_json("/users", &q).await?)
    }

    pub async fn update_role(&self, user_id: &str, role: Role) -> ApiResult<User> {
        let path = format!("/users/{}/role", encode(user_id));
        decode(self.http.put_json(&path, &json!({"role": role})).await?)
    }

    pub async fn ban(&self, user_id: &str, reason: Option<&str>) -> ApiResult<()> {
        let path = format!("/users/{}/ban", encode(user_id));
        self.http.post_json(&path, &json!({"reason": reason})).await?;
        Ok(())
    }

    pub async fn unban(&self, user_id: &str) -> ApiResult<()> {
        let path = format!("/users/{}/ban", encode(user_id));
        self.http.delete_json(&path).await?;
        Ok(())
    }

    pub async fn reviews(&self, user_id: &str, kind: Option<&str>) -> ApiResult<Paginated<Review>> {
        let path = format!("/users/{}/reviews", encode(user_id));
        let mut q = Vec::new();
        if let Some(k) = kind {
            q.push(("type", k.to_string()));
        }
        decode_list(self.http.get_json(&path, &q).await?)
    }
}
