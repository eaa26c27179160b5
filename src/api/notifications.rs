//! `/notifications/*` endpoints.

use serde::Deserialize;
use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{Notification, Paginated, PreferenceMap};

use super::PageParams;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UnreadCount {
    pub count: u64,
}

pub struct NotificationsApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl NotificationsApi<'_> {
    pub async fn list(&self, page: &PageParams, unread_only: bool) -> ApiResult<Paginated<Notification>> {
        let mut q = page.query();
        if unread_only {
            q.push(("unreadOnly", "true".to_string()));
        }
        decode_list(self.http.get_json("/notifications", &q).await?)
    }

    pub async fn mark_read(&self, id: &str) -> ApiResult<()> {
        self.http.put_json(&format!("/notifications/{}/read", encode(id)), &json!({})).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> ApiResult<()> {
        self.http.put_json("/notifications/read-all", &json!({})).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/notifications/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn unread_count(&self) -> ApiResult<u64> {
        let v = self.http.get_json("/notifications/unread-count", &[]).await?;
        Ok(decode::<UnreadCount>(v)?.count)
    }

    pub async fn update_preferences(&self, prefs: &PreferenceMap) -> ApiResult<()> {
        self.http.put_json("/notifications/preferences", prefs).await?;
        Ok(())
    }
}
