//! `/reports/*` endpoints: content/user reporting and moderation review.

use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{Paginated, Report};

use super::PageParams;

pub struct ReportsApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl ReportsApi<'_> {
    pub async fn create(
        &self,
        kind: &str,
        target_id: &str,
        reason: &str,
        description: Option<&str>,
    ) -> ApiResult<Report> {
        let body = json!({
            "type": kind,
            "targetId": target_id,
            "reason": reason,
            "description": description,
        });
        decode(self.http.post_json("/reports", &body).await?)
    }

    pub async fn list(
        &self,
        page: &PageParams,
        status: Option<&str>,
        kind: Option<&str>,
    ) -> ApiResult<Paginated<Report>> {
        let mut q = page.query();
        if let Some(s) = status {
            q.push(("status", s.to_string()));
        }
        if let Some(k) = kind {
            q.push(("type", k.to_string()));
        }
        decode_list(self.http.get_json("/reports", &q).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Report> {
        decode(self.http.get_json(&format!("/reports/{}", encode(id)), &[]).await?)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
        resolution: Option<&str>,
    ) -> ApiResult<Report> {
        let path = format!("/reports/{}/status", encode(id));
        decode(self.http.put_json(&path, &json!({"status": status, "resolution": resolution})).await?)
    }
}
