//! `/analytics/*` endpoints (admin dashboards).

use serde_json::Value;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, unwrap_data, ApiClient};
use crate::types::PlatformStats;

pub struct AnalyticsApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl AnalyticsApi<'_> {
    pub async fn stats(&self) -> ApiResult<PlatformStats> {
        decode(self.http.get_json("/analytics/stats", &[]).await?)
    }

    /// Activity series; left as JSON since the server shape varies by range.
    pub async fn user_activity(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ApiResult<Value> {
        let mut q = Vec::new();
        if let Some(s) = start_date {
            q.push(("startDate", s.to_string()));
        }
        if let Some(e) = end_date {
            q.push(("endDate", e.to_string()));
        }
        Ok(unwrap_data(self.http.get_json("/analytics/user-activity", &q).await?))
    }

    pub async fn popular_content(&self, kind: Option<&str>, limit: Option<u64>) -> ApiResult<Value> {
        let mut q = Vec::new();
        if let Some(k) = kind {
            q.push(("type", k.to_string()));
        }
        if let Some(l) = limit {
            q.push(("limit", l.to_string()));
        }
        Ok(unwrap_data(self.http.get_json("/analytics/popular-content", &q).await?))
    }

    pub async fn event_stats(&self, event_id: &str) -> ApiResult<Value> {
        let path = format!("/analytics/events/{}", encode(event_id));
        Ok(unwrap_data(self.http.get_json(&path, &[]).await?))
    }
}
