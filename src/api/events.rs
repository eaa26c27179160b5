//! `/events/*` endpoints: discovery, registration/waitlisting, comments.

use serde::Serialize;
use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{
    Event, EventCategory, EventComment, EventRegistration, Paginated, RegistrationStatus,
};

use super::PageParams;

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub page: PageParams,
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub is_free: Option<bool>,
}

impl EventFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = self.page.query();
        if let Some(v) = &self.category {
            q.push(("category", v.clone()));
        }
        if let Some(v) = &self.neighborhood {
            q.push(("neighborhood", v.clone()));
        }
        if let Some(v) = &self.status {
            q.push(("status", v.clone()));
        }
        if let Some(v) = &self.start_date {
            q.push(("startDate", v.clone()));
        }
        if let Some(v) = &self.end_date {
            q.push(("endDate", v.clone()));
        }
        if let Some(v) = &self.search {
            q.push(("search", v.clone()));
        }
        if let Some(v) = self.is_free {
            q.push(("isFree", v.to_string()));
        }
        q
    }
}

/// Fields for creating or updating an event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub is_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_id: Option<String>,
}

pub struct EventsApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl EventsApi<'_> {
    pub async fn list(&self, filter: &EventFilter) -> ApiResult<Paginated<Event>> {
        decode_list(self.http.get_json("/events", &filter.query()).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Event> {
        decode(self.http.get_json(&format!("/events/{}", encode(id)), &[]).await?)
    }

    pub async fn create(&self, draft: &EventDraft) -> ApiResult<Event> {
        decode(self.http.post_json("/events", draft).await?)
    }

    pub async fn update(&self, id: &str, draft: &EventDraft) -> ApiResult<Event> {
        decode(self.http.put_json(&format!("/events/{}", encode(id)), draft).await?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/events/{}", encode(id))).await?;
        Ok(())
    }

    /// Register for an event. The server decides between a confirmed spot
    /// and the waitlist; the returned registration carries the outcome.
    pub async fn register(
        &self,
        id: &str,
        notes: Option<&str>,
        emergency_contact: Option<&str>,
    ) -> ApiResult<EventRegistration> {
        let body = json!({"notes": notes, "emergencyContact": emergency_contact});
        decode(self.http.post_json(&format!("/events/{}/register", encode(id)), &body).await?)
    }

    pub async fn unregister(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/events/{}/register", encode(id))).await?;
        Ok(())
    }

    pub async fn attendees(
        &self,
        id: &str,
        page: &PageParams,
        status: Option<&str>,
    ) -> ApiResult<Paginated<EventRegistration>> {
        let mut q = page.query();
        if let Some(s) = status {
            q.push(("status", s.to_string()));
        }
        decode_list(self.http.get_json(&format!("/events/{}/attendees", encode(id)), &q).await?)
    }

    pub async fn set_registration_status(
        &self,
        event_id: &str,
        registration_id: &str,
        status: RegistrationStatus,
    ) -> ApiResult<EventRegistration> {
        let path = format!("/events/{}/attendees/{}", encode(event_id), encode(registration_id));
        decode(self.http.put_json(&path, &json!({"status": status})).await?)
    }

    pub async fn categories(&self) -> ApiResult<Vec<EventCategory>> {
        Ok(decode_list(self.http.get_json("/events/categories", &[]).await?)?.data)
    }

    pub async fn comments(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<EventComment>> {
        decode_list(self.http.get_json(&format!("/events/{}/comments", encode(id)), &page.query()).await?)
    }

    pub async fn add_comment(
        &self,
        id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> ApiResult<EventComment> {
        let body = json!({"content": content, "parentId": parent_id});
        decode(self.http.post_json(&format!("/events/{}/comments", encode(id)), &body).await?)
    }

    pub async fn delete_comment(&self, event_id: &str, comment_id: &str) -> ApiResult<()> {
        let path = format!("/events/{}/comments/{}", encode(event_id), encode(comment_id));
        self.http.delete_json(&path).await?;
        Ok(())
    }

    pub async fn search(
        &self,
        q: &str,
        category: Option<&str>,
        neighborhood: Option<&str>,
    ) -> ApiResult<Paginated<Event>> {
        let mut query = vec![("q", q.to_string())];
        if let Some(c) = category {
            query.push(("category", c.to_string()));
        }
        if let Some(n) = neighborhood {
            query.push(("neighborhood", n.to_string()));
        }
        decode_list(self.http.get_json("/events/search", &query).await?)
    }

    pub async fn my_registrations(&self, status: Option<&str>) -> ApiResult<Paginated<EventRegistration>> {
        let mut q = Vec::new();
        if let Some(s) = status {
            q.push(("status", s.to_string()));
        }
        decode_list(self.http.get_json("/events/my-registrations", &q).await?)
    }

    pub async fn my_events(&self, page: &PageParams) -> ApiResult<Paginated<Event>> {
        decode_list(self.http.get_json("/events/my-events", &page.query()).await?)
    }
}
