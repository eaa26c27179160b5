//! Typed endpoint groups over the shared [`ApiClient`].
//!
//! Each group is a thin borrow of the client with one method per endpoint;
//! responses pass through `http::decode`/`decode_list` so the backend's
//! wrapper inconsistencies never leak past this module.

pub mod analytics;
pub mod auth;
pub mod community;
pub mod events;
pub mod forum;
pub mod marketplace;
pub mod messages;
pub mod neighborhoods;
pub mod notifications;
pub mod reports;
pub mod search;
pub mod upload;
pub mod users;

use crate::http::ApiClient;

/// Entry point bundling every endpoint group.
#[derive(Clone)]
pub struct Api {
    client: ApiClient,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> auth::AuthApi<'_> {
        auth::AuthApi { http: &self.client }
    }
    pub fn users(&self) -> users::UsersApi<'_> {
        users::UsersApi { http: &self.client }
    }
    pub fn events(&self) -> events::EventsApi<'_> {
        events::EventsApi { http: &self.client }
    }
    pub fn community(&self) -> community::CommunityApi<'_> {
        community::CommunityApi { http: &self.client }
    }
    pub fn neighborhoods(&self) -> neighborhoods::NeighborhoodsApi<'_> {
        neighborhoods::NeighborhoodsApi { http: &self.client }
    }
    pub fn marketplace(&self) -> marketplace::MarketplaceApi<'_> {
        marketplace::MarketplaceApi { http: &self.client }
    }
    pub fn forum(&self) -> forum::ForumApi<'_> {
        forum::ForumApi { http: &self.client }
    }
    pub fn search(&self) -> search::SearchApi<'_> {
        search::SearchApi { http: &self.client }
    }
    pub fn notifications(&self) -> notifications::NotificationsApi<'_> {
        notifications::NotificationsApi { http: &self.client }
    }
    pub fn messages(&self) -> messages::MessagesApi<'_> {
        messages::MessagesApi { http: &self.client }
    }
    pub fn reports(&self) -> reports::ReportsApi<'_> {
        reports::ReportsApi { http: &self.client }
    }
    pub fn analytics(&self) -> analytics::AnalyticsApi<'_> {
        analytics::AnalyticsApi { http: &self.client }
    }
    pub fn upload(&self) -> upload::UploadApi<'_> {
        upload::UploadApi { http: &self.client }
    }
}

/// Shared pagination parameters for list endpoints.
#[derive(Debug, Clone, Default)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(p) = self.page {
            q.push(("page", p.to_string()));
        }
        if let Some(l) = self.limit {
            q.push(("limit", l.to_string()));
        }
        q
    }
}
