//! `/neighborhoods/*` endpoints.

use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{CommunityPost, Event, MarketplaceListing, Neighborhood, Paginated, User};

use super::PageParams;

pub struct NeighborhoodsApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl NeighborhoodsApi<'_> {
    pub async fn list(&self, city: Option<&str>, search: Option<&str>) -> ApiResult<Paginated<Neighborhood>> {
        let mut q = Vec::new();
        if let Some(c) = city {
            q.push(("city", c.to_string()));
        }
        if let Some(s) = search {
            q.push(("search", s.to_string()));
        }
        decode_list(self.http.get_json("/neighborhoods", &q).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Neighborhood> {
        decode(self.http.get_json(&format!("/neighborhoods/{}", encode(id)), &[]).await?)
    }

    pub async fn events(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<Event>> {
        let path = format!("/neighborhoods/{}/events", encode(id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn listings(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<MarketplaceListing>> {
        let path = format!("/neighborhoods/{}/listings", encode(id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn posts(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<CommunityPost>> {
        let path = format!("/neighborhoods/{}/posts", encode(id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn members(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<User>> {
        let path = format!("/neighborhoods/{}/members", encode(id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn join(&self, id: &str) -> ApiResult<()> {
        self.http.post_json(&format!("/neighborhoods/{}/join", encode(id)), &json!({})).await?;
        Ok(())
    }

    pub async fn leave(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/neighborhoods/{}/leave", encode(id))).await?;
        Ok(())
    }
}
