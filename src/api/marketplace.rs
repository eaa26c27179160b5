//! `/marketplace/*` endpoints: listings, favorites, purchase requests,
//! reviews, seller contact.

use serde::Serialize;
use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{
    MarketplaceCategory, MarketplaceListing, MarketplaceRequest, Paginated, RequestStatus, Review,
    ReviewKind,
};

use super::PageParams;

#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub page: PageParams,
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub is_free: Option<bool>,
    pub sort_by: Option<String>,
}

impl ListingFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = self.page.query();
        if let Some(v) = &self.category {
            q.push(("category", v.clone()));
        }
        if let Some(v) = &self.neighborhood {
            q.push(("neighborhood", v.clone()));
        }
        if let Some(v) = &self.condition {
            q.push(("condition", v.clone()));
        }
        if let Some(v) = self.min_price {
            q.push(("minPrice", v.to_string()));
        }
        if let Some(v) = self.max_price {
            q.push(("maxPrice", v.to_string()));
        }
        if let Some(v) = &self.status {
            q.push(("status", v.clone()));
        }
        if let Some(v) = &self.search {
            q.push(("search", v.clone()));
        }
        if let Some(v) = self.is_free {
            q.push(("isFree", v.to_string()));
        }
        if let Some(v) = &self.sort_by {
            q.push(("sortBy", v.clone()));
        }
        q
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_id: Option<String>,
}

pub struct MarketplaceApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl MarketplaceApi<'_> {
    pub async fn listings(&self, filter: &ListingFilter) -> ApiResult<Paginated<MarketplaceListing>> {
        decode_list(self.http.get_json("/marketplace", &filter.query()).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<MarketplaceListing> {
        decode(self.http.get_json(&format!("/marketplace/{}", encode(id)), &[]).await?)
    }

    pub async fn create(&self, draft: &ListingDraft) -> ApiResult<MarketplaceListing> {
        decode(self.http.post_json("/marketplace", draft).await?)
    }

    pub async fn update(&self, id: &str, draft: &ListingDraft) -> ApiResult<MarketplaceListing> {
        decode(self.http.put_json(&format!("/marketplace/{}", encode(id)), draft).await?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/marketplace/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn my_listings(&self, page: &PageParams, status: Option<&str>) -> ApiResult<Paginated<MarketplaceListing>> {
        let mut q = page.query();
        if let Some(s) = status {
            q.push(("status", s.to_string()));
        }
        decode_list(self.http.get_json("/marketplace/my-listings", &q).await?)
    }

    pub async fn mark_sold(&self, id: &str) -> ApiResult<MarketplaceListing> {
        decode(self.http.post_json(&format!("/marketplace/{}/sold", encode(id)), &json!({})).await?)
    }

    pub async fn mark_reserved(&self, id: &str) -> ApiResult<MarketplaceListing> {
        decode(self.http.post_json(&format!("/marketplace/{}/reserve", encode(id)), &json!({})).await?)
    }

    pub async fn toggle_favorite(&self, id: &str) -> ApiResult<()> {
        self.http.post_json(&format!("/marketplace/{}/favorite", encode(id)), &json!({})).await?;
        Ok(())
    }

    pub async fn favorites(&self, page: &PageParams) -> ApiResult<Paginated<MarketplaceListing>> {
        decode_list(self.http.get_json("/marketplace/favorites", &page.query()).await?)
    }

    pub async fn send_request(&self, id: &str, message: Option<&str>) -> ApiResult<MarketplaceRequest> {
        let path = format!("/marketplace/{}/request", encode(id));
        decode(self.http.post_json(&path, &json!({"message": message})).await?)
    }

    pub async fn requests(&self, id: &str) -> ApiResult<Paginated<MarketplaceRequest>> {
        decode_list(self.http.get_json(&format!("/marketplace/{}/requests", encode(id)), &[]).await?)
    }

    pub async fn respond_to_request(
        &self,
        listing_id: &str,
        request_id: &str,
        status: RequestStatus,
    ) -> ApiResult<MarketplaceRequest> {
        let path = format!("/marketplace/{}/requests/{}", encode(listing_id), encode(request_id));
        decode(self.http.put_json(&path, &json!({"status": status})).await?)
    }

    pub async fn my_requests(&self, page: &PageParams, status: Option<&str>) -> ApiResult<Paginated<MarketplaceRequest>> {
        let mut q = page.query();
        if let Some(s) = status {
            q.push(("status", s.to_string()));
        }
        decode_list(self.http.get_json("/marketplace/my-requests", &q).await?)
    }

    pub async fn add_review(
        &self,
        id: &str,
        rating: f64,
        comment: Option<&str>,
        kind: ReviewKind,
    ) -> ApiResult<Review> {
        let path = format!("/marketplace/{}/review", encode(id));
        decode(self.http.post_json(&path, &json!({"rating": rating, "comment": comment, "type": kind})).await?)
    }

    pub async fn report(&self, id: &str, reason: &str, description: Option<&str>) -> ApiResult<()> {
        let path = format!("/marketplace/{}/report", encode(id));
        self.http.post_json(&path, &json!({"reason": reason, "description": description})).await?;
        Ok(())
    }

    pub async fn contact_seller(&self, id: &str, message: &str) -> ApiResult<()> {
        let path = format!("/marketplace/{}/contact", encode(id));
        self.http.post_json(&path, &json!({"message": message})).await?;
        Ok(())
    }

    pub async fn categories(&self) -> ApiResult<Vec<MarketplaceCategory>> {
        Ok(decode_list(self.http.get_json("/marketplace/categories", &[]).await?)?.data)
    }

    /// Upload listing photos; returns the stored image URLs.
    pub async fn upload_images(&self, files: Vec<(String, Vec<u8>)>) -> ApiResult<Vec<String>> {
        let parts = files
            .into_iter()
            .map(|(name, bytes)| ("images".to_string(), name, bytes))
            .collect();
        let v = self.http.upload("/marketplace/upload-images", parts, vec![]).await?;
        Ok(decode_list(v)?.data)
    }
}
