//! `/community-posts/*` endpoints: neighborhood discussion posts and their
//! threaded comments.

use serde::Serialize;
use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{CommunityComment, CommunityPost, Paginated, PostCategory};

use super::PageParams;

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub page: PageParams,
    pub category: Option<PostCategory>,
    pub neighborhood: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
}

impl PostFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = self.page.query();
        if let Some(c) = self.category {
            // Wire form is the SCREAMING_SNAKE_CASE serde name
            let name = serde_json::to_value(c)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            q.push(("category", name));
        }
        if let Some(v) = &self.neighborhood {
            q.push(("neighborhood", v.clone()));
        }
        if let Some(v) = &self.search {
            q.push(("search", v.clone()));
        }
        if let Some(v) = &self.sort_by {
            q.push(("sortBy", v.clone()));
        }
        q
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_id: Option<String>,
}

pub struct CommunityApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl CommunityApi<'_> {
    pub async fn list(&self, filter: &PostFilter) -> ApiResult<Paginated<CommunityPost>> {
        decode_list(self.http.get_json("/community-posts", &filter.query()).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<CommunityPost> {
        decode(self.http.get_json(&format!("/community-posts/{}", encode(id)), &[]).await?)
    }

    pub async fn create(&self, draft: &PostDraft) -> ApiResult<CommunityPost> {
        decode(self.http.post_json("/community-posts", draft).await?)
    }

    pub async fn update(&self, id: &str, draft: &PostDraft) -> ApiResult<CommunityPost> {
        decode(self.http.put_json(&format!("/community-posts/{}", encode(id)), draft).await?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/community-posts/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn comments(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<CommunityComment>> {
        let path = format!("/community-posts/{}/comments", encode(id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn add_comment(
        &self,
        id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> ApiResult<CommunityComment> {
        let path = format!("/community-posts/{}/comments", encode(id));
        decode(self.http.post_json(&path, &json!({"content": content, "parentId": parent_id})).await?)
    }

    pub async fn update_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        content: &str,
    ) -> ApiResult<CommunityComment> {
        let path = format!("/community-posts/{}/comments/{}", encode(post_id), encode(comment_id));
        decode(self.http.put_json(&path, &json!({"content": content})).await?)
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> ApiResult<()> {
        let path = format!("/community-posts/{}/comments/{}", encode(post_id), encode(comment_id));
        self.http.delete_json(&path).await?;
        Ok(())
    }

    pub async fn like(&self, id: &str) -> ApiResult<()> {
        self.http.post_json(&format!("/community-posts/{}/like", encode(id)), &json!({})).await?;
        Ok(())
    }

    pub async fn unlike(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/community-posts/{}/like", encode(id))).await?;
        Ok(())
    }

    pub async fn pin(&self, id: &str) -> ApiResult<()> {
        self.http.post_json(&format!("/community-posts/{}/pin", encode(id)), &json!({})).await?;
        Ok(())
    }

    pub async fn unpin(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/community-posts/{}/pin", encode(id))).await?;
        Ok(())
    }

    pub async fn my_posts(&self, page: &PageParams) -> ApiResult<Paginated<CommunityPost>> {
        decode_list(self.http.get_json("/community-posts/my-posts", &page.query()).await?)
    }
}
