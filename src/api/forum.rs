//! `/categories`, `/threads` and `/posts` endpoints of the classic forum.

use serde::Serialize;
use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{Category, Paginated, Post, Thread, VoteKind};

use super::PageParams;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDraft {
    pub title: String,
    pub content: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

pub struct ForumApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl ForumApi<'_> {
    // ---- categories ----

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        Ok(decode_list(self.http.get_json("/categories", &[]).await?)?.data)
    }

    pub async fn category_by_slug(&self, slug: &str) -> ApiResult<Category> {
        decode(self.http.get_json(&format!("/categories/{}", encode(slug)), &[]).await?)
    }

    // ---- threads ----

    pub async fn threads(
        &self,
        page: &PageParams,
        category: Option<&str>,
        search: Option<&str>,
        sort_by: Option<&str>,
    ) -> ApiResult<Paginated<Thread>> {
        let mut q = page.query();
        if let Some(c) = category {
            q.push(("category", c.to_string()));
        }
        if let Some(s) = search {
            q.push(("search", s.to_string()));
        }
        if let Some(s) = sort_by {
            q.push(("sortBy", s.to_string()));
        }
        decode_list(self.http.get_json("/threads", &q).await?)
    }

    pub async fn thread(&self, id: &str) -> ApiResult<Thread> {
        decode(self.http.get_json(&format!("/threads/{}", encode(id)), &[]).await?)
    }

    pub async fn create_thread(&self, draft: &ThreadDraft) -> ApiResult<Thread> {
        decode(self.http.post_json("/threads", draft).await?)
    }

    pub async fn update_thread(&self, id: &str, draft: &ThreadDraft) -> ApiResult<Thread> {
        decode(self.http.put_json(&format!("/threads/{}", encode(id)), draft).await?)
    }

    pub async fn delete_thread(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/threads/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn pin_thread(&self, id: &str, pinned: bool) -> ApiResult<()> {
        let path = format!("/threads/{}/pin", encode(id));
        if pinned {
            self.http.post_json(&path, &json!({})).await?;
        } else {
            self.http.delete_json(&path).await?;
        }
        Ok(())
    }

    pub async fn lock_thread(&self, id: &str, locked: bool) -> ApiResult<()> {
        let path = format!("/threads/{}/lock", encode(id));
        if locked {
            self.http.post_json(&path, &json!({})).await?;
        } else {
            self.http.delete_json(&path).await?;
        }
        Ok(())
    }

    pub async fn vote_thread(&self, id: &str, vote: Option<VoteKind>) -> ApiResult<()> {
        let path = format!("/threads/{}/vote", encode(id));
        match vote {
            Some(kind) => {
                self.http.post_json(&path, &json!({"type": kind})).await?;
            }
            None => {
                self.http.delete_json(&path).await?;
            }
        }
        Ok(())
    }

    // ---- posts (thread replies) ----

    pub async fn posts(&self, thread_id: &str, page: &PageParams) -> ApiResult<Paginated<Post>> {
        let path = format!("/threads/{}/posts", encode(thread_id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn create_post(
        &self,
        thread_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> ApiResult<Post> {
        let body = json!({"threadId": thread_id, "content": content, "parentId": parent_id});
        decode(self.http.post_json("/posts", &body).await?)
    }

    pub async fn update_post(&self, id: &str, content: &str) -> ApiResult<Post> {
        decode(self.http.put_json(&format!("/posts/{}", encode(id)), &json!({"content": content})).await?)
    }

    pub async fn delete_post(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/posts/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn vote_post(&self, id: &str, vote: Option<VoteKind>) -> ApiResult<()> {
        let path = format!("/posts/{}/vote", encode(id));
        match vote {
            Some(kind) => {
                self.http.post_json(&path, &json!({"type": kind})).await?;
            }
            None => {
                self.http.delete_json(&path).await?;
            }
        }
        Ok(())
    }

    pub async fn mark_answer(&self, id: &str, is_answer: bool) -> ApiResult<()> {
        let path = format!("/posts/{}/answer", encode(id));
        if is_answer {
            self.http.post_json(&path, &json!({})).await?;
        } else {
            self.http.delete_json(&path).await?;
        }
        Ok(())
    }
}
