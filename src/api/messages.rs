//! `/messages/*` endpoints: direct conversations.

use serde_json::json;
use urlencoding::encode;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};
use crate::types::{Conversation, Message, Paginated};

use super::notifications::UnreadCount;
use super::PageParams;

pub struct MessagesApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl MessagesApi<'_> {
    pub async fn conversations(&self, page: &PageParams) -> ApiResult<Paginated<Conversation>> {
        decode_list(self.http.get_json("/messages/conversations", &page.query()).await?)
    }

    pub async fn conversation(&self, id: &str, page: &PageParams) -> ApiResult<Paginated<Message>> {
        let path = format!("/messages/conversations/{}", encode(id));
        decode_list(self.http.get_json(&path, &page.query()).await?)
    }

    pub async fn send(
        &self,
        recipient_id: &str,
        content: &str,
        conversation_id: Option<&str>,
    ) -> ApiResult<Message> {
        let body = json!({
            "recipientId": recipient_id,
            "content": content,
            "conversationId": conversation_id,
        });
        decode(self.http.post_json("/messages", &body).await?)
    }

    pub async fn mark_read(&self, conversation_id: &str) -> ApiResult<()> {
        let path = format!("/messages/conversations/{}/read", encode(conversation_id));
        self.http.put_json(&path, &json!({})).await?;
        Ok(())
    }

    pub async fn delete_conversation(&self, id: &str) -> ApiResult<()> {
        self.http.delete_json(&format!("/messages/conversations/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn unread_count(&self) -> ApiResult<u64> {
        let v = self.http.get_json("/messages/unread-count", &[]).await?;
        Ok(decode::<UnreadCount>(v)?.count)
    }
}
