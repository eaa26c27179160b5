//! `/search/*` endpoints.

use crate::error::ApiResult;
use crate::http::{decode_list, ApiClient};
use crate::types::{Paginated, SearchResult};

use super::PageParams;

pub struct SearchApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl SearchApi<'_> {
    pub async fn search(
        &self,
        q: &str,
        kind: Option<&str>,
        page: &PageParams,
    ) -> ApiResult<Paginated<SearchResult>> {
        let mut query = vec![("q", q.to_string())];
        if let Some(k) = kind {
            query.push(("type", k.to_string()));
        }
        query.extend(page.query());
        decode_list(self.http.get_json("/search", &query).await?)
    }

    pub async fn suggestions(&self, q: &str) -> ApiResult<Vec<String>> {
        let v = self.http.get_json("/search/suggestions", &[("q", q.to_string())]).await?;
        Ok(decode_list(v)?.data)
    }
}
