//! Thin request layer over reqwest. Attaches the current bearer token from
//! the session store to every outbound request, applies the fixed timeout,
//! logs failing responses with their body, and leaves retry policy to
//! nobody: errors propagate to the caller unmodified.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::session::store::SessionStore;
use crate::types::Paginated;

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    store: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(cfg: &Config, store: Arc<SessionStore>) -> ApiResult<Self> {
        let base = parse_base(&cfg.api_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { base, client, store })
    }

    /// Build a client against an explicit base URL (tests, identity client).
    pub fn with_base(base: &str, timeout_secs: u64, store: Arc<SessionStore>) -> ApiResult<Self> {
        let base = parse_base(base)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { base, client, store })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete_json(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::DELETE, path, &[], None).await
    }

    /// Multipart upload: `(field, filename, bytes)` triples plus plain fields.
    pub async fn upload(
        &self,
        path: &str,
        files: Vec<(String, String, Vec<u8>)>,
        fields: Vec<(String, String)>,
    ) -> ApiResult<Value> {
        let url = self.join(path)?;
        let mut form = reqwest::multipart::Form::new();
        for (field, filename, bytes) in files {
            let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
            form = form.part(field, part);
        }
        for (k, v) in fields {
            form = form.text(k, v);
        }
        let resp = self
            .client
            .post(url.clone())
            .headers(self.auth_headers())
            .multipart(form)
            .send()
            .await?;
        self.digest(url.path(), resp).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let url = self.join(path)?;
        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .headers(self.auth_headers());
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }
        debug!("{} {}", method, url.path());
        let resp = req.send().await.map_err(|e| {
            warn!("request failed: {} {}: {}", method, url.path(), e);
            ApiError::from(e)
        })?;
        self.digest(url.path(), resp).await
    }

    async fn digest(&self, path: &str, resp: reqwest::Response) -> ApiResult<Value> {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = extract_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!("api error: {} {} => {}", status.as_u16(), path, truncate_body(&text));
            return Err(ApiError::from_status(status.as_u16(), message));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            warn!("undecodable response from {}: {}", path, e);
            ApiError::decode("decode_error".into(), e.to_string())
        })
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.store.token() {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        // Correlate client requests with backend logs
        if let Ok(v) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
            headers.insert("x-request-id", v);
        }
        headers
    }

    fn join(&self, path: &str) -> ApiResult<Url> {
        // Joining with a leading slash would drop the base path (/api), so
        // splice relative to it.
        let rel = path.trim_start_matches('/');
        let mut base = self.base.as_str().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&format!("{}{}", base, rel))
            .map_err(|e| ApiError::config("bad_url".into(), format!("{}: {}", path, e)))
    }
}

fn parse_base(raw: &str) -> ApiResult<Url> {
    Url::parse(raw).map_err(|e| ApiError::config("bad_base_url".into(), format!("{}: {}", raw, e)))
}

/// Collapse the backend's inconsistent wrappers: `{data: ...}` yields the
/// inner value, anything else passes through.
pub fn unwrap_data(v: Value) -> Value {
    match v {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) if !inner.is_null() => inner,
            _ => Value::Object(map),
        },
        other => other,
    }
}

/// Deserialize a single resource after normalization.
pub fn decode<T: DeserializeOwned>(v: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(unwrap_data(v))?)
}

/// Deserialize a list endpoint. Accepts `{data: [...], pagination: {...}}`,
/// a bare array, or `{data: [...]}` without pagination.
pub fn decode_list<T: DeserializeOwned>(v: Value) -> ApiResult<Paginated<T>> {
    match v {
        Value::Array(items) => Ok(Paginated {
            data: serde_json::from_value(Value::Array(items))?,
            pagination: None,
        }),
        Value::Object(_) => {
            let attempt: Result<Paginated<T>, _> = serde_json::from_value(v.clone());
            match attempt {
                Ok(page) => Ok(page),
                // Some endpoints nest the page one level down
                Err(_) => decode_list(unwrap_data(v)),
            }
        }
        other => Ok(Paginated { data: serde_json::from_value(other)?, pagination: None }),
    }
}

fn extract_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    for key in ["message", "error", "msg"] {
        if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() <= MAX {
        return body.to_string();
    }
    body.chars().take(MAX).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;
    use serde_json::json;

    #[test]
    fn unwrap_data_variants() {
        assert_eq!(unwrap_data(json!({"data": {"id": "x"}})), json!({"id": "x"}));
        assert_eq!(unwrap_data(json!({"id": "x"})), json!({"id": "x"}));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
        // null data falls back to the remaining object
        assert_eq!(unwrap_data(json!({"data": null, "id": "x"})), json!({"id": "x"}));
    }

    #[test]
    fn decode_list_bare_array() {
        let page = decode_list::<Event>(json!([{"id": "e1", "title": "t", "description": "d"}])).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.pagination.is_none());
    }

    #[test]
    fn decode_list_paginated_envelope() {
        let page = decode_list::<Event>(json!({
            "data": [{"id": "e1", "title": "t", "description": "d"}],
            "pagination": {"page": 1, "limit": 20, "total": 1, "totalPages": 1}
        }))
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.unwrap().total, 1);
    }

    #[test]
    fn decode_list_nested_envelope() {
        let page = decode_list::<Event>(json!({
            "data": {"data": [{"id": "e1", "title": "t", "description": "d"}]}
        }))
        .unwrap();
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    fn message_extraction_prefers_message_key() {
        assert_eq!(extract_message(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(extract_message(r#"{"error":"bad"}"#).as_deref(), Some("bad"));
        assert_eq!(extract_message("not json"), None);
    }
}
