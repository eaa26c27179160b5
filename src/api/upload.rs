//! `/upload/*` endpoints: generic image upload used by events, listings and
//! posts. Multipart, unlike the JSON rest of the surface.

use serde::Deserialize;

use crate::error::ApiResult;
use crate::http::{decode, decode_list, ApiClient};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploadedFile {
    pub url: String,
    pub filename: Option<String>,
}

pub struct UploadApi<'a> {
    pub(crate) http: &'a ApiClient,
}

impl UploadApi<'_> {
    /// `kind` is one of avatar/event/listing/post; the server routes storage.
    pub async fn image(&self, filename: &str, bytes: Vec<u8>, kind: &str) -> ApiResult<UploadedFile> {
        let v = self
            .http
            .upload(
                "/upload/image",
                vec![("file".into(), filename.into(), bytes)],
                vec![("type".into(), kind.into())],
            )
            .await?;
        decode(v)
    }

    pub async fn images(&self, files: Vec<(String, Vec<u8>)>, kind: &str) -> ApiResult<Vec<UploadedFile>> {
        let parts = files
            .into_iter()
            .map(|(name, bytes)| ("files".to_string(), name, bytes))
            .collect();
        let v = self
            .http
            .upload("/upload/images", parts, vec![("type".into(), kind.into())])
            .await?;
        Ok(decode_list(v)?.data)
    }
}
