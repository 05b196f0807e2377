//! Object storage access: message attachments and avatars live in named
//! buckets, addressed by path, served through public URLs.

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::path::Path;

use conecta_protocol::AttachmentKind;

use super::http::BackendError;

pub const BUCKET_ATTACHMENTS: &str = "message-attachments";
pub const BUCKET_AVATARS: &str = "avatars";

const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "application/pdf",
];

#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    token: Option<String>,
}

impl StorageClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        token: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            token,
        }
    }

    fn headers(&self, content_type: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", v);
        }
        if let Some(token) = &self.token {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        if let Some(ct) = content_type {
            if let Ok(v) = HeaderValue::from_str(ct) {
                headers.insert(CONTENT_TYPE, v);
            }
        }
        headers
    }

    /// Upload bytes to `bucket` at `path` (`<ministry>/<message>/<filename>`
    /// for attachments)
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        );

        let response = self
            .http
            .post(&url)
            .headers(self.headers(Some(content_type)))
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, message });
        }

        Ok(())
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        )
    }

    pub async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
        let body = serde_json::json!({ "prefixes": paths });

        let response = self
            .http
            .delete(&url)
            .headers(self.headers(None))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, message });
        }

        Ok(())
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject files the chat does not accept before any bytes leave the device
pub fn validate_attachment(content_type: &str, size_bytes: u64) -> Result<()> {
    if !ALLOWED_TYPES.contains(&content_type) {
        anyhow::bail!("Tipo de arquivo não permitido. Use imagens (jpg, png, gif) ou PDF.");
    }
    if size_bytes > MAX_ATTACHMENT_BYTES {
        anyhow::bail!("Arquivo muito grande. Máximo: 10MB");
    }
    Ok(())
}

pub fn attachment_kind(content_type: &str) -> AttachmentKind {
    if content_type.starts_with("image/") {
        AttachmentKind::Image
    } else {
        AttachmentKind::Document
    }
}

/// MIME type for a picked file, from its extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_images_and_documents() {
        assert_eq!(attachment_kind("image/png"), AttachmentKind::Image);
        assert_eq!(attachment_kind("application/pdf"), AttachmentKind::Document);
    }

    #[test]
    fn rejects_disallowed_types_and_oversized_files() {
        assert!(validate_attachment("application/x-msdownload", 10).is_err());
        assert!(validate_attachment("image/png", 11 * 1024 * 1024).is_err());
        assert!(validate_attachment("image/png", 1024).is_ok());
    }

    #[test]
    fn encodes_path_segments_but_not_separators() {
        assert_eq!(encode_path("a/b c/d.png"), "a/b%20c/d.png");
    }

    #[test]
    fn maps_extensions_to_content_types() {
        assert_eq!(content_type_for(Path::new("foto.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("ata.pdf")), "application/pdf");
    }
}
