//! Document-understanding API client.
//!
//! Converts a table image into structured content elements by uploading it
//! to the external partition endpoint in high-resolution mode. The client is
//! only constructed when the `UNSTRUCTURED_API_KEY` environment variable is
//! set; a missing credential is a designed degraded mode handled by callers,
//! not an error.
//!
//! Failures are reported once per call — there is no retry or backoff
//! anywhere in this codebase.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::config::UnstructuredConfig;
use crate::elements::Element;

/// Environment variable holding the document-understanding API credential.
pub const API_KEY_VAR: &str = "UNSTRUCTURED_API_KEY";

/// Whether the document-understanding credential is configured.
pub fn credential_present() -> bool {
    std::env::var(API_KEY_VAR)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

pub struct UnstructuredClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl UnstructuredClient {
    /// Build a client from the environment, or `None` when no credential
    /// is configured.
    pub fn from_env(config: &UnstructuredConfig) -> Result<Option<Self>> {
        let api_key = match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
        }))
    }

    /// Partition a single image into elements (high-resolution strategy,
    /// English language hint).
    pub async fn partition_image(&self, path: &Path) -> Result<Vec<Element>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image.jpg".to_string());

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")?;

        let form = reqwest::multipart::Form::new()
            .part("files", part)
            .text("strategy", "hi_res")
            .text("languages", "eng");

        let resp = self
            .http
            .post(&self.endpoint)
            .header("unstructured-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Request to document-understanding API failed for {}", path.display()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("document-understanding API error {}: {}", status, body);
        }

        let elements: Vec<Element> = resp
            .json()
            .await
            .with_context(|| "Invalid document-understanding API response")?;

        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_without_key_yields_none() {
        std::env::remove_var(API_KEY_VAR);
        let client = UnstructuredClient::from_env(&UnstructuredConfig::default()).unwrap();
        assert!(client.is_none());
        assert!(!credential_present());
    }
}
