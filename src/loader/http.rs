//! Remote http backend
//!
//! The filename is a host plus path (`images.example.com/a/b.jpg`) and must
//! start with one of the namespace `prefixes`; an empty prefix allows any
//! host. Sources are fetched over https with a blocking client.

use std::time::Duration;

use super::Backend;
use crate::config::{LoaderKind, NamespaceConfig};
use crate::error::ItsError;

pub struct HttpBackend {
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(timeout_secs: u64) -> Result<Self, ItsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ItsError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Whether `filename` falls under one of the allowed prefixes
pub fn is_allowed(config: &NamespaceConfig, filename: &str) -> bool {
    config
        .prefixes
        .iter()
        .any(|prefix| filename.starts_with(prefix.as_str()))
}

/// Source URL for a filename
pub fn source_url(filename: &str) -> String {
    format!("https://{}", filename.trim_start_matches('/'))
}

impl Backend for HttpBackend {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Http
    }

    fn fetch(
        &self,
        namespace: &str,
        config: &NamespaceConfig,
        filename: &str,
    ) -> Result<Vec<u8>, ItsError> {
        if !is_allowed(config, filename) {
            tracing::info!(namespace, filename, "Rejected http source outside allowed prefixes");
            return Err(ItsError::PathNotAllowed {
                path: format!("{}/{}", namespace, filename),
            });
        }

        let url = source_url(filename);
        tracing::debug!(namespace, url = %url, "Fetching remote source");

        let response = self.client.get(&url).send().map_err(|e| {
            tracing::error!(url = %url, error = %e, "HTTP fetch failed");
            ItsError::upstream(format!("HTTP fetch failed: {}", e))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ItsError::not_found(format!("{}/{}", namespace, filename)));
        }
        if !status.is_success() {
            tracing::error!(url = %url, status = status.as_u16(), "Remote source returned an error");
            return Err(ItsError::upstream(format!(
                "HTTP request failed with status: {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| ItsError::upstream(format!("Failed to read HTTP body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
