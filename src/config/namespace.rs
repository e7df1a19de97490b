//! Namespace configuration types.
//!
//! A namespace is a named backend configuration: which loader fetches its
//! images, where the loader looks, whether requests are redirected elsewhere
//! instead of served, and the credentials accepted for privileged calls.
//!
//! # Example
//!
//! ```yaml
//! namespaces:
//!   tests:
//!     loader: file_system
//!     folders: ["tests/images"]
//!   station-images:
//!     redirect: true
//!     url: "https://station-service.example.com/image-redirects/"
//!     query-param: url
//! ```

use serde::{Deserialize, Serialize};

/// Backend kind a namespace loads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderKind {
    /// Local directories listed in `folders` / `prefixes`
    FileSystem,
    /// Remote hosts; `prefixes` whitelists the allowed host prefixes
    Http,
}

impl LoaderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderKind::FileSystem => "file_system",
            LoaderKind::Http => "http",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Loader for this namespace; absent for redirect-only namespaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<LoaderKind>,

    /// Directory roots (file_system) or allowed host prefixes (http)
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Additional directory roots searched by the file_system loader
    #[serde(default)]
    pub folders: Vec<String>,

    /// Answer with a permanent redirect instead of serving the image
    #[serde(default)]
    pub redirect: bool,

    /// Redirect target base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Query parameter of the redirect target that receives the original URL
    #[serde(
        default,
        rename = "query-param",
        alias = "query_param",
        skip_serializing_if = "Option::is_none"
    )]
    pub query_param: Option<String>,

    /// Credential key for authenticated calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Credential secret for authenticated calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl NamespaceConfig {
    /// Convenience constructor for a file_system namespace rooted at `folders`
    pub fn file_system(folders: &[&str]) -> Self {
        Self {
            loader: Some(LoaderKind::FileSystem),
            folders: folders.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Convenience constructor for an http namespace allowing `prefixes`
    pub fn http(prefixes: &[&str]) -> Self {
        Self {
            loader: Some(LoaderKind::Http),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Validate a single namespace entry
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.redirect {
            if self.url.as_deref().map_or(true, str::is_empty) {
                return Err(format!(
                    "Namespace '{}': url is required when redirect is enabled",
                    name
                ));
            }
            if self.query_param.as_deref().map_or(true, str::is_empty) {
                return Err(format!(
                    "Namespace '{}': query-param is required when redirect is enabled",
                    name
                ));
            }
            return Ok(());
        }

        let loader = self
            .loader
            .ok_or_else(|| format!("Namespace '{}': no loader configured", name))?;

        if loader == LoaderKind::FileSystem && self.folders.is_empty() && self.prefixes.is_empty()
        {
            return Err(format!(
                "Namespace '{}': file_system loader needs at least one folder or prefix",
                name
            ));
        }

        if loader == LoaderKind::Http && self.prefixes.is_empty() {
            return Err(format!(
                "Namespace '{}': http loader needs at least one prefix (use \"\" to allow any host)",
                name
            ));
        }

        if self.key.is_some() != self.secret.is_some() {
            return Err(format!(
                "Namespace '{}': key and secret must be configured together",
                name
            ));
        }

        Ok(())
    }
}
