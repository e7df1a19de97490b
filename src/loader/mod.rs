//! Source loaders
//!
//! A [`Backend`] turns `(namespace, filename)` into raw bytes. The
//! [`LoaderRegistry`] maps each [`LoaderKind`] to exactly one backend and
//! wraps fetching with the size guard, SVG detection and decoding, so the
//! pipeline only ever sees a [`SourceImage`].

pub mod filesystem;
pub mod http;
pub mod overlay;

pub use filesystem::FileSystemBackend;
pub use http::HttpBackend;
pub use overlay::FileOverlays;

use std::collections::HashMap;

use crate::config::{Config, LoaderKind, NamespaceConfig, TransformConfig};
use crate::error::ItsError;
use crate::security::validate_file_size;
use crate::source::{self, SourceImage};

/// Fetches raw source bytes for a namespace
pub trait Backend: Send + Sync {
    /// Loader kind this backend serves
    fn kind(&self) -> LoaderKind;

    fn fetch(
        &self,
        namespace: &str,
        config: &NamespaceConfig,
        filename: &str,
    ) -> Result<Vec<u8>, ItsError>;
}

/// One backend per loader kind
pub struct LoaderRegistry {
    backends: HashMap<LoaderKind, Box<dyn Backend>>,
    /// Public host name; http filenames starting with it are served locally
    host: Option<String>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            host: None,
        }
    }

    /// Registry with the file system and http backends
    pub fn with_defaults(config: &TransformConfig) -> Result<Self, ItsError> {
        let mut registry = Self::new();
        registry.register(Box::new(FileSystemBackend))?;
        registry.register(Box::new(HttpBackend::new(config.http_timeout_secs)?))?;
        Ok(registry)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn register(&mut self, backend: Box<dyn Backend>) -> Result<(), ItsError> {
        let kind = backend.kind();
        if self.backends.contains_key(&kind) {
            return Err(ItsError::config(format!(
                "Two or more image loaders have slug '{}'",
                kind.as_str()
            )));
        }
        self.backends.insert(kind, backend);
        Ok(())
    }

    /// Backend responsible for a namespace
    pub fn backend_for(
        &self,
        namespace: &str,
        config: &NamespaceConfig,
    ) -> Result<&dyn Backend, ItsError> {
        let kind = config.loader.ok_or_else(|| {
            ItsError::config(format!("No backend for namespace '{}'", namespace))
        })?;
        self.backends
            .get(&kind)
            .map(|backend| &**backend)
            .ok_or_else(|| {
                ItsError::config(format!("No image loader with slug '{}' found", kind.as_str()))
            })
    }

    /// Fetch and decode `filename` from `namespace`
    pub fn load(
        &self,
        config: &Config,
        namespace: &str,
        filename: &str,
    ) -> Result<SourceImage, ItsError> {
        let ns_config = config.namespace(namespace).ok_or_else(|| {
            ItsError::config(format!("No backend for namespace '{}'", namespace))
        })?;
        let backend = self.backend_for(namespace, ns_config)?;

        // An http filename naming this service is a request for one of our
        // own namespaces: `<host>/<namespace>/<file>`.
        if backend.kind() == LoaderKind::Http {
            if let Some((inner_ns, inner_file)) = self.self_reference(filename) {
                tracing::debug!(
                    namespace = %inner_ns,
                    filename = %inner_file,
                    "Resolving self-referential http source"
                );
                return self.load(config, inner_ns, inner_file);
            }
        }

        let bytes = backend.fetch(namespace, ns_config, filename)?;
        validate_file_size(bytes.len(), config.transform.max_source_bytes)?;

        if source::is_svg(filename, &bytes) {
            tracing::debug!(namespace, filename, bytes = bytes.len(), "Loaded SVG source");
            return Ok(SourceImage::Vector(bytes));
        }

        let label = format!("{}/{}", namespace, filename);
        let decoded = source::decode(&bytes, &label, config.transform.max_pixels)?;
        Ok(SourceImage::Raster(decoded.with_filename(filename)))
    }

    fn self_reference<'a>(&self, filename: &'a str) -> Option<(&'a str, &'a str)> {
        let host = self.host.as_deref()?;
        let rest = filename.strip_prefix(host)?.strip_prefix('/')?;
        let (namespace, file) = rest.split_once('/')?;
        if namespace.is_empty() || file.is_empty() {
            return None;
        }
        Some((namespace, file))
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
