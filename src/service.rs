//! Request handling boundary
//!
//! Ties the pieces together for one request:
//!
//! 1. normalise the query (fit synonyms)
//! 2. resolve the namespace; redirect namespaces answer without loading
//! 3. load the source through the [`LoaderRegistry`]
//! 4. SVG sources are returned as-is
//! 5. everything else runs through the [`TransformPipeline`]
//!
//! Privileged callers are checked first with [`ImageService::authorize_path`].

use crate::auth;
use crate::config::Config;
use crate::constants::{mime_type, CACHE_CONTROL};
use crate::error::ItsError;
use crate::loader::{FileOverlays, LoaderRegistry};
use crate::optimizer::FORMAT_KEY;
use crate::pipeline::TransformPipeline;
use crate::query::RequestQuery;
use crate::router::Router;
use crate::source::SourceImage;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";

/// Result of a successful request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResponse {
    Image {
        data: Vec<u8>,
        content_type: &'static str,
        cache_control: &'static str,
    },
    /// Permanent redirect to another image service
    Redirect { location: String },
}

impl ServiceResponse {
    pub fn status(&self) -> u16 {
        match self {
            ServiceResponse::Image { .. } => 200,
            ServiceResponse::Redirect { .. } => 301,
        }
    }
}

pub struct ImageService {
    config: Config,
    router: Router,
    loaders: LoaderRegistry,
    pipeline: TransformPipeline,
    overlays: FileOverlays,
    scheme: String,
    host: String,
}

impl ImageService {
    /// Service with the default file system and http loaders
    pub fn new(config: Config) -> Result<Self, ItsError> {
        let loaders =
            LoaderRegistry::with_defaults(&config.transform)?.with_host(DEFAULT_HOST.to_string());
        Self::with_loaders(config, loaders)
    }

    pub fn with_loaders(config: Config, loaders: LoaderRegistry) -> Result<Self, ItsError> {
        let pipeline = TransformPipeline::new(&config.transform)?;
        let overlays = FileOverlays::from_config(&config);
        Ok(Self {
            router: Router::new()?,
            loaders,
            pipeline,
            overlays,
            config,
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
        })
    }

    /// Public scheme and host, used for redirect locations and to detect
    /// http sources that point back at this service
    pub fn with_origin(mut self, scheme: impl Into<String>, host: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self.host = host.into();
        self.loaders = self.loaders.with_host(self.host.clone());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Credential check for a privileged request on `/<namespace>/...`
    ///
    /// Runs before any loading; image requests themselves are public.
    pub fn authorize_path(&self, path: &str, authorization: Option<&str>) -> Result<(), ItsError> {
        let namespace = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        auth::authorize(&self.config, namespace, authorization)
    }

    /// Handle `/<namespace>/<filename>` with a raw query string
    ///
    /// A filename in the legacy path grammar carries its own transforms and
    /// the query string is ignored.
    pub fn handle_path(&self, path: &str, query_string: &str) -> Result<ServiceResponse, ItsError> {
        let (namespace, filename) = self.router.split_path(path)?;

        match self.router.parse_legacy_path(&filename) {
            Some(legacy) => self.handle(&namespace, &legacy.filename, legacy.query),
            None => self.handle(
                &namespace,
                &filename,
                RequestQuery::from_query_string(query_string),
            ),
        }
    }

    pub fn handle(
        &self,
        namespace: &str,
        filename: &str,
        query: RequestQuery,
    ) -> Result<ServiceResponse, ItsError> {
        let result = self.process(namespace, filename, query);

        match &result {
            Ok(response) => {
                tracing::info!(namespace, filename, status = response.status(), "Request served");
            }
            Err(e) if e.is_client_error() => {
                tracing::info!(namespace, filename, status = e.to_http_status(), error = %e, "Request rejected");
            }
            Err(e) => {
                tracing::error!(namespace, filename, status = e.to_http_status(), error = %e, "Request failed");
            }
        }

        result
    }

    fn process(
        &self,
        namespace: &str,
        filename: &str,
        query: RequestQuery,
    ) -> Result<ServiceResponse, ItsError> {
        let query = query.normalize()?;

        let ns_config =
            self.config
                .namespace(namespace)
                .ok_or_else(|| ItsError::UnknownNamespace {
                    namespace: namespace.to_string(),
                })?;

        if ns_config.redirect {
            let location = self.redirect_location(namespace, filename, &query)?;
            return Ok(ServiceResponse::Redirect { location });
        }

        match self.loaders.load(&self.config, namespace, filename)? {
            SourceImage::Vector(data) => Ok(ServiceResponse::Image {
                data,
                content_type: mime_type("SVG").unwrap_or("image/svg+xml"),
                cache_control: CACHE_CONTROL,
            }),
            SourceImage::Raster(image) => {
                let encoded = self.pipeline.process(image, &query, &self.overlays)?;
                Ok(ServiceResponse::Image {
                    data: encoded.data,
                    content_type: encoded.content_type,
                    cache_control: CACHE_CONTROL,
                })
            }
        }
    }

    /// `<url>?<query-param>=<scheme>://<host>/<ns>/<file>.<key>.<value>...<.format>`
    fn redirect_location(
        &self,
        namespace: &str,
        filename: &str,
        query: &RequestQuery,
    ) -> Result<String, ItsError> {
        let ns_config = self.config.namespace(namespace).ok_or_else(|| {
            ItsError::config(format!("No backend for namespace '{}'", namespace))
        })?;
        let (Some(url), Some(query_param)) = (&ns_config.url, &ns_config.query_param) else {
            return Err(ItsError::config(format!(
                "Namespace '{}' redirects without url and query-param",
                namespace
            )));
        };

        let mut location = format!(
            "{}?{}={}://{}/{}/{}",
            url, query_param, self.scheme, self.host, namespace, filename
        );
        for (key, value) in query.iter().filter(|(key, _)| *key != FORMAT_KEY) {
            location.push_str(&format!(".{}.{}", key, value));
        }
        if let Some(ext) = query.get(FORMAT_KEY) {
            location.push('.');
            location.push_str(ext);
        }

        tracing::debug!(namespace, location = %location, "Redirecting request");
        Ok(location)
    }
}
