// Authentication module
//
// Namespace credential check for privileged calls. Runs before the pipeline
// and never sees image data. The expected token is
// base64("<key>:<secret>"); the client token is the last
// whitespace-separated word of the Authorization header, so both
// `Basic <token>` and a bare `<token>` are accepted. Callers reach it through
// `ImageService::authorize_path`.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config::{Config, NamespaceConfig};
use crate::error::ItsError;
use crate::security::constant_time_compare;

pub const INVALID_NAMESPACE: &str = "Invalid namespace.";
pub const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
pub const INVALID_CREDENTIALS: &str = "Invalid authentication credentials.";

/// Check the Authorization header for `namespace`
pub fn authorize(
    config: &Config,
    namespace: &str,
    authorization_header: Option<&str>,
) -> Result<(), ItsError> {
    let Some(ns_config) = config.namespace(namespace) else {
        tracing::info!(namespace, "Rejected credentials for unknown namespace");
        return Err(ItsError::unauthorized(INVALID_NAMESPACE));
    };

    let header = authorization_header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ItsError::unauthorized(MISSING_CREDENTIALS))?;

    let client_token = header.split_whitespace().last().unwrap_or_default();

    match expected_token(ns_config) {
        Some(expected) if constant_time_compare(client_token, &expected) => {
            tracing::debug!(namespace, "Credentials accepted");
            Ok(())
        }
        _ => {
            tracing::info!(namespace, "Rejected invalid credentials");
            Err(ItsError::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

/// Token a namespace accepts, if it has credentials configured
pub fn expected_token(config: &NamespaceConfig) -> Option<String> {
    let key = config.key.as_deref()?;
    let secret = config.secret.as_deref()?;
    Some(STANDARD.encode(format!("{}:{}", key, secret)))
}
