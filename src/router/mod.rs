//! Request path routing
//!
//! Splits `/<namespace>/<filename>` request paths and rewrites the legacy
//! path-segment grammar into the equivalent query:
//!
//! ```text
//! <file>.crop.<W>x<H>.<ext>                  → fit=WxH&format=ext
//! <file>.focalcrop.<W>x<H>.<Fx>.<Fy>.<ext>   → fit=WxHxFxxFy&format=ext
//! <file>.fit.<W>x<H>.<ext>                   → fit=WxH&format=ext
//! <file>.resize.<W>x<H>|x<H>|<W>x.<ext>      → resize=...&format=ext
//! ```
//!
//! Every form accepts `.passport` before the extension, which adds
//! `overlay=passport`.

use regex::Regex;

use crate::constants::PASSPORT_OVERLAY;
use crate::error::ItsError;
use crate::query::{RequestQuery, FIT_KEY};

const LEGACY_PATTERN: &str = r"^(?P<file>.+)\.(?P<op>crop|focalcrop|fit|resize)\.(?P<w>\d*)x(?P<h>\d*)(?:\.(?P<fx>\d+)\.(?P<fy>\d+))?(?P<passport>\.passport)?\.(?P<ext>[A-Za-z0-9]+)$";

/// A request rewritten from the legacy grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRequest {
    /// Source filename with the transform segments removed
    pub filename: String,
    pub query: RequestQuery,
}

pub struct Router {
    legacy: Regex,
}

impl Router {
    pub fn new() -> Result<Self, ItsError> {
        let legacy = Regex::new(LEGACY_PATTERN)
            .map_err(|e| ItsError::internal(format!("Invalid legacy route pattern: {}", e)))?;
        Ok(Router { legacy })
    }

    /// Split `/<namespace>/<filename>` into its two parts
    pub fn split_path(&self, path: &str) -> Result<(String, String), ItsError> {
        let trimmed = path.trim_start_matches('/');
        match trimmed.split_once('/') {
            Some((namespace, filename)) if !namespace.is_empty() && !filename.is_empty() => {
                Ok((namespace.to_string(), filename.to_string()))
            }
            _ => Err(ItsError::not_found(path)),
        }
    }

    /// Rewrite a legacy path-segment filename into its query equivalent
    ///
    /// Returns `None` when the filename does not use the legacy grammar.
    pub fn parse_legacy_path(&self, filename: &str) -> Option<LegacyRequest> {
        let caps = self.legacy.captures(filename)?;

        let op = caps.name("op")?.as_str();
        let width = caps.name("w").map_or("", |m| m.as_str());
        let height = caps.name("h").map_or("", |m| m.as_str());
        let focal = match (caps.name("fx"), caps.name("fy")) {
            (Some(fx), Some(fy)) => Some((fx.as_str(), fy.as_str())),
            _ => None,
        };

        let value = match op {
            "resize" => {
                if (width.is_empty() && height.is_empty()) || focal.is_some() {
                    return None;
                }
                format!("{}x{}", width, height)
            }
            "focalcrop" => {
                let (fx, fy) = focal?;
                if width.is_empty() || height.is_empty() || !is_percentage(fx) || !is_percentage(fy)
                {
                    return None;
                }
                format!("{}x{}x{}x{}", width, height, fx, fy)
            }
            _ => {
                if width.is_empty() || height.is_empty() || focal.is_some() {
                    return None;
                }
                format!("{}x{}", width, height)
            }
        };

        let key = if op == "resize" { "resize" } else { FIT_KEY };

        let mut query = RequestQuery::new();
        query.insert(key, value);
        query.insert("format", caps.name("ext")?.as_str());
        if caps.name("passport").is_some() {
            query.insert("overlay", PASSPORT_OVERLAY);
        }

        let filename = caps.name("file")?.as_str().to_string();
        tracing::debug!(filename = %filename, op, "Rewrote legacy path");

        Some(LegacyRequest { filename, query })
    }
}

fn is_percentage(raw: &str) -> bool {
    matches!(raw.parse::<u32>(), Ok(value) if value <= 100)
}
