//! Output format selection
//!
//! `format` may name a format explicitly, ask for `auto`, or be absent, in
//! which case the decoded source format is kept.
//!
//! The `auto` rule is deterministic:
//! 1. any pixel with alpha below 255 → PNG
//! 2. at most `auto_png_max_colors` distinct colours → PNG
//! 3. otherwise → JPEG

use std::collections::HashSet;
use std::str::FromStr;

use image::DynamicImage;

use crate::constants::mime_type;
use crate::error::ItsError;
use crate::source::SourceFormat;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        mime_type(self.as_str()).unwrap_or("application/octet-stream")
    }

    pub fn supports_transparency(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = ItsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(ItsError::unsupported_format(s)),
        }
    }
}

impl From<SourceFormat> for OutputFormat {
    fn from(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Png => OutputFormat::Png,
            SourceFormat::Jpeg => OutputFormat::Jpeg,
            SourceFormat::WebP => OutputFormat::WebP,
        }
    }
}

/// What the request asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedFormat {
    /// No `format` parameter: keep the source format
    Source,
    Auto,
    Explicit(OutputFormat),
}

impl RequestedFormat {
    pub fn from_query(value: Option<&str>) -> Result<Self, ItsError> {
        match value {
            None => Ok(RequestedFormat::Source),
            Some(raw) if raw.eq_ignore_ascii_case("auto") => Ok(RequestedFormat::Auto),
            Some(raw) => raw.parse().map(RequestedFormat::Explicit),
        }
    }

    pub fn resolve(
        &self,
        image: &DynamicImage,
        source: SourceFormat,
        auto_png_max_colors: usize,
    ) -> OutputFormat {
        match self {
            RequestedFormat::Source => source.into(),
            RequestedFormat::Explicit(format) => *format,
            RequestedFormat::Auto => select_auto_format(image, auto_png_max_colors),
        }
    }
}

/// Apply the `auto` rule
pub fn select_auto_format(image: &DynamicImage, max_colors: usize) -> OutputFormat {
    if has_transparency(image) {
        return OutputFormat::Png;
    }
    if count_colors_up_to(image, max_colors + 1) <= max_colors {
        return OutputFormat::Png;
    }
    OutputFormat::Jpeg
}

/// Whether any pixel is not fully opaque
pub fn has_transparency(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    image.to_rgba8().pixels().any(|p| p[3] < 255)
}

/// Count distinct RGB colours, stopping once `limit` is reached
fn count_colors_up_to(image: &DynamicImage, limit: usize) -> usize {
    let rgb = image.to_rgb8();
    let mut seen = HashSet::with_capacity(limit.min(4096));
    for pixel in rgb.pixels() {
        seen.insert(pixel.0);
        if seen.len() >= limit {
            break;
        }
    }
    seen.len()
}

/// Parse the `quality` parameter: an integer in 1..=100
pub fn parse_quality(value: Option<&str>) -> Result<Option<u8>, ItsError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.trim().parse::<u8>() {
        Ok(quality) if (1..=100).contains(&quality) => Ok(Some(quality)),
        _ => Err(ItsError::invalid_param(
            "quality",
            format!("'{}' must be an integer between 1 and 100", raw),
        )),
    }
}
