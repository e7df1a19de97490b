use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_PNG_MAX_COLORS, DEFAULT_DELIMITERS, DEFAULT_FOCUS_KEYWORD,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_PIXELS, DEFAULT_MAX_SOURCE_BYTES,
    DEFAULT_PNG_OPTIMIZATION_LEVEL, DEFAULT_QUALITY,
};

/// Transform and encoding settings, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Regex character class separating transform arguments
    #[serde(default = "default_delimiters")]
    pub delimiters: String,

    /// Filename keyword introducing an embedded focal point
    #[serde(default = "default_focus_keyword")]
    pub focus_keyword: String,

    /// Maximum decoded source pixels and maximum resize target pixels
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    /// Maximum source size in bytes
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,

    /// Quality used for lossy formats when the request has none
    #[serde(default = "default_quality")]
    pub default_quality: u8,

    /// Colour-count threshold for `format=auto` to stay PNG
    #[serde(default = "default_auto_png_max_colors")]
    pub auto_png_max_colors: usize,

    /// oxipng preset for lossless PNG recompression
    #[serde(default = "default_png_optimization_level")]
    pub png_optimization_level: u8,

    /// HTTP backend timeout
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            delimiters: default_delimiters(),
            focus_keyword: default_focus_keyword(),
            max_pixels: default_max_pixels(),
            max_source_bytes: default_max_source_bytes(),
            default_quality: default_quality(),
            auto_png_max_colors: default_auto_png_max_colors(),
            png_optimization_level: default_png_optimization_level(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl TransformConfig {
    pub fn validate(&self) -> Result<(), String> {
        Regex::new(&self.delimiters)
            .map_err(|e| format!("Invalid delimiters pattern '{}': {}", self.delimiters, e))?;

        if self.focus_keyword.is_empty() {
            return Err("focus_keyword cannot be empty".to_string());
        }

        if self.max_pixels == 0 {
            return Err("max_pixels must be greater than 0".to_string());
        }

        if !(1..=100).contains(&self.default_quality) {
            return Err(format!(
                "default_quality {} must be between 1 and 100",
                self.default_quality
            ));
        }

        if self.png_optimization_level > 6 {
            return Err(format!(
                "png_optimization_level {} must be between 0 and 6",
                self.png_optimization_level
            ));
        }

        Ok(())
    }
}

fn default_delimiters() -> String {
    DEFAULT_DELIMITERS.to_string()
}

fn default_focus_keyword() -> String {
    DEFAULT_FOCUS_KEYWORD.to_string()
}

fn default_max_pixels() -> u64 {
    DEFAULT_MAX_PIXELS
}

fn default_max_source_bytes() -> usize {
    DEFAULT_MAX_SOURCE_BYTES
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_auto_png_max_colors() -> usize {
    DEFAULT_AUTO_PNG_MAX_COLORS
}

fn default_png_optimization_level() -> u8 {
    DEFAULT_PNG_OPTIMIZATION_LEVEL
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
