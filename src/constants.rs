// Constants module - centralized default values for configuration
//
// This module defines the default values used throughout the codebase.
// Config structs reference these through their serde default functions.

// =============================================================================
// Transform defaults
// =============================================================================

/// Default delimiter pattern for splitting transform arguments (`100x200`, `100_200`, `100,200`)
pub const DEFAULT_DELIMITERS: &str = "[x_,]";

/// Default keyword marking a focal point embedded in a filename (`photo_focus-10x90.jpg`)
pub const DEFAULT_FOCUS_KEYWORD: &str = "focus-";

/// Default maximum pixel count for decoded sources and resize targets
/// (matches the classic decompression-bomb threshold of 89,478,485 pixels)
pub const DEFAULT_MAX_PIXELS: u64 = 89_478_485;

/// Default maximum size of a source file in bytes (50 MB)
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 50 * 1024 * 1024;

// =============================================================================
// Encoding defaults
// =============================================================================

/// Default quality for lossy encoders when the request gives none
pub const DEFAULT_QUALITY: u8 = 95;

/// Images with at most this many distinct colours stay PNG under `format=auto`
pub const DEFAULT_AUTO_PNG_MAX_COLORS: usize = 256;

/// oxipng preset used for lossless PNG recompression (0 = fastest, 6 = smallest)
pub const DEFAULT_PNG_OPTIMIZATION_LEVEL: u8 = 2;

// =============================================================================
// Response defaults
// =============================================================================

/// Cache-Control header attached to every successful image response (one year)
pub const CACHE_CONTROL: &str = "max-age=31536000";

/// Name of the overlay requested by the legacy `.passport.` path segment
pub const PASSPORT_OVERLAY: &str = "passport";

// =============================================================================
// Backend defaults
// =============================================================================

/// Default timeout for the HTTP backend in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default log level when neither config nor RUST_LOG specify one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// MIME types keyed by uppercase format name
pub const MIME_TYPES: &[(&str, &str)] = &[
    ("PNG", "image/png"),
    ("JPEG", "image/jpeg"),
    ("JPG", "image/jpeg"),
    ("WEBP", "image/webp"),
    ("SVG", "image/svg+xml"),
];

/// Look up the MIME type for a format name (case-insensitive)
pub fn mime_type(format: &str) -> Option<&'static str> {
    let upper = format.to_ascii_uppercase();
    MIME_TYPES
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, mime)| *mime)
}
