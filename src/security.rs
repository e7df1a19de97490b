//! Input safety checks
//!
//! Provides:
//! - Image bomb protection (dimension validation before decoding)
//! - Source size limits
//! - Path traversal protection for backend lookups
//! - Constant-time comparison for credentials

use std::path::{Component, Path, PathBuf};

use crate::error::ItsError;

/// Validate decoded dimensions against the pixel limit
///
/// This must be called BEFORE the pixel buffer is allocated, using the
/// dimensions from the image header, to protect against "image bomb"
/// inputs where a small file decompresses to huge dimensions.
pub fn validate_dimensions(
    width: u32,
    height: u32,
    max_pixels: u64,
    path: &str,
) -> Result<(), ItsError> {
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        tracing::warn!(
            path = %path,
            width,
            height,
            pixels,
            max_pixels,
            "Rejected oversized source image"
        );
        return Err(ItsError::ImageTooLarge {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Validate source file size
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ItsError> {
    if size > max_size {
        return Err(ItsError::FileTooLarge { size, max_size });
    }
    Ok(())
}

/// Turn a request filename into a relative path that cannot escape its root
///
/// Leading slashes are dropped; `..`, root and prefix components are rejected.
pub fn sanitize_relative_path(filename: &str) -> Result<PathBuf, ItsError> {
    let trimmed = filename.trim_start_matches('/');
    let mut sanitized = PathBuf::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => sanitized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ItsError::PathNotAllowed {
                    path: filename.to_string(),
                });
            }
        }
    }

    if sanitized.as_os_str().is_empty() {
        return Err(ItsError::PathNotAllowed {
            path: filename.to_string(),
        });
    }

    Ok(sanitized)
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
