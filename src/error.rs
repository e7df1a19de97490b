//! Error taxonomy
//!
//! Every failure that crosses a module boundary is an [`ItsError`]. Each
//! variant maps to an HTTP status code and renders a human-readable message;
//! the boundary layer turns the pair into a response. Client-caused errors
//! (4xx) propagate unmodified from the point of detection.
//!
//! Colour-profile failures are deliberately *not* part of this enum: they are
//! recoverable and handled inside the pipeline (see `color::NormalizationError`).

use std::fmt;

/// Errors that can occur while serving a transformed image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItsError {
    // === Parameter Errors ===
    /// A transform or encoder parameter could not be parsed or is out of range
    InvalidParameter { param: String, message: String },
    /// More than one of the fit synonyms was supplied
    SynonymConflict,
    /// Requested output dimensions exceed the pixel limit
    TooBig { width: u64, height: u64 },
    /// A source or target dimension is zero or otherwise unusable
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
    /// Requested output format is not supported
    UnsupportedFormat { format: String },

    // === Source Errors ===
    /// Source bytes could not be decoded as an image
    NotAnImage { path: String },
    /// Source decoded to a format the service does not serve
    UnsupportedFileType { path: String },
    /// Source decodes to more pixels than allowed (decompression bomb)
    ImageTooLarge { path: String },
    /// Source file exceeds the byte limit
    FileTooLarge { size: usize, max_size: usize },
    /// Requested path escapes the backend root
    PathNotAllowed { path: String },

    // === Routing / Auth Errors ===
    /// Namespace is not present in the configuration
    UnknownNamespace { namespace: String },
    /// Credentials missing or wrong
    Unauthorized { message: String },
    /// Requested resource does not exist at the backend
    NotFound { path: String },

    // === Server Errors ===
    /// Missing or duplicated backend configuration
    Config { message: String },
    /// Encoding to the output format failed
    EncodeFailed { format: String, message: String },
    /// Unexpected internal failure (resampler, buffer sizes)
    Internal { message: String },
    /// Remote backend returned an unexpected response
    Upstream { message: String },
}

impl fmt::Display for ItsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Parameter errors
            ItsError::InvalidParameter { param, message } => {
                write!(f, "Invalid arguments supplied to {}: {}", param, message)
            }
            ItsError::SynonymConflict => {
                write!(f, "use only one of these synonyms: fit, crop, focalcrop")
            }
            ItsError::TooBig { width, height } => write!(f, "{}x{} is too big", width, height),
            ItsError::InvalidDimensions {
                width,
                height,
                reason,
            } => write!(f, "Invalid dimensions {}x{}: {}", width, height, reason),
            ItsError::UnsupportedFormat { format } => {
                write!(f, "{} is not a supported output format", format)
            }

            // Source errors
            ItsError::NotAnImage { path } => write!(f, "{} is not an image file", path),
            ItsError::UnsupportedFileType { path } => {
                write!(f, "{} is not a supported file type", path)
            }
            ItsError::ImageTooLarge { path } => {
                write!(f, "{} is too large. Please use a smaller one", path)
            }
            ItsError::FileTooLarge { size, max_size } => write!(
                f,
                "File size {} bytes exceeds maximum {} bytes",
                size, max_size
            ),
            ItsError::PathNotAllowed { path } => write!(f, "{} is not an allowed path", path),

            // Routing / auth errors
            ItsError::UnknownNamespace { namespace } => {
                write!(f, "{} is not a configured namespace", namespace)
            }
            ItsError::Unauthorized { message } => write!(f, "{}", message),
            ItsError::NotFound { path } => write!(f, "{} not found", path),

            // Server errors
            ItsError::Config { message } => write!(f, "Configuration error: {}", message),
            ItsError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            ItsError::Internal { message } => write!(f, "Internal error: {}", message),
            ItsError::Upstream { message } => write!(f, "Upstream error: {}", message),
        }
    }
}

impl std::error::Error for ItsError {}

impl ItsError {
    /// Maps errors to HTTP status codes
    ///
    /// Status mapping:
    /// - parameter and source errors → 400 (Bad Request)
    /// - Unauthorized → 401
    /// - NotFound → 404
    /// - FileTooLarge → 413 (Payload Too Large)
    /// - Config, EncodeFailed, Internal → 500
    /// - Upstream → 502 (Bad Gateway)
    pub fn to_http_status(&self) -> u16 {
        match self {
            ItsError::InvalidParameter { .. }
            | ItsError::SynonymConflict
            | ItsError::TooBig { .. }
            | ItsError::InvalidDimensions { .. }
            | ItsError::UnsupportedFormat { .. }
            | ItsError::NotAnImage { .. }
            | ItsError::UnsupportedFileType { .. }
            | ItsError::ImageTooLarge { .. }
            | ItsError::PathNotAllowed { .. }
            | ItsError::UnknownNamespace { .. } => 400,

            ItsError::Unauthorized { .. } => 401,

            ItsError::NotFound { .. } => 404,

            ItsError::FileTooLarge { .. } => 413,

            ItsError::Config { .. } | ItsError::EncodeFailed { .. } | ItsError::Internal { .. } => {
                500
            }

            ItsError::Upstream { .. } => 502,
        }
    }

    /// True for user-caused conditions (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.to_http_status())
    }

    /// Helper constructors for common error patterns
    pub fn invalid_param(param: impl Into<String>, message: impl Into<String>) -> Self {
        ItsError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        ItsError::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ItsError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        ItsError::NotFound { path: path.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ItsError::Config {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ItsError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ItsError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ItsError::Internal {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ItsError::Upstream {
            message: message.into(),
        }
    }
}
