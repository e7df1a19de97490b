//! Output format optimisation
//!
//! Picks the output format from the `format` parameter, resolves the
//! quality, and encodes:
//!
//! ```text
//! ?format=png            lossless PNG
//! ?format=png&quality=80 palette-quantised PNG, oxipng recompressed
//! ?format=jpg&quality=70 progressive JPEG
//! ?format=webp           lossy WebP at the configured default quality
//! ?format=auto           PNG for transparent or flat images, JPEG otherwise
//! ```

pub mod encoder;
pub mod format;
pub mod quantize;

pub use encoder::{EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use format::{parse_quality, select_auto_format, OutputFormat, RequestedFormat};

use crate::config::TransformConfig;
use crate::error::ItsError;
use crate::query::RequestQuery;
use crate::source::DecodedImage;

pub const FORMAT_KEY: &str = "format";
pub const QUALITY_KEY: &str = "quality";

/// Encode `image` according to the `format` and `quality` parameters
pub fn optimize(
    image: &DecodedImage,
    query: &RequestQuery,
    config: &TransformConfig,
) -> Result<EncodedImage, ItsError> {
    let requested = RequestedFormat::from_query(query.get(FORMAT_KEY))?;
    let quality = match parse_quality(query.get(QUALITY_KEY))? {
        Some(quality) => EncoderQuality::requested(quality),
        None => EncoderQuality::configured(config.default_quality),
    };

    let format = requested.resolve(&image.image, image.format, config.auto_png_max_colors);
    let encoder = EncoderFactory::create(format, config.png_optimization_level);
    let encoded = encoder.encode(&image.image, quality)?;

    tracing::debug!(
        format = format.as_str(),
        requested = ?requested,
        quality = quality.quality,
        explicit_quality = quality.explicit,
        bytes = encoded.data.len(),
        "Encoded image"
    );

    Ok(encoded)
}
