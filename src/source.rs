//! Source images
//!
//! Decodes raw backend bytes into a [`DecodedImage`], or tags vector (SVG)
//! content for byte-for-byte pass-through. Dimensions are checked from the
//! decoder header before the pixel buffer is allocated.

use std::collections::BTreeMap;
use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{DynamicImage, ImageDecoder, ImageFormat};

use crate::error::ItsError;
use crate::security::validate_dimensions;

/// Metadata key holding the requested filename
pub const FILENAME_KEY: &str = "filename";

/// Bytes inspected when sniffing for SVG markup
const SVG_SNIFF_LEN: usize = 1024;

/// Raster formats the decoder accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Png,
    Jpeg,
    WebP,
}

impl SourceFormat {
    /// Uppercase name, as used by the MIME table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::WebP => "WEBP",
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }
}

/// A decoded raster image travelling through the pipeline
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: SourceFormat,
    /// Embedded ICC profile, removed once colour normalisation has run
    pub icc_profile: Option<Vec<u8>>,
    pub metadata: BTreeMap<String, String>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, format: SourceFormat) -> Self {
        Self {
            image,
            format,
            icc_profile: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.metadata.insert(FILENAME_KEY.to_string(), filename.into());
        self
    }

    pub fn filename(&self) -> Option<&str> {
        self.metadata.get(FILENAME_KEY).map(String::as_str)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// Replace the pixels, keeping format, profile and metadata
    pub fn with_image(self, image: DynamicImage) -> Self {
        Self { image, ..self }
    }
}

/// What a loader hands to the service
#[derive(Debug, Clone)]
pub enum SourceImage {
    Raster(DecodedImage),
    /// SVG content, returned untouched
    Vector(Vec<u8>),
}

/// Whether the source should bypass decoding as SVG
pub fn is_svg(filename: &str, bytes: &[u8]) -> bool {
    if filename.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }

    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Decode raster bytes
///
/// `label` is the `<namespace>/<filename>` string used in client messages.
pub fn decode(bytes: &[u8], label: &str, max_pixels: u64) -> Result<DecodedImage, ItsError> {
    let guessed = image::guess_format(bytes).map_err(|_| ItsError::NotAnImage {
        path: label.to_string(),
    })?;

    let format =
        SourceFormat::from_image_format(guessed).ok_or_else(|| ItsError::UnsupportedFileType {
            path: label.to_string(),
        })?;

    let not_an_image = |e: image::ImageError| {
        tracing::info!(path = %label, error = %e, "Failed to decode source image");
        ItsError::NotAnImage {
            path: label.to_string(),
        }
    };

    let cursor = Cursor::new(bytes);
    match format {
        SourceFormat::Png => {
            let decoder = PngDecoder::new(cursor).map_err(not_an_image)?;
            decode_with(decoder, format, label, max_pixels, not_an_image)
        }
        SourceFormat::Jpeg => {
            let decoder = JpegDecoder::new(cursor).map_err(not_an_image)?;
            decode_with(decoder, format, label, max_pixels, not_an_image)
        }
        SourceFormat::WebP => {
            let decoder = WebPDecoder::new(cursor).map_err(not_an_image)?;
            decode_with(decoder, format, label, max_pixels, not_an_image)
        }
    }
}

fn decode_with<'a, D, F>(
    mut decoder: D,
    format: SourceFormat,
    label: &str,
    max_pixels: u64,
    not_an_image: F,
) -> Result<DecodedImage, ItsError>
where
    D: ImageDecoder<'a>,
    F: Fn(image::ImageError) -> ItsError,
{
    let (width, height) = decoder.dimensions();
    validate_dimensions(width, height, max_pixels, label)?;

    let icc_profile = decoder.icc_profile();
    let image = DynamicImage::from_decoder(decoder).map_err(not_an_image)?;

    tracing::debug!(
        path = %label,
        format = format.as_str(),
        width,
        height,
        has_icc_profile = icc_profile.is_some(),
        "Decoded source image"
    );

    Ok(DecodedImage {
        image,
        format,
        icc_profile,
        metadata: BTreeMap::new(),
    })
}
