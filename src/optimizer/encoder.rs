//! Image encoder abstraction
//!
//! One [`ImageEncoder`] per output format:
//! - JPEG through mozjpeg, always progressive with optimised Huffman tables
//!   and scans
//! - PNG lossless through the image crate, or palette-quantised when the
//!   request carries a quality
//! - WebP lossy through libwebp

use std::io::Cursor;

use image::codecs::png::PngEncoder as ImagePngEncoder;
use image::{DynamicImage, ImageEncoder as _};

use super::format::OutputFormat;
use super::quantize::quantize_png;
use crate::error::ItsError;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
    /// Whether the request asked for this quality explicitly
    pub explicit: bool,
}

impl EncoderQuality {
    /// Quality taken from configuration
    pub fn configured(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            explicit: false,
        }
    }

    /// Quality supplied by the request
    pub fn requested(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            explicit: true,
        }
    }
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
    /// Content-Type header value
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        let content_type = format.content_type();
        Self {
            data,
            format,
            content_type,
        }
    }
}

/// Trait for image encoders
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode the image to the target format
    fn encode(
        &self,
        image: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ItsError>;

    /// Check if this encoder supports transparency
    fn supports_transparency(&self) -> bool {
        self.format().supports_transparency()
    }
}

/// Progressive JPEG encoder using mozjpeg
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        image: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ItsError> {
        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality.quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);
        comp.set_optimize_scans(true);

        let mut started = comp
            .start_compress(Vec::new())
            .map_err(|e| ItsError::encode_failed("jpeg", format!("mozjpeg: {}", e)))?;
        started
            .write_scanlines(rgb.as_raw())
            .map_err(|e| ItsError::encode_failed("jpeg", format!("mozjpeg: {}", e)))?;
        let data = started
            .finish()
            .map_err(|e| ItsError::encode_failed("jpeg", format!("mozjpeg: {}", e)))?;

        Ok(EncodedImage::new(data, OutputFormat::Jpeg))
    }
}

/// PNG encoder, lossless unless a quality was requested
pub struct PngEncoder {
    /// oxipng preset applied after quantisation
    pub optimization_level: u8,
}

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        image: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ItsError> {
        if quality.explicit {
            let data = quantize_png(image, quality.quality, self.optimization_level)?;
            return Ok(EncodedImage::new(data, OutputFormat::Png));
        }

        let color = image.color();
        let (color_type, bytes) = match (color.has_color(), color.has_alpha()) {
            (false, false) => (image::ColorType::L8, image.to_luma8().into_raw()),
            (false, true) => (image::ColorType::La8, image.to_luma_alpha8().into_raw()),
            (true, false) => (image::ColorType::Rgb8, image.to_rgb8().into_raw()),
            (true, true) => (image::ColorType::Rgba8, image.to_rgba8().into_raw()),
        };

        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(&bytes, image.width(), image.height(), color_type)
            .map_err(|e| ItsError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Png))
    }
}

/// Lossy WebP encoder using libwebp
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        image: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ItsError> {
        let (width, height) = (image.width(), image.height());

        let data = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            webp::Encoder::from_rgba(&rgba, width, height)
                .encode(quality.quality as f32)
                .to_vec()
        } else {
            let rgb = image.to_rgb8();
            webp::Encoder::from_rgb(&rgb, width, height)
                .encode(quality.quality as f32)
                .to_vec()
        };

        if data.is_empty() {
            return Err(ItsError::encode_failed("webp", "libwebp produced no output"));
        }

        Ok(EncodedImage::new(data, OutputFormat::WebP))
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat, png_optimization_level: u8) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::Png => Box::new(PngEncoder {
                optimization_level: png_optimization_level,
            }),
            OutputFormat::WebP => Box::new(WebPEncoder),
        }
    }
}
