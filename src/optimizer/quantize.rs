//! Palette quantisation for lossy PNG output
//!
//! Reduces the image to at most 256 colours with imagequant, writes an
//! indexed PNG, then recompresses it losslessly with oxipng.

use image::DynamicImage;
use rgb::FromSlice;

use crate::error::ItsError;

/// Quantise and encode `image` as an indexed PNG at the given quality
pub fn quantize_png(
    image: &DynamicImage,
    quality: u8,
    optimization_level: u8,
) -> Result<Vec<u8>, ItsError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.as_raw().as_rgba().to_vec();

    let mut attributes = imagequant::new();
    attributes
        .set_quality(0, quality)
        .map_err(|e| quantize_failed(e.to_string()))?;

    let mut liq_image = attributes
        .new_image(pixels, width as usize, height as usize, 0.0)
        .map_err(|e| quantize_failed(e.to_string()))?;

    let mut result = attributes
        .quantize(&mut liq_image)
        .map_err(|e| quantize_failed(e.to_string()))?;
    result
        .set_dithering_level(1.0)
        .map_err(|e| quantize_failed(e.to_string()))?;

    let (palette, indices) = result
        .remapped(&mut liq_image)
        .map_err(|e| quantize_failed(e.to_string()))?;

    tracing::debug!(
        quality,
        colors = palette.len(),
        width,
        height,
        "Quantized image palette"
    );

    let indexed = write_indexed_png(width, height, &palette, &indices)?;

    let options = oxipng::Options::from_preset(optimization_level);
    oxipng::optimize_from_memory(&indexed, &options)
        .map_err(|e| ItsError::encode_failed("png", format!("oxipng: {}", e)))
}

fn write_indexed_png(
    width: u32,
    height: u32,
    palette: &[rgb::RGBA8],
    indices: &[u8],
) -> Result<Vec<u8>, ItsError> {
    let rgb_palette: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    let alpha: Vec<u8> = palette.iter().map(|c| c.a).collect();

    let mut output = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut output, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(rgb_palette);
        if alpha.iter().any(|&a| a < 255) {
            encoder.set_trns(alpha);
        }

        let mut writer = encoder
            .write_header()
            .map_err(|e| ItsError::encode_failed("png", e.to_string()))?;
        writer
            .write_image_data(indices)
            .map_err(|e| ItsError::encode_failed("png", e.to_string()))?;
        writer
            .finish()
            .map_err(|e| ItsError::encode_failed("png", e.to_string()))?;
    }

    Ok(output)
}

fn quantize_failed(message: String) -> ItsError {
    ItsError::encode_failed("png", format!("imagequant: {}", message))
}
