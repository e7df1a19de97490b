//! Colour normalisation
//!
//! Converts images carrying an embedded ICC profile into sRGB. Colour
//! channels go through lcms2; alpha is copied across untouched. Failure is
//! recoverable: the caller logs it, drops the profile and keeps the
//! original pixels.

use image::{DynamicImage, GrayAlphaImage, LumaA, RgbImage, RgbaImage};
use lcms2::{ColorSpaceSignature, Intent, PixelFormat, Profile, Transform};
use rgb::{FromSlice, RGB8};
use thiserror::Error;

use crate::source::DecodedImage;

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("malformed ICC profile: {0}")]
    MalformedProfile(String),

    #[error("unsupported ICC profile colour space {0}")]
    UnsupportedColorSpace(String),

    #[error("colour transform failed: {0}")]
    TransformFailed(String),
}

/// Convert the image to sRGB in place
///
/// Images without a profile are left alone. On success the profile is
/// removed; on failure neither pixels nor profile are touched.
pub fn normalize(image: &mut DecodedImage) -> Result<(), NormalizationError> {
    let Some(icc) = image.icc_profile.as_deref() else {
        return Ok(());
    };

    let profile =
        Profile::new_icc(icc).map_err(|e| NormalizationError::MalformedProfile(e.to_string()))?;

    let has_color = image.image.color().has_color();
    let converted = match profile.color_space() {
        ColorSpaceSignature::RgbData if has_color => convert_rgb(&profile, &image.image)?,
        ColorSpaceSignature::GrayData if !has_color => convert_gray(&profile, &image.image)?,
        other => {
            return Err(NormalizationError::UnsupportedColorSpace(format!(
                "{:?} profile on {:?} pixels",
                other,
                image.image.color()
            )))
        }
    };

    tracing::debug!(
        filename = image.filename().unwrap_or_default(),
        format = image.format.as_str(),
        "Converted embedded colour profile to sRGB"
    );

    image.image = converted;
    image.icc_profile = None;
    Ok(())
}

fn convert_rgb(profile: &Profile, image: &DynamicImage) -> Result<DynamicImage, NormalizationError> {
    let srgb = Profile::new_srgb();
    let transform: Transform<rgb::RGBA8, rgb::RGBA8> = Transform::new(
        profile,
        PixelFormat::RGBA_8,
        &srgb,
        PixelFormat::RGBA_8,
        Intent::Perceptual,
    )
    .map_err(|e| NormalizationError::TransformFailed(e.to_string()))?;

    let mut rgba = image.to_rgba8();
    let alpha: Vec<u8> = rgba.pixels().map(|p| p[3]).collect();
    let buffer: &mut [u8] = &mut rgba;
    transform.transform_in_place(buffer.as_rgba_mut());

    // lcms only writes colour channels
    for (pixel, a) in rgba.pixels_mut().zip(alpha) {
        pixel[3] = a;
    }

    Ok(restore_mode(rgba, image.color().has_alpha()))
}

fn convert_gray(
    profile: &Profile,
    image: &DynamicImage,
) -> Result<DynamicImage, NormalizationError> {
    let srgb = Profile::new_srgb();
    let transform: Transform<u8, RGB8> = Transform::new(
        profile,
        PixelFormat::GRAY_8,
        &srgb,
        PixelFormat::RGB_8,
        Intent::Perceptual,
    )
    .map_err(|e| NormalizationError::TransformFailed(e.to_string()))?;

    let luma_alpha = image.to_luma_alpha8();
    let (width, height) = luma_alpha.dimensions();
    let luma: Vec<u8> = luma_alpha.pixels().map(|p| p[0]).collect();
    let mut rgb = vec![RGB8::default(); luma.len()];
    transform.transform_pixels(&luma, &mut rgb);

    // sRGB greys are neutral, so the green channel carries the new luma
    let mut converted = GrayAlphaImage::new(width, height);
    for ((out, color), source) in converted
        .pixels_mut()
        .zip(rgb.iter())
        .zip(luma_alpha.pixels())
    {
        *out = LumaA([color.g, source[1]]);
    }

    if image.color().has_alpha() {
        Ok(DynamicImage::ImageLumaA8(converted))
    } else {
        Ok(DynamicImage::ImageLuma8(
            DynamicImage::ImageLumaA8(converted).to_luma8(),
        ))
    }
}

fn restore_mode(rgba: RgbaImage, has_alpha: bool) -> DynamicImage {
    if has_alpha {
        DynamicImage::ImageRgba8(rgba)
    } else {
        let rgb: RgbImage = DynamicImage::ImageRgba8(rgba).to_rgb8();
        DynamicImage::ImageRgb8(rgb)
    }
}
