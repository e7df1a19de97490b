//! Lanczos3 resampling via fast_image_resize
//!
//! Images with alpha are premultiplied before convolution and divided
//! afterwards so transparent pixels do not bleed colour into their
//! neighbours. Grayscale images stay grayscale; everything else is
//! resampled as 8-bit RGB or RGBA.

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use std::num::NonZeroU32;

use crate::error::ItsError;

/// Resample `img` to exactly `target_w` x `target_h`
pub fn resample(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, ItsError> {
    let src_w = img.width();
    let src_h = img.height();

    let src_width = NonZeroU32::new(src_w)
        .ok_or_else(|| ItsError::invalid_dimensions(src_w, src_h, "source width is 0"))?;
    let src_height = NonZeroU32::new(src_h)
        .ok_or_else(|| ItsError::invalid_dimensions(src_w, src_h, "source height is 0"))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| ItsError::invalid_dimensions(target_w, target_h, "target width is 0"))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| ItsError::invalid_dimensions(target_w, target_h, "target height is 0"))?;

    let layout = Layout::of(img);
    let mut src_image =
        Image::from_vec_u8(src_width, src_height, layout.buffer(img), layout.pixel_type())
            .map_err(|e| ItsError::internal(format!("Failed to create source image: {:?}", e)))?;
    let mut dst_image = Image::new(dst_width, dst_height, layout.pixel_type());

    let mul_div = MulDiv::default();
    if layout.has_alpha() {
        mul_div
            .multiply_alpha_inplace(&mut src_image.view_mut())
            .map_err(|e| ItsError::internal(format!("Failed to premultiply alpha: {:?}", e)))?;
    }

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ItsError::internal(format!("Resize operation failed: {:?}", e)))?;

    if layout.has_alpha() {
        mul_div
            .divide_alpha_inplace(&mut dst_image.view_mut())
            .map_err(|e| ItsError::internal(format!("Failed to restore alpha: {:?}", e)))?;
    }

    layout
        .rebuild(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ItsError::internal("Failed to create output image buffer"))
}

/// 8-bit channel layout an image is resampled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl Layout {
    fn of(img: &DynamicImage) -> Self {
        let color = img.color();
        match (color.has_color(), color.has_alpha()) {
            (false, false) => Layout::Luma,
            (false, true) => Layout::LumaAlpha,
            (true, false) => Layout::Rgb,
            (true, true) => Layout::Rgba,
        }
    }

    fn has_alpha(self) -> bool {
        matches!(self, Layout::LumaAlpha | Layout::Rgba)
    }

    fn pixel_type(self) -> PixelType {
        match self {
            Layout::Luma => PixelType::U8,
            Layout::LumaAlpha => PixelType::U8x2,
            Layout::Rgb => PixelType::U8x3,
            Layout::Rgba => PixelType::U8x4,
        }
    }

    fn buffer(self, img: &DynamicImage) -> Vec<u8> {
        match self {
            Layout::Luma => img.to_luma8().into_raw(),
            Layout::LumaAlpha => img.to_luma_alpha8().into_raw(),
            Layout::Rgb => img.to_rgb8().into_raw(),
            Layout::Rgba => img.to_rgba8().into_raw(),
        }
    }

    fn rebuild(self, width: u32, height: u32, buf: Vec<u8>) -> Option<DynamicImage> {
        match self {
            Layout::Luma => GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8),
            Layout::LumaAlpha => {
                GrayAlphaImage::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
            }
            Layout::Rgb => RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
            Layout::Rgba => RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8),
        }
    }
}
