//! Overlay compositing
//!
//! The overlay image is scaled to fit inside the target (aspect preserved),
//! centred, and blended with the Porter-Duff "over" operator. Overlay bytes
//! come from an [`OverlaySource`] supplied by the caller; this module does
//! no I/O.

use image::{DynamicImage, Rgba, RgbaImage};

use super::resample::resample;
use crate::error::ItsError;
use crate::source::DecodedImage;

/// Resolves an overlay name or path to pixels
pub trait OverlaySource: Send + Sync {
    fn load(&self, name: &str) -> Result<DynamicImage, ItsError>;
}

/// Overlay source for callers that never composite
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverlays;

impl OverlaySource for NoOverlays {
    fn load(&self, name: &str) -> Result<DynamicImage, ItsError> {
        Err(ItsError::not_found(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Configured overlay name, or a path relative to the overlay root
    pub name: String,
}

impl Overlay {
    pub fn parse(raw: &str) -> Result<Self, ItsError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ItsError::invalid_param(
                "Overlay Transform",
                "no overlay image supplied",
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn apply(
        &self,
        image: DecodedImage,
        source: &dyn OverlaySource,
    ) -> Result<DecodedImage, ItsError> {
        let overlay = source.load(&self.name)?;
        let (width, height) = image.dimensions();

        let (fit_w, fit_h) = fit_inside((overlay.width(), overlay.height()), (width, height));
        let overlay = if (fit_w, fit_h) == (overlay.width(), overlay.height()) {
            overlay.to_rgba8()
        } else {
            resample(&overlay, fit_w, fit_h)?.to_rgba8()
        };

        let left = (width - fit_w) / 2;
        let top = (height - fit_h) / 2;

        let had_alpha = image.has_alpha();
        let mut target = image.image.to_rgba8();
        blend_at(&mut target, &overlay, left, top);

        tracing::debug!(
            overlay = %self.name,
            overlay_width = fit_w,
            overlay_height = fit_h,
            left,
            top,
            "Applied overlay"
        );

        let composed = DynamicImage::ImageRgba8(target);
        let composed = if had_alpha {
            composed
        } else {
            DynamicImage::ImageRgb8(composed.to_rgb8())
        };
        Ok(image.with_image(composed))
    }
}

/// Largest size with the overlay's aspect ratio that fits in `bounds`
fn fit_inside(overlay: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (ow, oh) = (overlay.0.max(1) as f64, overlay.1.max(1) as f64);
    let ratio = (bounds.0 as f64 / ow).min(bounds.1 as f64 / oh);
    let w = ((ow * ratio).floor() as u32).clamp(1, bounds.0.max(1));
    let h = ((oh * ratio).floor() as u32).clamp(1, bounds.1.max(1));
    (w, h)
}

fn blend_at(target: &mut RgbaImage, overlay: &RgbaImage, left: u32, top: u32) {
    let x_end = (left + overlay.width()).min(target.width());
    let y_end = (top + overlay.height()).min(target.height());

    for ty in top..y_end {
        for tx in left..x_end {
            let fg = *overlay.get_pixel(tx - left, ty - top);
            let bg = *target.get_pixel(tx, ty);
            target.put_pixel(tx, ty, blend_pixels(bg, fg));
        }
    }
}

/// Porter-Duff "over": result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
