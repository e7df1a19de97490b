use super::geometry::{apply_no_scale_up, parse_dimension, resize_target, split_tokens};
use super::resample::resample;
use super::TransformSettings;
use crate::error::ItsError;
use crate::source::DecodedImage;

const PARAM: &str = "Resize Transform";
const NO_SCALE_UP: &str = "no-scale-up";

/// Aspect-preserving resize: `WxH`, `Wx` or `xH`, optionally `,no-scale-up`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resize {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub no_scale_up: bool,
    max_pixels: u64,
}

impl Resize {
    pub fn parse(raw: &str, settings: &TransformSettings) -> Result<Self, ItsError> {
        let tokens = split_tokens(&settings.delimiters, raw);
        let (width, height, option) = match tokens.as_slice() {
            [width, height] => (*width, *height, ""),
            [width, height, option] => (*width, *height, *option),
            _ => {
                return Err(ItsError::invalid_param(
                    PARAM,
                    "Missing width or height. Both width and height are required",
                ))
            }
        };

        let width = parse_dimension(width, PARAM)?;
        let height = parse_dimension(height, PARAM)?;

        if width.is_none() && height.is_none() {
            return Err(ItsError::invalid_param(
                PARAM,
                "Resize takes WWxHH, WWx, or xHH, where WW is the requested width and \
                 HH is the requested height",
            ));
        }

        if let (Some(w), Some(h)) = (width, height) {
            if w as u64 * h as u64 > settings.max_pixels {
                return Err(ItsError::TooBig {
                    width: w as u64,
                    height: h as u64,
                });
            }
        }

        Ok(Self {
            width,
            height,
            no_scale_up: option == NO_SCALE_UP,
            max_pixels: settings.max_pixels,
        })
    }

    pub fn apply(&self, image: DecodedImage) -> Result<DecodedImage, ItsError> {
        let source = image.dimensions();
        let mut target = resize_target(source, self.width, self.height, self.max_pixels)?;

        if self.no_scale_up {
            target = apply_no_scale_up(source, target);
        }

        if target == source {
            tracing::debug!(width = source.0, height = source.1, "Resize keeps source size");
            return Ok(image);
        }

        let resized = resample(&image.image, target.0, target.1)?;
        tracing::debug!(
            from_width = source.0,
            from_height = source.1,
            to_width = target.0,
            to_height = target.1,
            "Resized image"
        );
        Ok(image.with_image(resized))
    }
}
