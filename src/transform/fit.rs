//! Fit transform, shared by `fit`, `crop` and `focalcrop`
//!
//! The output is always exactly `W x H`: the largest source window with the
//! target aspect ratio is cut out around the effective focal point and
//! resampled to the box.
//!
//! Token counts select the focal mode:
//! - `WxH`: centre
//! - `WxHxFxxFy`: focal point in percent
//! - `WxHxX1xY1xX2xY2`: focal rectangle in percent
//!
//! A focal marker in the filename always wins over query percentages.

use super::geometry::{
    fit_window, parse_dimension, parse_percentage, split_tokens, FocalPoint, FocalRect,
};
use super::resample::resample;
use super::TransformSettings;
use crate::error::ItsError;
use crate::source::DecodedImage;

const PARAM: &str = "Fit Transform";

#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub width: u32,
    pub height: u32,
    pub focal: Option<FocalPoint>,
    pub rect: Option<FocalRect>,
}

impl Fit {
    pub fn parse(raw: &str, settings: &TransformSettings) -> Result<Self, ItsError> {
        let tokens = split_tokens(&settings.delimiters, raw);
        if !matches!(tokens.len(), 2 | 4 | 6) {
            return Err(ItsError::invalid_param(
                PARAM,
                "Fit takes WWxHH, WWxHHxFXxFY or WWxHHxX1xY1xX2xY2",
            ));
        }

        let width = required_dimension(tokens[0])?;
        let height = required_dimension(tokens[1])?;

        if width as u64 * height as u64 > settings.max_pixels {
            return Err(ItsError::TooBig {
                width: width as u64,
                height: height as u64,
            });
        }

        let percentages = tokens[2..]
            .iter()
            .map(|token| parse_percentage(token, PARAM))
            .collect::<Result<Vec<f64>, ItsError>>()?;

        let (focal, rect) = match percentages.as_slice() {
            [] => (None, None),
            [x, y] => (Some(FocalPoint::new(*x, *y)?), None),
            [x1, y1, x2, y2] => {
                let rect = FocalRect::new(FocalPoint::new(*x1, *y1)?, FocalPoint::new(*x2, *y2)?);
                (Some(rect.center()), Some(rect))
            }
            _ => {
                return Err(ItsError::invalid_param(
                    PARAM,
                    "focal arguments come in percentage pairs",
                ))
            }
        };

        Ok(Self {
            width,
            height,
            focal,
            rect,
        })
    }

    pub fn apply(
        &self,
        image: DecodedImage,
        settings: &TransformSettings,
    ) -> Result<DecodedImage, ItsError> {
        let source = image.dimensions();
        if source.0 == 0 || source.1 == 0 {
            return Err(ItsError::invalid_dimensions(
                source.0,
                source.1,
                "input image cannot have zero width nor zero height",
            ));
        }

        let marker = match image.filename() {
            Some(filename) => settings.filename_focal_point(filename)?,
            None => None,
        };

        // filename focus replaces every query-supplied focal hint
        let (focal, rect) = match marker {
            Some(point) => (point, None),
            None => (self.focal.unwrap_or(FocalPoint::CENTER), self.rect),
        };

        let window = fit_window(source, (self.width, self.height), focal, rect);
        tracing::debug!(
            focal_x = focal.x,
            focal_y = focal.y,
            from_filename = marker.is_some(),
            left = window.left,
            top = window.top,
            window_width = window.width,
            window_height = window.height,
            "Computed fit window"
        );

        let cropped = image
            .image
            .crop_imm(window.left, window.top, window.width, window.height);
        let fitted = if cropped.width() == self.width && cropped.height() == self.height {
            cropped
        } else {
            resample(&cropped, self.width, self.height)?
        };

        Ok(image.with_image(fitted))
    }
}

fn required_dimension(token: &str) -> Result<u32, ItsError> {
    match parse_dimension(token, PARAM)? {
        Some(value) if value > 0 => Ok(value),
        _ => Err(ItsError::invalid_param(
            PARAM,
            "width and height must both be greater than zero",
        )),
    }
}
