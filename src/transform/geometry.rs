//! Geometry math shared by the resize and fit transforms
//!
//! Everything here is pure arithmetic on dimensions and percentages; no
//! pixels are touched.

use regex::Regex;

use crate::error::ItsError;

/// A focal point in percent of the source width and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

impl FocalPoint {
    pub const CENTER: FocalPoint = FocalPoint { x: 50.0, y: 50.0 };

    /// Build a focal point, rejecting percentages outside [0, 100]
    pub fn new(x: f64, y: f64) -> Result<Self, ItsError> {
        if !(0.0..=100.0).contains(&x) || !(0.0..=100.0).contains(&y) {
            return Err(ItsError::invalid_param(
                "Fit Transform",
                format!(
                    "focal point {}x{} is outside the 0-100 percent range",
                    x, y
                ),
            ));
        }
        Ok(Self { x, y })
    }
}

/// A focal emphasis rectangle in percent, normalised so `x1 <= x2`, `y1 <= y2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl FocalRect {
    pub fn new(first: FocalPoint, second: FocalPoint) -> Self {
        Self {
            x1: first.x.min(second.x),
            y1: first.y.min(second.y),
            x2: first.x.max(second.x),
            y2: first.y.max(second.y),
        }
    }

    pub fn center(&self) -> FocalPoint {
        FocalPoint {
            x: (self.x1 + self.x2) / 2.0,
            y: (self.y1 + self.y2) / 2.0,
        }
    }
}

/// Source region selected for a fit, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Split a transform argument on the delimiter pattern
pub fn split_tokens<'a>(delimiters: &Regex, raw: &'a str) -> Vec<&'a str> {
    delimiters.split(raw).collect()
}

/// Parse an optional dimension token: empty means "not given"
pub fn parse_dimension(token: &str, param: &str) -> Result<Option<u32>, ItsError> {
    if token.is_empty() {
        return Ok(None);
    }
    token.parse::<u32>().map(Some).map_err(|_| {
        ItsError::invalid_param(
            param,
            format!(
                "'{}' is not a whole number. Use WWxHH, WWx or xHH where WW is the \
                 requested width and HH the requested height",
                token
            ),
        )
    })
}

/// Parse a percentage token in [0, 100]
pub fn parse_percentage(token: &str, param: &str) -> Result<f64, ItsError> {
    let value: f64 = token.parse().map_err(|_| {
        ItsError::invalid_param(param, format!("'{}' is not a number", token))
    })?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ItsError::invalid_param(
            param,
            format!("focal percentage {} must be between 0 and 100", token),
        ));
    }
    Ok(value)
}

/// Target dimensions for a resize request
///
/// One missing dimension is derived from the source aspect ratio (floored).
/// With both given the source is scaled to fit inside the box, never below
/// one pixel.
pub fn resize_target(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    max_pixels: u64,
) -> Result<(u32, u32), ItsError> {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return Err(ItsError::invalid_dimensions(
            src_w,
            src_h,
            "input image cannot have zero width nor zero height",
        ));
    }

    let (target_w, target_h) = match (width, height) {
        (None, None) => {
            return Err(ItsError::invalid_param(
                "Resize Transform",
                "Resize takes WWxHH, WWx, or xHH, where WW is the requested width and \
                 HH is the requested height",
            ))
        }
        (Some(w), None) => {
            let h = (src_h as f64 / src_w as f64 * w as f64).floor() as u64;
            (w as u64, h)
        }
        (None, Some(h)) => {
            let w = (src_w as f64 / src_h as f64 * h as f64).floor() as u64;
            (w, h as u64)
        }
        (Some(w), Some(h)) => {
            if (w as u64).saturating_mul(h as u64) > max_pixels {
                return Err(ItsError::TooBig {
                    width: w as u64,
                    height: h as u64,
                });
            }
            let ratio = (w as f64 / src_w as f64).min(h as f64 / src_h as f64);
            let tw = ((src_w as f64 * ratio).floor() as u64).max(1);
            let th = ((src_h as f64 * ratio).floor() as u64).max(1);
            (tw, th)
        }
    };

    if target_w == 0 || target_h == 0 {
        return Err(ItsError::invalid_dimensions(
            target_w.min(u32::MAX as u64) as u32,
            target_h.min(u32::MAX as u64) as u32,
            "resize would produce an empty image",
        ));
    }

    if target_w.saturating_mul(target_h) > max_pixels {
        return Err(ItsError::TooBig {
            width: target_w,
            height: target_h,
        });
    }

    Ok((target_w as u32, target_h as u32))
}

/// Apply the `no-scale-up` policy: any upscaled axis means "keep the source"
pub fn apply_no_scale_up(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    if target.0 > source.0 || target.1 > source.1 {
        source
    } else {
        target
    }
}

/// Largest source window with the target aspect ratio, placed by focal point
///
/// The window's offset is the free space times the focal percentage, so 0
/// hugs the top/left edge and 100 the bottom/right edge. With a focal
/// rectangle the window is then shifted, as far as the source allows, so it
/// contains the whole rectangle.
pub fn fit_window(
    source: (u32, u32),
    target: (u32, u32),
    focal: FocalPoint,
    rect: Option<FocalRect>,
) -> Window {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);
    let target_ratio = target.0 as f64 / target.1 as f64;
    let source_ratio = src_w / src_h;

    let (win_w, win_h) = if source_ratio > target_ratio {
        ((src_h * target_ratio).round(), src_h)
    } else {
        (src_w, (src_w / target_ratio).round())
    };
    let win_w = win_w.clamp(1.0, src_w);
    let win_h = win_h.clamp(1.0, src_h);

    let mut left = ((src_w - win_w) * focal.x / 100.0).floor();
    let mut top = ((src_h - win_h) * focal.y / 100.0).floor();

    if let Some(rect) = rect {
        left = contain_span(left, win_w, src_w * rect.x1 / 100.0, src_w * rect.x2 / 100.0);
        top = contain_span(top, win_h, src_h * rect.y1 / 100.0, src_h * rect.y2 / 100.0);
    }

    Window {
        left: left.clamp(0.0, src_w - win_w) as u32,
        top: top.clamp(0.0, src_h - win_h) as u32,
        width: win_w as u32,
        height: win_h as u32,
    }
}

/// Shift a window start so `[start, start + size]` covers `[lo, hi]` when it fits
fn contain_span(start: f64, size: f64, lo: f64, hi: f64) -> f64 {
    if hi - lo > size {
        // rectangle wider than the window: centre on it instead
        return ((lo + hi) / 2.0 - size / 2.0).floor();
    }
    if start > lo {
        lo.floor()
    } else if start + size < hi {
        (hi - size).ceil()
    } else {
        start
    }
}
