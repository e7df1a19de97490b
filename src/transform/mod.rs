//! Image transforms
//!
//! A static [`TransformRegistry`] maps query keys to [`TransformKind`]s.
//! Each kind parses its raw argument into a [`Transform`], which is applied
//! to a [`DecodedImage`]. Dispatch is by exact key; unknown keys are ignored
//! so new query parameters never break old deployments.
//!
//! Transforms run in a fixed priority order regardless of query order:
//!
//! ```text
//! crop → focalcrop → fit → resize → blur → overlay
//! ```

use regex::Regex;

use crate::config::TransformConfig;
use crate::error::ItsError;
use crate::query::RequestQuery;
use crate::source::DecodedImage;

pub mod blur;
pub mod fit;
pub mod geometry;
pub mod overlay;
pub mod resample;
pub mod resize;

pub use blur::Blur;
pub use fit::Fit;
pub use geometry::{FocalPoint, FocalRect, Window};
pub use overlay::{NoOverlays, Overlay, OverlaySource};
pub use resize::Resize;

/// Transform names known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Crop,
    FocalCrop,
    Fit,
    Resize,
    Blur,
    Overlay,
}

impl TransformKind {
    /// Dispatch order
    pub const PRIORITY: [TransformKind; 6] = [
        TransformKind::Crop,
        TransformKind::FocalCrop,
        TransformKind::Fit,
        TransformKind::Resize,
        TransformKind::Blur,
        TransformKind::Overlay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Crop => "crop",
            TransformKind::FocalCrop => "focalcrop",
            TransformKind::Fit => "fit",
            TransformKind::Resize => "resize",
            TransformKind::Blur => "blur",
            TransformKind::Overlay => "overlay",
        }
    }

    /// Position in [`Self::PRIORITY`]
    pub fn rank(&self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|kind| kind == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|kind| kind.name() == name)
    }

    /// Parse the raw query value for this transform
    ///
    /// `crop` and `focalcrop` share the fit grammar and framing.
    pub fn parse(&self, raw: &str, settings: &TransformSettings) -> Result<Transform, ItsError> {
        match self {
            TransformKind::Crop | TransformKind::FocalCrop | TransformKind::Fit => {
                Fit::parse(raw, settings).map(Transform::Fit)
            }
            TransformKind::Resize => Resize::parse(raw, settings).map(Transform::Resize),
            TransformKind::Blur => Blur::parse(raw).map(Transform::Blur),
            TransformKind::Overlay => Overlay::parse(raw).map(Transform::Overlay),
        }
    }
}

/// A parsed, validated transform ready to apply
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Resize(Resize),
    Fit(Fit),
    Blur(Blur),
    Overlay(Overlay),
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Resize(_) => "resize",
            Transform::Fit(_) => "fit",
            Transform::Blur(_) => "blur",
            Transform::Overlay(_) => "overlay",
        }
    }

    pub fn apply(
        &self,
        image: DecodedImage,
        ctx: &TransformContext<'_>,
    ) -> Result<DecodedImage, ItsError> {
        match self {
            Transform::Resize(resize) => resize.apply(image),
            Transform::Fit(fit) => fit.apply(image, ctx.settings),
            Transform::Blur(blur) => blur.apply(image),
            Transform::Overlay(overlay) => overlay.apply(image, ctx.overlays),
        }
    }
}

/// Compiled transform settings
#[derive(Debug, Clone)]
pub struct TransformSettings {
    /// Argument separator pattern
    pub delimiters: Regex,
    /// Matches `<keyword><x>x<y>` focal markers in filenames
    pub focus_marker: Regex,
    pub max_pixels: u64,
}

impl TransformSettings {
    pub fn from_config(config: &TransformConfig) -> Result<Self, ItsError> {
        let delimiters = Regex::new(&config.delimiters).map_err(|e| {
            ItsError::config(format!("Invalid delimiters '{}': {}", config.delimiters, e))
        })?;

        let marker = format!(
            r"{}(\d+(?:\.\d+)?)x(\d+(?:\.\d+)?)",
            regex::escape(&config.focus_keyword)
        );
        let focus_marker = Regex::new(&marker)
            .map_err(|e| ItsError::config(format!("Invalid focus keyword: {}", e)))?;

        Ok(Self {
            delimiters,
            focus_marker,
            max_pixels: config.max_pixels,
        })
    }

    /// Focal point embedded in a filename (`photo_focus-10x90.jpg`)
    pub fn filename_focal_point(&self, filename: &str) -> Result<Option<FocalPoint>, ItsError> {
        let Some(caps) = self.focus_marker.captures(filename) else {
            return Ok(None);
        };
        let x = geometry::parse_percentage(&caps[1], "focal point")?;
        let y = geometry::parse_percentage(&caps[2], "focal point")?;
        Ok(Some(FocalPoint { x, y }))
    }
}

/// Per-request state handed to [`Transform::apply`]
pub struct TransformContext<'a> {
    pub settings: &'a TransformSettings,
    pub overlays: &'a dyn OverlaySource,
}

/// Static name → transform table plus compiled settings
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    settings: TransformSettings,
}

impl TransformRegistry {
    pub fn new(config: &TransformConfig) -> Result<Self, ItsError> {
        Ok(Self {
            settings: TransformSettings::from_config(config)?,
        })
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Exact-name lookup
    pub fn lookup(&self, name: &str) -> Option<TransformKind> {
        TransformKind::from_name(name)
    }

    /// Parse every recognised transform in the query, in priority order
    ///
    /// All arguments are validated before any pixel is touched.
    pub fn plan(&self, query: &RequestQuery) -> Result<Vec<Transform>, ItsError> {
        let mut requested: Vec<(TransformKind, &str)> = query
            .iter()
            .filter_map(|(key, raw)| self.lookup(key).map(|kind| (kind, raw)))
            .collect();
        requested.sort_by_key(|(kind, _)| kind.rank());

        requested
            .into_iter()
            .map(|(kind, raw)| kind.parse(raw, &self.settings))
            .collect()
    }
}
