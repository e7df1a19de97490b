// Transform pipeline - turns a decoded source and a normalised query into
// encoded output bytes.
//
// Stages run strictly in order:
//   Decoded -> ColorNormalized -> Transformed(n) -> Optimized -> Encoded
//
// Every transform argument is parsed before any pixel work starts, so a bad
// parameter never costs a resample.

use std::fmt;

use crate::color;
use crate::config::TransformConfig;
use crate::error::ItsError;
use crate::optimizer::{self, EncodedImage};
use crate::query::RequestQuery;
use crate::source::DecodedImage;
use crate::transform::{OverlaySource, TransformContext, TransformRegistry};

/// Where a request currently is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Decoded,
    ColorNormalized,
    /// Number of transforms applied so far
    Transformed(usize),
    Optimized,
    Encoded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Decoded => write!(f, "decoded"),
            PipelineStage::ColorNormalized => write!(f, "color_normalized"),
            PipelineStage::Transformed(n) => write!(f, "transformed({})", n),
            PipelineStage::Optimized => write!(f, "optimized"),
            PipelineStage::Encoded => write!(f, "encoded"),
        }
    }
}

/// Immutable pipeline shared by all requests
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    registry: TransformRegistry,
    config: TransformConfig,
}

impl TransformPipeline {
    pub fn new(config: &TransformConfig) -> Result<Self, ItsError> {
        Ok(Self {
            registry: TransformRegistry::new(config)?,
            config: config.clone(),
        })
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Run one request through every stage
    pub fn process(
        &self,
        image: DecodedImage,
        query: &RequestQuery,
        overlays: &dyn OverlaySource,
    ) -> Result<EncodedImage, ItsError> {
        let (width, height) = image.dimensions();
        trace_stage(PipelineStage::Decoded, width, height);

        let plan = self.registry.plan(query)?;

        let mut image = normalize_color(image);
        trace_stage(PipelineStage::ColorNormalized, image.width(), image.height());

        let ctx = TransformContext {
            settings: self.registry.settings(),
            overlays,
        };
        for (applied, transform) in plan.iter().enumerate() {
            image = transform.apply(image, &ctx)?;
            tracing::debug!(transform = transform.name(), "Applied transform");
            trace_stage(
                PipelineStage::Transformed(applied + 1),
                image.width(),
                image.height(),
            );
        }

        trace_stage(PipelineStage::Optimized, image.width(), image.height());
        let encoded = optimizer::optimize(&image, query, &self.config)?;

        tracing::debug!(
            stage = %PipelineStage::Encoded,
            content_type = encoded.content_type,
            bytes = encoded.data.len(),
            "Pipeline stage"
        );
        Ok(encoded)
    }
}

/// Convert to sRGB; a broken profile is logged and dropped, never fatal
fn normalize_color(mut image: DecodedImage) -> DecodedImage {
    if let Err(e) = color::normalize(&mut image) {
        tracing::warn!(
            error = %e,
            filename = image.filename().unwrap_or("-"),
            "Colour normalisation failed, continuing with original pixels"
        );
        image.icc_profile = None;
    }
    image
}

fn trace_stage(stage: PipelineStage, width: u32, height: u32) {
    tracing::debug!(stage = %stage, width, height, "Pipeline stage");
}
