use crate::error::ItsError;
use crate::source::DecodedImage;

const PARAM: &str = "Blur Transform";

/// Gaussian blur; `blur=0` leaves the image untouched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blur {
    pub sigma: f32,
}

impl Blur {
    pub fn parse(raw: &str) -> Result<Self, ItsError> {
        if raw.trim().is_empty() {
            return Err(ItsError::invalid_param(PARAM, "blur requires a numeric radius"));
        }

        let sigma: f32 = raw.trim().parse().map_err(|_| {
            ItsError::invalid_param(PARAM, format!("'{}' is not a numeric radius", raw))
        })?;

        if !sigma.is_finite() || sigma < 0.0 {
            return Err(ItsError::invalid_param(
                PARAM,
                format!("radius {} must be zero or positive", raw),
            ));
        }

        Ok(Self { sigma })
    }

    pub fn apply(&self, image: DecodedImage) -> Result<DecodedImage, ItsError> {
        if self.sigma == 0.0 {
            return Ok(image);
        }

        tracing::debug!(sigma = self.sigma, "Blurring image");
        let blurred = image.image.blur(self.sigma);
        Ok(image.with_image(blurred))
    }
}
