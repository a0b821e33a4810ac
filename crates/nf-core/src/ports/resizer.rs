use crate::errors::ScalingError;
use crate::image::{ResizedImage, ScaleParams};

/// The resize primitive.
///
/// Takes the whole encoded source (random access is required) and returns the
/// encoded result, or `Ok(None)` when it declines to produce one. Malformed
/// input is reported as an error.
pub trait ImageResizerPort: Send + Sync {
    fn scale_image(
        &self,
        data: &[u8],
        params: &ScaleParams,
    ) -> Result<Option<ResizedImage>, ScalingError>;
}
