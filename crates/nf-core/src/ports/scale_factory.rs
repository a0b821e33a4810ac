use super::ImageContentPort;
use crate::errors::ScalingError;
use crate::image::{GeneratedScale, ScaleRequest};

/// Produces scale payloads for a content object's fields.
pub trait ImageScaleFactoryPort: Send + Sync {
    /// `Ok(None)` when no scale can be produced.
    fn create(
        &self,
        content: &dyn ImageContentPort,
        request: &ScaleRequest,
    ) -> Result<Option<GeneratedScale>, ScalingError>;
}
