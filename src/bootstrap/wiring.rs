//! # Dependency wiring
//!
//! The only place that depends on `nf-infra` and `nf-app` together. It
//! assembles; decisions stay in the use cases.

use std::sync::Arc;

use nf_app::{ImageScaleFactory, ImageScaling, ScalingDeps, ScalingUtilities};
use nf_core::ports::ImageContentPort;
use nf_core::{Direction, ScalingConfig, SizeCatalog};
use nf_infra::{AnnotationScaleStorages, PixelResizer};

/// Assembled scaling components, shared by every view.
pub struct ScalingRuntime {
    pub deps: ScalingDeps,
    pub default_sizes: SizeCatalog,
    pub default_direction: Direction,
}

impl ScalingRuntime {
    /// Serving view for one content object.
    pub fn view(&self, content: Arc<dyn ImageContentPort>) -> ImageScaling {
        ImageScaling::new(content, self.deps.clone(), self.default_sizes.clone())
            .with_default_direction(self.default_direction)
    }

    pub fn utilities(&self) -> &Arc<ScalingUtilities> {
        &self.deps.utilities
    }
}

/// Build the scaling components from configuration.
///
/// A configured quality is registered as the site-wide quality utility.
pub fn wire_scaling(config: &ScalingConfig) -> ScalingRuntime {
    let utilities = Arc::new(ScalingUtilities::new());
    if let Some(quality) = config.scaling.quality {
        utilities.register_quality(Arc::new(move || Some(quality)));
    }

    let resizer = Arc::new(PixelResizer::new(config.resizer.jpeg_quality));
    let deps = ScalingDeps {
        factory: Arc::new(ImageScaleFactory::new(resizer, utilities.clone())),
        storages: Arc::new(AnnotationScaleStorages::new(config.cache.max_records)),
        utilities,
    };

    ScalingRuntime {
        deps,
        default_sizes: config.scaling.sizes.clone(),
        default_direction: config.scaling.default_direction,
    }
}
