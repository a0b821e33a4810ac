use std::sync::{Arc, RwLock};

use nf_core::ports::{AvailableSizesPort, ScaledImageQualityPort};
use nf_core::SizeCatalog;

/// Registry of optional site-wide scaling utilities.
/// 可选的全站缩放工具注册表。
///
/// Lookups happen on every call, so registering or unregistering takes
/// effect for the next request without rebuilding the view.
#[derive(Default)]
pub struct ScalingUtilities {
    quality: RwLock<Option<Arc<dyn ScaledImageQualityPort>>>,
    sizes: RwLock<Option<Arc<dyn AvailableSizesPort>>>,
}

impl ScalingUtilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_quality(&self, utility: Arc<dyn ScaledImageQualityPort>) {
        *self.quality.write().unwrap_or_else(|e| e.into_inner()) = Some(utility);
    }

    pub fn unregister_quality(&self) {
        *self.quality.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn register_available_sizes(&self, utility: Arc<dyn AvailableSizesPort>) {
        *self.sizes.write().unwrap_or_else(|e| e.into_inner()) = Some(utility);
    }

    pub fn unregister_available_sizes(&self) {
        *self.sizes.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Quality from the registered utility, if any.
    /// 已注册工具提供的质量参数。
    pub fn quality(&self) -> Option<u8> {
        let utility = self.quality.read().unwrap_or_else(|e| e.into_inner()).clone();
        utility.and_then(|u| u.quality())
    }

    /// Size catalog from the registered utility; `None` when unregistered,
    /// unset or empty.
    pub fn available_sizes(&self) -> Option<SizeCatalog> {
        let utility = self.sizes.read().unwrap_or_else(|e| e.into_inner()).clone();
        utility
            .and_then(|u| u.available_sizes())
            .filter(|sizes| !sizes.is_empty())
    }
}
