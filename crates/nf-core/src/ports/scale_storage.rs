use std::fmt;
use std::sync::{Arc, OnceLock};

use super::ImageContentPort;
use crate::errors::ScalingError;
use crate::ids::ScaleId;
use crate::image::{GeneratedScale, ModificationMarker, ScaleRecord, ScaleRequest};

/// Scale cache of one content object.
pub trait ScaleStoragePort: Send + Sync {
    /// Exact lookup by stable identifier.
    fn get(&self, uid: &ScaleId) -> Option<ScaleRecord>;

    /// Get-or-create.
    ///
    /// A stored record for the same key is returned while it is not older
    /// than `modified()`. Otherwise `create` runs and its result is stored.
    /// `modified` is only evaluated when freshness has to be decided or a new
    /// record stamped. `Ok(None)` from `create` is returned as a miss.
    fn scale(
        &self,
        request: &ScaleRequest,
        modified: &dyn Fn() -> ModificationMarker,
        create: &dyn Fn(&ScaleRequest) -> Result<Option<GeneratedScale>, ScalingError>,
    ) -> Result<Option<ScaleRecord>, ScalingError>;
}

/// Slot on a content object holding its scale cache.
/// 内容对象上的缩放缓存槽位。
///
/// The cache is created on first use and dropped together with the object, so
/// an object recreated at the same address starts with an empty cache.
#[derive(Default)]
pub struct ScaleAnnotation {
    storage: OnceLock<Arc<dyn ScaleStoragePort>>,
}

impl ScaleAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The attached cache, creating it with `init` if the slot is empty.
    /// 返回已挂载的缓存，槽位为空时用 `init` 创建。
    pub fn get_or_init(
        &self,
        init: impl FnOnce() -> Arc<dyn ScaleStoragePort>,
    ) -> Arc<dyn ScaleStoragePort> {
        self.storage.get_or_init(init).clone()
    }

    pub fn is_attached(&self) -> bool {
        self.storage.get().is_some()
    }
}

impl fmt::Debug for ScaleAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleAnnotation")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Hands out the scale cache belonging to a content object.
///
/// Two different objects never share a cache, even at the same address.
pub trait ScaleStorageProviderPort: Send + Sync {
    fn storage_for(&self, content: &dyn ImageContentPort) -> Arc<dyn ScaleStoragePort>;
}
