use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Stable identifier of a generated scale.
///
/// Assigned once when the scale record is created and never reused, so an
/// address built from it keeps pointing at the same bytes even after the
/// source field changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaleId(String);

impl_id!(ScaleId);

impl ScaleId {
    /// Whether a traversal name has the shape of a stable identifier.
    ///
    /// Field names never contain a dash, generated identifiers always do.
    pub fn looks_like_uid(name: &str) -> bool {
        name.contains('-')
    }
}
