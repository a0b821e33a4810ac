use super::ScaleAnnotation;
use crate::image::NamedImage;

/// The host content object owning image fields.
pub trait ImageContentPort: Send + Sync {
    /// Current value of a named field, `None` when unset or unknown.
    fn field(&self, name: &str) -> Option<NamedImage>;

    /// Name of the designated primary image field, if the object has one.
    fn primary_field_name(&self) -> Option<String>;

    /// Display title.
    fn title(&self) -> String;

    /// Low-level modification timestamp in epoch milliseconds.
    fn modified_ms(&self) -> i64;

    /// Public address of the object, without trailing slash.
    fn absolute_url(&self) -> String;

    /// Slot carrying this object's scale cache.
    ///
    /// Each object owns its own slot; the address is not an identity.
    fn scale_annotation(&self) -> &ScaleAnnotation;
}
