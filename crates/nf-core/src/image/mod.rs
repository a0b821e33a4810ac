//! Image values and scale records.
mod mime;
mod named_image;
mod scale;

pub use mime::MimeType;
pub use named_image::{ImageData, ImageKind, NamedImage};
pub use scale::{
    Direction, GeneratedScale, ModificationMarker, ResizedImage, ScaleKey, ScaleParams,
    ScaleRecord, ScaleRequest, SizeCatalog,
};
