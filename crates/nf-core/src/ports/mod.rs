//! Port interfaces for the application layer
//!
//! Ports define the contract between the scaling use cases and the
//! infrastructure or host implementations. The host object model, the
//! resize primitive and the scale cache all sit behind these traits so the
//! use cases stay independent of codecs and persistence.

mod blob;
mod content;
mod resizer;
mod scale_factory;
mod scale_storage;
mod utilities;

pub use blob::{read_blob, write_blob, BlobPort, BlobWriter};
pub use content::ImageContentPort;
pub use resizer::ImageResizerPort;
pub use scale_factory::ImageScaleFactoryPort;
pub use scale_storage::{ScaleAnnotation, ScaleStoragePort, ScaleStorageProviderPort};
pub use utilities::{AvailableSizesPort, ScaledImageQualityPort};
