pub mod fs;
pub mod image;
pub mod scale_storage;

pub use fs::{FsBlob, FsBlobStore};
pub use image::{probe_image, ImageInfo, PixelResizer};
pub use scale_storage::{AnnotationScaleStorage, AnnotationScaleStorages};
