mod probe;
mod resizer;

pub use probe::{named_image_from_payload, probe_image, ImageInfo};
pub use resizer::PixelResizer;
