//! Image scaling use cases.

mod factory;
mod image_scale;
mod utilities;
mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use factory::ImageScaleFactory;
pub use image_scale::{quote_attr, AttrValue, ImageScale, ScaleResponse, TagOptions};
pub use utilities::ScalingUtilities;
pub use view::{ImageScaling, ScaleQuery, ScalingDeps};
