//! # nf-app
//!
//! Scaling use cases: the scale factory, the scale value with tag and
//! response rendering, and the serving view that resolves names and sizes.

pub mod scaling;

pub use scaling::{
    AttrValue, ImageScale, ImageScaleFactory, ImageScaling, ScaleQuery, ScaleResponse,
    ScalingDeps, ScalingUtilities, TagOptions,
};
