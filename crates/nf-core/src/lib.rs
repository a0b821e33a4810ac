//! # nf-core
//!
//! Core domain models and business logic for namedfile.
//!
//! This crate contains the image value types, the scale record model, the
//! binary ingestion strategies and the port traits implemented by the
//! infrastructure layer. It carries no image codec and no filesystem layout.

// Public module exports
pub mod blob;
pub mod config;
pub mod errors;
pub mod ids;
pub mod image;
pub mod ports;
pub mod storage;

// Re-export commonly used types at the crate root
pub use blob::MemoryBlob;
pub use config::ScalingConfig;
pub use errors::{ScalingError, StorageError};
pub use ids::ScaleId;
pub use image::{
    Direction, GeneratedScale, ImageData, ImageKind, MimeType, ModificationMarker, NamedImage,
    ResizedImage, ScaleKey, ScaleParams, ScaleRecord, ScaleRequest, SizeCatalog,
};
pub use storage::{FileChunk, FileUpload, NamedFileSource, SourcePayload};
