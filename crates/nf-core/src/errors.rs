use thiserror::Error;

/// Binary ingestion errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The ingestion strategy was handed a source of another shape.
    #[error("could not store data (not of {expected} type, got {actual})")]
    UnsupportedSource {
        expected: &'static str,
        actual: &'static str,
    },

    /// A writer is already open on the blob.
    #[error("blob is already open for writing")]
    AlreadyOpen,

    /// Reading the source or writing the sink failed.
    #[error("blob io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Scaling and serving errors.
///
/// `Conflict` and `Interrupted` come from the host store or the operator and
/// are never absorbed by the scaling layer. `Transform` is what a resize
/// primitive reports for undecodable or unsupported input.
#[derive(Debug, Error)]
pub enum ScalingError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("operation interrupted")]
    Interrupted,

    #[error("could not scale image: {0}")]
    Transform(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ScalingError {
    /// Errors that must cross every layer unchanged.
    pub fn must_propagate(&self) -> bool {
        matches!(self, ScalingError::Conflict(_) | ScalingError::Interrupted)
    }
}
