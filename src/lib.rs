//! namedfile
//!
//! Image scale derivation and caching for named image fields, plus the
//! bootstrap used by the command line tool.

pub mod bootstrap;
pub mod document;

pub use document::FileDocument;
