//! Binary ingestion: turning the accepted source shapes into one blob write.
mod payload;
mod storables;

pub use payload::{FileChunk, FileChunkIter, FileUpload, NamedFileSource, ReadSeek, SourcePayload};
pub use storables::{
    storable_for, store_payload, BytesStorable, FileChunkStorable, FileDescriptorStorable,
    FileUploadStorable, Storable, StringStorable, MAX_CHUNK_SIZE,
};
