//! One ingestion strategy per source shape.
//!
//! Every strategy checks the variant before touching the blob, so a mismatch
//! fails with `UnsupportedSource` and leaves the sink unopened.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use super::payload::SourcePayload;
use crate::errors::StorageError;
use crate::ports::{write_blob, BlobPort, BlobWriter};

/// Block size for streamed copies.
pub const MAX_CHUNK_SIZE: usize = 1 << 16;

pub trait Storable: Send + Sync {
    /// Write `source` into `blob`. The source read position advances.
    fn store(&self, source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError>;
}

fn unsupported(expected: &'static str, source: &SourcePayload) -> StorageError {
    StorageError::UnsupportedSource {
        expected,
        actual: source.kind_name(),
    }
}

fn copy_blocks<R: Read + ?Sized>(reader: &mut R, writer: &mut dyn BlobWriter) -> io::Result<()> {
    let mut block = vec![0u8; MAX_CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut block) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        writer.write_all(&block[..read])?;
    }
}

pub struct BytesStorable;

impl BytesStorable {
    fn store_bytes(bytes: &[u8], blob: &dyn BlobPort) -> Result<(), StorageError> {
        write_blob(blob, |w| w.write_all(bytes))
    }
}

impl Storable for BytesStorable {
    fn store(&self, source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError> {
        let SourcePayload::Bytes(bytes) = source else {
            return Err(unsupported("bytes", source));
        };
        Self::store_bytes(bytes, blob)
    }
}

pub struct StringStorable;

impl Storable for StringStorable {
    fn store(&self, source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError> {
        let SourcePayload::Text(text) = source else {
            return Err(unsupported("text", source));
        };
        BytesStorable::store_bytes(text.as_bytes(), blob)
    }
}

pub struct FileChunkStorable;

impl Storable for FileChunkStorable {
    fn store(&self, source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError> {
        let SourcePayload::Chunks(head) = source else {
            return Err(unsupported("file chunk", source));
        };
        write_blob(blob, |w| {
            for chunk in head.iter() {
                w.write_all(chunk.data())?;
            }
            Ok(())
        })
    }
}

pub struct FileDescriptorStorable;

impl Storable for FileDescriptorStorable {
    fn store(&self, source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError> {
        let SourcePayload::File(file) = source else {
            return Err(unsupported("file", source));
        };
        if let Some(path) = file.path() {
            debug!(path = %path.display(), "adopting file into blob");
            return blob.consume_file(path);
        }
        let handle = file.file_mut();
        write_blob(blob, |w| copy_blocks(handle, w))
    }
}

pub struct FileUploadStorable;

impl Storable for FileUploadStorable {
    fn store(&self, source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError> {
        let SourcePayload::Upload(upload) = source else {
            return Err(unsupported("file upload", source));
        };
        let stream = upload.stream_mut();
        stream.seek(SeekFrom::Start(0))?;
        write_blob(blob, |w| copy_blocks(stream, w))
    }
}

/// The strategy declared for the variant of `source`.
pub fn storable_for(source: &SourcePayload) -> &'static dyn Storable {
    match source {
        SourcePayload::Bytes(_) => &BytesStorable,
        SourcePayload::Text(_) => &StringStorable,
        SourcePayload::Chunks(_) => &FileChunkStorable,
        SourcePayload::File(_) => &FileDescriptorStorable,
        SourcePayload::Upload(_) => &FileUploadStorable,
    }
}

/// Store any accepted source into `blob`.
pub fn store_payload(source: &mut SourcePayload, blob: &dyn BlobPort) -> Result<(), StorageError> {
    let storable = storable_for(source);
    storable.store(source, blob)
}
