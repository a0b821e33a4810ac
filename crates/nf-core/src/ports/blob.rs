//! Blob Port
//!
//! A blob is the write target of binary ingestion.
//!
//! **Semantic:** one writer per ingestion; bytes become visible on commit only.
//! A writer dropped without commit is closed and its bytes are discarded, so a
//! failed ingestion never leaves a half-written blob behind.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use crate::errors::StorageError;

/// An open write handle on a blob.
pub trait BlobWriter: Write {
    /// Flush and publish the written bytes, closing the handle.
    fn commit(self: Box<Self>) -> Result<(), StorageError>;
}

pub trait BlobPort: Send + Sync + fmt::Debug {
    /// Open the blob for writing. Fails with `AlreadyOpen` while another
    /// writer is live.
    fn open_write(&self) -> Result<Box<dyn BlobWriter + '_>, StorageError>;

    /// Adopt an existing file as the blob content.
    fn consume_file(&self, path: &Path) -> Result<(), StorageError>;

    /// Open the committed content for reading.
    fn open_read(&self) -> Result<Box<dyn Read + '_>, StorageError>;

    /// Size in bytes of the committed content.
    fn size(&self) -> Result<u64, StorageError>;
}

/// Run `write` against a freshly opened writer and commit on success.
///
/// On any error the writer is dropped before the error is returned, which
/// closes it without publishing.
pub fn write_blob<F>(blob: &dyn BlobPort, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut dyn BlobWriter) -> std::io::Result<()>,
{
    let mut writer = blob.open_write()?;
    write(writer.as_mut())?;
    writer.flush()?;
    writer.commit()
}

/// Read the full committed content of a blob.
pub fn read_blob(blob: &dyn BlobPort) -> Result<Vec<u8>, StorageError> {
    let mut reader = blob.open_read()?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}
