use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::MimeType;
use crate::blob::MemoryBlob;
use crate::errors::StorageError;
use crate::ports::{read_blob, BlobPort};
use crate::storage::{store_payload, FileChunk, SourcePayload};

/// Where the bytes of a field value live.
#[derive(Clone)]
pub enum ImageData {
    /// Contiguous bytes held by the value.
    Inline(Bytes),
    /// Large payload split into a chain of chunks.
    Chunked(Arc<FileChunk>),
    /// Payload stored in a blob, read through its open capability.
    Blob(Arc<dyn BlobPort>),
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageData::Inline(bytes) => write!(f, "Inline({} bytes)", bytes.len()),
            ImageData::Chunked(chunk) => write!(f, "Chunked({} bytes)", chunk.total_len()),
            ImageData::Blob(blob) => write!(f, "Blob({blob:?})"),
        }
    }
}

/// Concrete kind of a field value; derived scales keep the kind of their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Inline,
    Blob,
}

/// An image field value with filename, content type and pixel size.
#[derive(Debug, Clone)]
pub struct NamedImage {
    data: ImageData,
    content_type: MimeType,
    filename: Option<String>,
    width: u32,
    height: u32,
    fieldname: Option<String>,
}

impl NamedImage {
    pub fn new(
        data: ImageData,
        content_type: MimeType,
        filename: Option<String>,
        (width, height): (u32, u32),
    ) -> Self {
        Self {
            data,
            content_type,
            filename,
            width,
            height,
            fieldname: None,
        }
    }

    pub fn inline(
        bytes: impl Into<Bytes>,
        content_type: MimeType,
        filename: Option<String>,
        dimensions: (u32, u32),
    ) -> Self {
        Self::new(ImageData::Inline(bytes.into()), content_type, filename, dimensions)
    }

    /// Tag the value with the field it was derived from.
    pub fn with_fieldname(mut self, fieldname: impl Into<String>) -> Self {
        self.fieldname = Some(fieldname.into());
        self
    }

    pub fn kind(&self) -> ImageKind {
        match self.data {
            ImageData::Blob(_) => ImageKind::Blob,
            ImageData::Inline(_) | ImageData::Chunked(_) => ImageKind::Inline,
        }
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    pub fn content_type(&self) -> &MimeType {
        &self.content_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn fieldname(&self) -> Option<&str> {
        self.fieldname.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Payload size in bytes.
    pub fn size(&self) -> Result<u64, StorageError> {
        match &self.data {
            ImageData::Inline(bytes) => Ok(bytes.len() as u64),
            ImageData::Chunked(chunk) => Ok(chunk.total_len() as u64),
            ImageData::Blob(blob) => blob.size(),
        }
    }

    /// Contiguous copy of the payload whatever its storage.
    pub fn read_bytes(&self) -> Result<Bytes, StorageError> {
        match &self.data {
            ImageData::Inline(bytes) => Ok(bytes.clone()),
            ImageData::Chunked(chunk) => Ok(Bytes::from(chunk.materialize())),
            ImageData::Blob(blob) => Ok(Bytes::from(read_blob(blob.as_ref())?)),
        }
    }

    /// New value of the same kind holding `bytes`.
    ///
    /// The filename is carried over; blob kind values get a fresh in-memory
    /// blob filled through the bytes ingestion strategy.
    pub fn derive(
        &self,
        bytes: Bytes,
        content_type: MimeType,
        dimensions: (u32, u32),
    ) -> Result<NamedImage, StorageError> {
        let data = match self.kind() {
            ImageKind::Inline => ImageData::Inline(bytes),
            ImageKind::Blob => {
                let blob = MemoryBlob::new();
                store_payload(&mut SourcePayload::Bytes(bytes.to_vec()), &blob)?;
                ImageData::Blob(Arc::new(blob))
            }
        };
        Ok(NamedImage::new(
            data,
            content_type,
            self.filename.clone(),
            dimensions,
        ))
    }
}
