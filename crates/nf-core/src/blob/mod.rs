//! In-memory blob.
//! 内存 blob。

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use crate::errors::StorageError;
use crate::ports::{BlobPort, BlobWriter};

/// Blob kept entirely in memory.
/// 完全保存在内存中的 blob。
///
/// Used for derived scale payloads and in tests; filesystem backed blobs live
/// in the infrastructure crate.
#[derive(Debug, Default)]
pub struct MemoryBlob {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    committed: Bytes,
    writing: bool,
    opened: usize,
}

impl MemoryBlob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed bytes, cheap to clone.
    /// 已提交的字节，克隆开销低。
    pub fn bytes(&self) -> Bytes {
        self.lock().committed.clone()
    }

    /// How many times a writer was opened on this blob.
    pub fn open_count(&self) -> usize {
        self.lock().opened
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct MemoryBlobWriter<'a> {
    blob: &'a MemoryBlob,
    buffer: Vec<u8>,
    closed: bool,
}

impl Write for MemoryBlobWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl BlobWriter for MemoryBlobWriter<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        self.closed = true;
        let buffer = std::mem::take(&mut self.buffer);
        let blob = self.blob;
        let mut state = blob.lock();
        state.committed = Bytes::from(buffer);
        state.writing = false;
        Ok(())
    }
}

impl Drop for MemoryBlobWriter<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.blob.lock().writing = false;
        }
    }
}

impl BlobPort for MemoryBlob {
    fn open_write(&self) -> Result<Box<dyn BlobWriter + '_>, StorageError> {
        let mut state = self.lock();
        if state.writing {
            return Err(StorageError::AlreadyOpen);
        }
        state.writing = true;
        state.opened += 1;
        Ok(Box::new(MemoryBlobWriter {
            blob: self,
            buffer: Vec::new(),
            closed: false,
        }))
    }

    fn consume_file(&self, path: &Path) -> Result<(), StorageError> {
        let bytes = fs::read(path)?;
        let mut state = self.lock();
        if state.writing {
            return Err(StorageError::AlreadyOpen);
        }
        state.committed = Bytes::from(bytes);
        Ok(())
    }

    fn open_read(&self) -> Result<Box<dyn Read + '_>, StorageError> {
        Ok(Box::new(Cursor::new(self.bytes())))
    }

    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.lock().committed.len() as u64)
    }
}
