use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use crate::image::MimeType;

/// One link of a chunk chain. The chain is terminated by `next == None`.
/// 分块链中的一个节点，以 `next == None` 结尾。
pub struct FileChunk {
    data: Vec<u8>,
    next: Option<Box<FileChunk>>,
}

impl FileChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, next: None }
    }

    /// Build a chain from chunks in order. `None` when there are no chunks.
    pub fn from_chunks<I>(chunks: I) -> Option<FileChunk>
    where
        I: IntoIterator<Item = Vec<u8>>,
        I::IntoIter: DoubleEndedIterator,
    {
        chunks.into_iter().rev().fold(None, |next, data| {
            Some(FileChunk {
                data,
                next: next.map(Box::new),
            })
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn next(&self) -> Option<&FileChunk> {
        self.next.as_deref()
    }

    pub fn iter(&self) -> FileChunkIter<'_> {
        FileChunkIter {
            current: Some(self),
        }
    }

    /// Total payload length across the chain.
    pub fn total_len(&self) -> usize {
        self.iter().map(|chunk| chunk.data.len()).sum()
    }

    /// Concatenate the chain into one buffer.
    pub fn materialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_len());
        for chunk in self.iter() {
            bytes.extend_from_slice(&chunk.data);
        }
        bytes
    }
}

// Unlink iteratively; the default recursive drop overflows the stack on long chains.
impl Drop for FileChunk {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut chunk) = next {
            next = chunk.next.take();
        }
    }
}

impl fmt::Debug for FileChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileChunk")
            .field("chunks", &self.iter().count())
            .field("total_len", &self.total_len())
            .finish()
    }
}

pub struct FileChunkIter<'a> {
    current: Option<&'a FileChunk>,
}

impl<'a> Iterator for FileChunkIter<'a> {
    type Item = &'a FileChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.current?;
        self.current = chunk.next.as_deref();
        Some(chunk)
    }
}

/// An open file, optionally with the filesystem path it was opened from.
#[derive(Debug)]
pub struct NamedFileSource {
    file: File,
    path: Option<PathBuf>,
}

impl NamedFileSource {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        Ok(Self {
            file,
            path: Some(path),
        })
    }

    /// A handle whose path is not known.
    pub fn from_file(file: File) -> Self {
        Self { file, path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// A streaming upload read in bounded blocks.
/// 按固定大小分块读取的流式上传。
pub struct FileUpload {
    stream: Box<dyn ReadSeek>,
    pub filename: Option<String>,
    pub content_type: Option<MimeType>,
}

impl FileUpload {
    pub fn new(stream: impl ReadSeek + 'static) -> Self {
        Self {
            stream: Box::new(stream),
            filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: MimeType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn stream_mut(&mut self) -> &mut dyn ReadSeek {
        self.stream.as_mut()
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Source representations accepted by ingestion. Exactly one is active per call.
/// 导入时接受的源数据形式，每次调用只使用其中一种。
#[derive(Debug)]
pub enum SourcePayload {
    Bytes(Vec<u8>),
    /// Stored as UTF-8.
    Text(String),
    Chunks(FileChunk),
    File(NamedFileSource),
    Upload(FileUpload),
}

impl SourcePayload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SourcePayload::Bytes(_) => "bytes",
            SourcePayload::Text(_) => "text",
            SourcePayload::Chunks(_) => "file chunk",
            SourcePayload::File(_) => "file",
            SourcePayload::Upload(_) => "file upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_iterates_in_order() {
        let chain = FileChunk::from_chunks(vec![b"ab".to_vec(), b"cd".to_vec(), b"e".to_vec()])
            .unwrap();
        let parts: Vec<&[u8]> = chain.iter().map(FileChunk::data).collect();
        assert_eq!(parts, vec![&b"ab"[..], &b"cd"[..], &b"e"[..]]);
        assert_eq!(chain.total_len(), 5);
        assert_eq!(chain.materialize(), b"abcde");
    }

    #[test]
    fn test_empty_chain_is_none() {
        assert!(FileChunk::from_chunks(Vec::<Vec<u8>>::new()).is_none());
    }

    #[test]
    fn test_long_chain_drops_without_overflow() {
        let chain = FileChunk::from_chunks((0..200_000).map(|_| vec![0u8])).unwrap();
        assert_eq!(chain.total_len(), 200_000);
        drop(chain);
    }
}
