use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use nf_core::ports::{BlobPort, BlobWriter};
use nf_core::StorageError;
use tempfile::NamedTempFile;
use tracing::{debug, debug_span};

const BLOBS_DIR: &str = "blobs";
const BLOB_DATA_FILE_NAME: &str = "data.bin";

/// Creates and reopens filesystem blobs under `<root>/blobs/<blob_id>/`.
/// 在 `<root>/blobs/<blob_id>/` 下创建和重新打开文件系统 blob。
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a new FsBlobStore rooted at the given filesystem path.
    ///
    /// Blobs are stored as `<root>/blobs/<blob_id>/data.bin`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Allocate an empty blob with a fresh UUID.
    /// 分配一个带新 UUID 的空 blob。
    pub fn create(&self) -> Result<FsBlob> {
        let blob_id = uuid::Uuid::new_v4().to_string();
        let dir = self.root.join(BLOBS_DIR).join(&blob_id);
        fs::create_dir_all(&dir)?;
        Ok(FsBlob {
            blob_id,
            path: dir.join(BLOB_DATA_FILE_NAME),
            writing: AtomicBool::new(false),
        })
    }

    /// Reopen an existing blob by id.
    /// 按 id 重新打开已有 blob。
    pub fn open(&self, blob_id: &str) -> Result<FsBlob> {
        validate_blob_id(blob_id)?;
        let path = self
            .root
            .join(BLOBS_DIR)
            .join(blob_id)
            .join(BLOB_DATA_FILE_NAME);
        if !path.exists() {
            anyhow::bail!("blob {blob_id} does not exist");
        }
        Ok(FsBlob {
            blob_id: blob_id.to_string(),
            path,
            writing: AtomicBool::new(false),
        })
    }

    /// Remove the blob directory and all its contents.
    /// 删除 blob 目录及其全部内容。
    pub fn delete(&self, blob_id: &str) -> Result<()> {
        validate_blob_id(blob_id)?;
        fs::remove_dir_all(self.root.join(BLOBS_DIR).join(blob_id))?;
        Ok(())
    }
}

fn validate_blob_id(blob_id: &str) -> Result<()> {
    uuid::Uuid::parse_str(blob_id)?;
    Ok(())
}

/// A blob stored as one file.
/// 以单个文件存储的 blob。
///
/// Writers go to a temporary file next to the data file and are renamed over
/// it on commit, so readers only ever see complete content.
pub struct FsBlob {
    blob_id: String,
    path: PathBuf,
    writing: AtomicBool,
}

impl FsBlob {
    pub fn blob_id(&self) -> &str {
        &self.blob_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl fmt::Debug for FsBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsBlob")
            .field("blob_id", &self.blob_id)
            .finish()
    }
}

struct FsBlobWriter<'a> {
    blob: &'a FsBlob,
    file: Option<BufWriter<NamedTempFile>>,
}

impl FsBlobWriter<'_> {
    fn file(&mut self) -> io::Result<&mut BufWriter<NamedTempFile>> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "blob writer is closed"))
    }
}

impl Write for FsBlobWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file()?.flush()
    }
}

impl BlobWriter for FsBlobWriter<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        let file = self.file.take().ok_or(StorageError::AlreadyOpen)?;
        let temp = file.into_inner().map_err(|err| err.into_error())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.blob.path).map_err(|err| err.error)?;
        Ok(())
    }
}

// Closes the writer; an uncommitted temporary file is removed with it.
impl Drop for FsBlobWriter<'_> {
    fn drop(&mut self) {
        self.file = None;
        self.blob.writing.store(false, Ordering::Release);
    }
}

impl BlobPort for FsBlob {
    fn open_write(&self) -> Result<Box<dyn BlobWriter + '_>, StorageError> {
        if self
            .writing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(StorageError::AlreadyOpen);
        }
        let temp = match NamedTempFile::new_in(self.dir()) {
            Ok(temp) => temp,
            Err(err) => {
                self.writing.store(false, Ordering::Release);
                return Err(err.into());
            }
        };
        Ok(Box::new(FsBlobWriter {
            blob: self,
            file: Some(BufWriter::new(temp)),
        }))
    }

    fn consume_file(&self, path: &Path) -> Result<(), StorageError> {
        let span = debug_span!("infra.fs.blob.consume_file", blob_id = %self.blob_id);
        let _enter = span.enter();
        if self.writing.load(Ordering::Acquire) {
            return Err(StorageError::AlreadyOpen);
        }
        match fs::rename(path, &self.path) {
            Ok(()) => Ok(()),
            Err(err) => {
                // rename fails across filesystems; fall back to a copy
                debug!(error = %err, "rename failed, copying file into blob");
                let mut source = fs::File::open(path)?;
                let mut temp = NamedTempFile::new_in(self.dir())?;
                io::copy(&mut source, &mut temp)?;
                temp.persist(&self.path).map_err(|err| err.error)?;
                Ok(())
            }
        }
    }

    fn open_read(&self) -> Result<Box<dyn Read + '_>, StorageError> {
        match fs::File::open(&self.path) {
            Ok(file) => Ok(Box::new(io::BufReader::new(file))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Box::new(io::empty())),
            Err(err) => Err(err.into()),
        }
    }

    fn size(&self) -> Result<u64, StorageError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::ports::{read_blob, write_blob};
    use nf_core::storage::{store_payload, NamedFileSource};
    use nf_core::SourcePayload;

    #[test]
    fn test_write_commit_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        let blob = store.create().unwrap();

        write_blob(&blob, |w| w.write_all(b"image bytes")).unwrap();

        let reopened = store.open(blob.blob_id()).unwrap();
        assert_eq!(read_blob(&reopened).unwrap(), b"image bytes");
        assert_eq!(reopened.size().unwrap(), 11);
    }

    #[test]
    fn test_failed_write_leaves_no_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        let blob = store.create().unwrap();

        let result = write_blob(&blob, |w| {
            w.write_all(b"half")?;
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "upload cut off"))
        });

        assert!(result.is_err());
        assert!(!blob.path().exists());
        assert_eq!(blob.size().unwrap(), 0);
        // the temporary file is gone too
        assert_eq!(fs::read_dir(blob.dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_ingestion_moves_file_into_blob() {
        let dir = tempfile::tempdir().unwrap();
        let upload_path = dir.path().join("upload.tmp");
        fs::write(&upload_path, b"uploaded").unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        let blob = store.create().unwrap();

        let source = NamedFileSource::open(&upload_path).unwrap();
        store_payload(&mut SourcePayload::File(source), &blob).unwrap();

        assert_eq!(read_blob(&blob).unwrap(), b"uploaded");
        assert!(!upload_path.exists());
    }

    #[test]
    fn test_second_writer_is_rejected_until_first_closes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        let blob = store.create().unwrap();

        let writer = blob.open_write().unwrap();
        assert!(matches!(blob.open_write(), Err(StorageError::AlreadyOpen)));
        drop(writer);

        write_blob(&blob, |w| w.write_all(b"second")).unwrap();
        assert_eq!(read_blob(&blob).unwrap(), b"second");
    }

    #[test]
    fn test_consume_file_is_rejected_while_writer_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"));
        let blob = store.create().unwrap();
        let upload = dir.path().join("upload.bin");
        fs::write(&upload, b"file bytes").unwrap();

        let writer = blob.open_write().unwrap();
        assert!(matches!(blob.consume_file(&upload), Err(StorageError::AlreadyOpen)));
        assert!(upload.exists());
        drop(writer);

        blob.consume_file(&upload).unwrap();
        assert_eq!(read_blob(&blob).unwrap(), b"file bytes");
    }

    #[test]
    fn test_open_rejects_invalid_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        assert!(store.open("../../etc").is_err());
    }

    #[test]
    fn test_delete_removes_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        let blob = store.create().unwrap();
        write_blob(&blob, |w| w.write_all(b"x")).unwrap();

        store.delete(blob.blob_id()).unwrap();

        assert!(store.open(blob.blob_id()).is_err());
    }
}
