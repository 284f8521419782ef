use crate::VideoRecord;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::instrument;

/// File name of the index when it lives at the top of the storage root,
/// which is where the administrative dashboard looks for it.
pub const DEFAULT_INDEX_FILE: &str = "video_database.txt";

/// The append-only index file.
///
/// Appends from within this process are serialized through an async mutex so
/// concurrent uploads never interleave partial lines. Each record is also
/// written with a single `write_all` on an append-mode handle, which keeps
/// lines intact in practice when several processes share the file, but no
/// cross-process lock is taken.
#[derive(Debug)]
pub struct IndexStore {
    path: PathBuf,
    root: PathBuf,
    writer: Mutex<()>,
}
impl IndexStore {
    /// Open (lazily; nothing is touched on disk yet) the index at `path` for
    /// a storage tree rooted at `root`.
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
            writer: Mutex::new(()),
        }
    }

    /// Location of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Storage root record paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Durably appends one record.
    ///
    /// The line is flushed and synced before returning, so an immediately
    /// following [`read_all`](Self::read_all) sees it.
    #[instrument(skip(self), fields(index = %self.path.display(), path = %record.relative_path.display()))]
    pub async fn append(&self, record: &VideoRecord) -> Result<()> {
        let line = record
            .to_line(&self.root)
            .ok_or_raise(|| ErrorKind::InvalidRecord(record.relative_path.clone()))?;
        let write_error = || ErrorKind::Write(self.path.clone());
        let _guard = self.writer.lock().await;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.or_raise(write_error)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await.or_raise(write_error)?;
        file.write_all(line.as_bytes()).await.or_raise(write_error)?;
        file.flush().await.or_raise(write_error)?;
        file.sync_data().await.or_raise(write_error)?;
        tracing::debug!(bytes = line.len(), "Appended video record");
        Ok(())
    }

    /// Every record ever appended, in file order.
    ///
    /// A missing index reads as empty. Lines that do not parse are skipped
    /// (and logged at debug level); invalid UTF-8 is replaced rather than
    /// failing the whole read.
    #[instrument(skip(self), fields(index = %self.path.display()))]
    pub async fn read_all(&self) -> Result<Vec<VideoRecord>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Read(self.path.clone())),
        };
        let content = String::from_utf8_lossy(&bytes);
        let mut records = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match VideoRecord::from_line(line, &self.root) {
                Some(record) => records.push(record),
                None => tracing::debug!(line = number + 1, "Skipping malformed index line"),
            }
        }
        Ok(records)
    }

    /// Returns `true` if the index file exists and has any content.
    pub async fn has_records(&self) -> Result<bool> {
        match fs::metadata(&self.path).await {
            Ok(metadata) => Ok(metadata.len() > 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).or_raise(|| ErrorKind::Read(self.path.clone())),
        }
    }
}
