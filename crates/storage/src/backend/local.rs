//! Local filesystem storage backend.
//!
//! Files live in a configured directory and are accessed through `tokio::fs`.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend rooted at an absolute directory.
///
/// # Examples
///
/// ```no_run
/// use camdrop_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("videos", "/srv/dahua_videos")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating the root directory if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is relative
    /// or exists but is not a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Only happens once at startup, not worth an async constructor.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn relative_path(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{}` is not within root `{}`", absolute.display(), self.root.display()))
        })?;
        validate_path(relative)
    }

    fn metadata(path: &Path, metadata: Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(FileInfo::new(path, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classifies one directory entry. Pulled out of the walk so `?` works;
    /// inside `stream!` every error has to be yielded by hand.
    async fn process_entry(&self, entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        let file_type = metadata.file_type();
        // Links are never followed, so the walk stays under the root.
        if file_type.is_symlink() {
            return Ok(WalkEntry::Skip);
        }
        if file_type.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() {
            let relative = self.relative_path(&path)?;
            return Ok(WalkEntry::File(Self::metadata(&relative, metadata)?));
        }
        // Sockets, fifos and the like are not ours to count or delete.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn list_stream<'a>(&'a self) -> FileInfoStream<'a> {
        let mut stack = vec![self.root.clone()];
        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    // Removed while we were walking (or the root was never
                    // created); nothing to report.
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue 'dirs,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };
                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => {
                            yield Err(exn::Exn::from(Self::map_io_error(e, &current)));
                            // A failing read_dir iterator tends to keep failing.
                            continue 'dirs;
                        },
                    };
                    match self.process_entry(entry).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        // Broken symlink, or deleted between read_dir and stat.
                        Err(e) if e.is_not_found() => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from_path = self.absolute_path(from)?;
        let to_path = self.absolute_path(to)?;
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, to))?;
        }
        // Same filesystem, so this is a single atomic rename(2) that also
        // replaces whatever already sits at the destination.
        Ok(fs::rename(&from_path, &to_path).await.map_err(|e| Self::map_io_error(e, from))?)
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let abs_path = self.absolute_path(path)?;
        let metadata = fs::metadata(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
        }
        Self::metadata(&validate_path(path)?, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("videos", temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("videos", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("videos", "dahua_videos").is_err());
        assert!(LocalBackend::new("videos", "./dahua_videos").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("dahua_videos");
        let backend = LocalBackend::new("videos", &root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root.as_path());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(LocalBackend::new("videos", &file).is_err());
    }

    #[test]
    fn test_absolute_path_prevents_traversal() {
        let (temp_dir, backend) = backend();
        assert_eq!(backend.absolute_path("ch1.dav").unwrap(), temp_dir.path().join("ch1.dav"));
        assert!(backend.absolute_path("../etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("ch1.dav"), b"frames").await.unwrap();
        assert_eq!(backend.read(Path::new("ch1.dav")).await.unwrap(), b"frames");
    }

    #[tokio::test]
    async fn test_exists() {
        let (_temp_dir, backend) = backend();
        assert!(!backend.exists(Path::new("ch1.dav")).await.unwrap());
        backend.write(Path::new("ch1.dav"), b"frames").await.unwrap();
        assert!(backend.exists(Path::new("ch1.dav")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("ch1.dav"), b"frames").await.unwrap();
        backend.delete(Path::new("ch1.dav")).await.unwrap();
        assert!(!backend.exists(Path::new("ch1.dav")).await.unwrap());
        let err = backend.delete(Path::new("ch1.dav")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_creates_directories() {
        let (temp_dir, backend) = backend();
        backend.write(Path::new("ch1.dav"), b"frames").await.unwrap();
        backend.rename(Path::new("ch1.dav"), Path::new("organized/2025/06/24/ch1.dav")).await.unwrap();
        assert!(!backend.exists(Path::new("ch1.dav")).await.unwrap());
        assert!(temp_dir.path().join("organized/2025/06/24/ch1.dav").is_file());
    }

    #[tokio::test]
    async fn test_rename_overwrites_destination() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("new.dav"), b"new").await.unwrap();
        backend.write(Path::new("organized/old.dav"), b"old").await.unwrap();
        backend.rename(Path::new("new.dav"), Path::new("organized/old.dav")).await.unwrap();
        assert_eq!(backend.read(Path::new("organized/old.dav")).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_rename_not_found() {
        let (_temp_dir, backend) = backend();
        let err = backend.rename(Path::new("missing.dav"), Path::new("x.dav")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stat() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("./a//ch1.dav"), b"12345").await.unwrap();
        let info = backend.stat(Path::new("a/ch1.dav")).await.unwrap();
        assert_eq!(info.path, PathBuf::from("a/ch1.dav"));
        assert_eq!(info.size, 5);
        assert_eq!(info.file_name(), Some("ch1.dav"));
    }

    #[tokio::test]
    async fn test_stat_directory_is_invalid() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("organized/ch1.dav"), b"x").await.unwrap();
        let err = backend.stat(Path::new("organized")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (_temp_dir, backend) = backend();
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_recursive() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("incoming.dav"), b"1").await.unwrap();
        backend.write(Path::new("notes.txt"), b"22").await.unwrap();
        backend.write(Path::new("organized/2025/06/24/a.dav"), b"333").await.unwrap();
        backend.write(Path::new("organized/2025/06/25/b.mp4"), b"4444").await.unwrap();
        let mut paths: Vec<_> = backend.list().await.unwrap().into_iter().map(|f| f.path).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("incoming.dav"),
                PathBuf::from("notes.txt"),
                PathBuf::from("organized/2025/06/24/a.dav"),
                PathBuf::from("organized/2025/06/25/b.mp4"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_reports_sizes() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("a.dav"), b"1").await.unwrap();
        backend.write(Path::new("sub/b.dav"), b"22").await.unwrap();
        let total: u64 = backend.list().await.unwrap().iter().map(|f| f.size).sum();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_path_security() {
        let (_temp_dir, backend) = backend();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../escape.dav"), b"x").await.is_err());
        assert!(backend.delete(Path::new("../../file")).await.is_err());
        assert!(backend.rename(Path::new("a.dav"), Path::new("../b.dav")).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_does_not_follow_symlinked_directories() {
        let (temp_dir, backend) = backend();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("precious.txt"), b"keep me").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("elsewhere")).unwrap();
        backend.write(Path::new("ch1.dav"), b"frames").await.unwrap();

        let files = backend.list().await.unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("ch1.dav")]);
        for file in &files {
            backend.delete(&file.path).await.unwrap();
        }
        assert!(outside.path().join("precious.txt").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_terminates_on_symlink_loop() {
        let (temp_dir, backend) = backend();
        backend.write(Path::new("cam/ch1.dav"), b"frames").await.unwrap();
        std::os::unix::fs::symlink(temp_dir.path(), temp_dir.path().join("cam/loop")).unwrap();

        let paths: Vec<_> = backend.list().await.unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec![PathBuf::from("cam/ch1.dav")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_symlinked_files() {
        let (temp_dir, backend) = backend();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("precious.dav"), b"keep me").unwrap();
        std::os::unix::fs::symlink(outside.path().join("precious.dav"), temp_dir.path().join("link.dav")).unwrap();

        assert!(backend.list().await.unwrap().is_empty());
    }
}
