//! Path validation for the storage tree.
//!
//! Uploads arrive with whatever names the recorder chose and the transfer
//! engine reports them as absolute paths, so every path is normalised and
//! checked to stay inside the storage root before a backend touches it.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and returns its normalised, relative form.
///
/// Leading root components are dropped, `.` segments vanish and `..` pops the
/// previous segment. A path that would climb above the root, carries a null
/// byte or a Windows prefix, or normalises to nothing is rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use camdrop_storage::validate_path;
/// assert!(validate_path("organized/2025/06/24/ch1.dav").is_ok());
/// assert!(validate_path("incoming/../ch1.dav").is_ok());
/// assert!(validate_path("../ch1.dav").is_err());
/// assert!(validate_path("ch1\0.dav").is_err());
/// assert_eq!(
///     validate_path("./organized//2025/./06/").unwrap(),
///     Path::new("organized/2025/06")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut segments = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(segment) => segments.push(segment),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if segments.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if segments.is_empty() {
        exn::bail!(invalid());
    }
    Ok(segments.into_iter().collect())
}
