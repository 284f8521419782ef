use camdrop_extract::{format_timestamp, parse_timestamp};
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;

/// One accepted video.
///
/// Created exactly once, when the organizer has moved the file into the dated
/// tree, and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    /// Capture time taken from the file name (or, for records rebuilt from
    /// the storage tree, the file's modification time).
    pub captured_at: PrimitiveDateTime,
    /// Location relative to the storage root. Records read from an index
    /// written against a different root keep the path as written.
    pub relative_path: PathBuf,
    /// Size in bytes at the time the record was made.
    pub size_bytes: u64,
}
impl VideoRecord {
    pub fn new(captured_at: PrimitiveDateTime, relative_path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            captured_at,
            relative_path: relative_path.into(),
            size_bytes,
        }
    }

    /// Renders the record as a single index line (including the trailing
    /// newline), with the path made absolute against `root`.
    ///
    /// Returns `None` for paths that cannot survive the line format: line
    /// breaks would split the record in two.
    pub(crate) fn to_line(&self, root: &Path) -> Option<String> {
        let path = root.join(&self.relative_path);
        let path = path.to_string_lossy();
        if path.contains(['\n', '\r']) {
            return None;
        }
        Some(format!("{},{},{}\n", format_timestamp(self.captured_at), path, self.size_bytes))
    }

    /// Parses one index line. Anything that does not look like a record
    /// yields `None`.
    ///
    /// The timestamp is everything before the first comma and the size
    /// everything after the last, so commas inside the path are preserved.
    pub(crate) fn from_line(line: &str, root: &Path) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (timestamp, rest) = line.split_once(',')?;
        let (path, size) = rest.rsplit_once(',')?;
        if path.is_empty() {
            return None;
        }
        let captured_at = parse_timestamp(timestamp)?;
        let size_bytes = size.trim().parse::<u64>().ok()?;
        let path = Path::new(path);
        let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        Some(Self { captured_at, relative_path, size_bytes })
    }
}
