use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use camdrop_extract::{capture_time, destination, format_timestamp};
use camdrop_index::VideoRecord;
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The outcome of (successfully) handling a single upload.
///
/// Each variant carries the path the file now lives at, so consumers can
/// pattern-match to decide what to log or report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The file name has no capture time; the file was left in place.
    Unclassified(PathBuf),
    /// The file was moved into the dated tree and indexed.
    Organized(VideoRecord),
    /// The file was moved into the dated tree but the index append failed.
    MovedUnindexed(PathBuf),
}

/// Moves one uploaded file (given relative to the storage root) into its
/// dated directory and appends its record to the index.
///
/// An existing file at the destination is replaced. A file that is already
/// at its destination is not moved again, but is still recorded.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Organize>`](LibraryErrorKind::Organize)
/// if the file cannot be inspected or moved; the file then stays where it
/// was and nothing is recorded.
pub async fn organize_file(ctx: &Context, path: &Path) -> LibraryResult<Action> {
    organize_file_inner(ctx, path).await.or_raise(|| LibraryErrorKind::Organize)
}

#[instrument(skip(ctx), fields(path = %path.display()))]
pub(crate) async fn organize_file_inner(ctx: &Context, path: &Path) -> OrganizeResult<Action> {
    let file = ctx.backend.stat(path).await.or_raise(|| OrganizeErrorKind::Storage)?;
    let filename = file.file_name().ok_or_raise(|| OrganizeErrorKind::InvalidName)?;

    let Some(captured_at) = capture_time(filename) else {
        tracing::info!("No capture time in file name; leaving upload in place");
        return Ok(Action::Unclassified(file.path));
    };

    let target = destination(captured_at, filename);
    if file.path != target {
        ctx.backend.rename(&file.path, &target).await.or_raise(|| OrganizeErrorKind::Storage)?;
    }
    tracing::info!(
        destination = %target.display(),
        captured_at = %format_timestamp(captured_at),
        size = file.size,
        "Organized upload"
    );

    let record = VideoRecord::new(captured_at, target, file.size);
    match ctx.index.append(&record).await {
        Ok(()) => Ok(Action::Organized(record)),
        Err(e) => {
            tracing::error!(error = ?e, "Upload was organized but could not be added to the index");
            Ok(Action::MovedUnindexed(record.relative_path))
        },
    }
}
