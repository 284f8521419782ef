use crate::error::{ErrorKind, Result};
use crate::{IndexStore, VideoRecord};
use camdrop_extract::is_video;
use camdrop_storage::BackendHandle;
use exn::ResultExt;
use futures::StreamExt;
use time::{PrimitiveDateTime, UtcOffset};
use tracing::instrument;

/// Lists every known video, newest first.
///
/// Reads the index when it has content. Otherwise the storage tree is walked
/// and one record is synthesized per video file, using the file's
/// modification time (shifted to `offset`, normally the host's local offset)
/// as the capture time. Unreadable entries in the walk are logged and left
/// out.
#[instrument(skip_all, fields(index = %store.path().display(), backend = backend.name()))]
pub async fn catalog(store: &IndexStore, backend: &BackendHandle, offset: UtcOffset) -> Result<Vec<VideoRecord>> {
    let mut records = if store.has_records().await? {
        store.read_all().await?
    } else {
        tracing::debug!("Index is empty; rebuilding catalog from storage tree");
        from_storage(backend, offset).await?
    };
    records.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
    Ok(records)
}

async fn from_storage(backend: &BackendHandle, offset: UtcOffset) -> Result<Vec<VideoRecord>> {
    let mut records = Vec::new();
    let mut files = backend.list_stream();
    while let Some(entry) = files.next().await {
        let file = match entry.or_raise(|| ErrorKind::Storage) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(error = ?e, "Skipping unreadable entry while rebuilding catalog");
                continue;
            },
        };
        if !is_video(&file.path) {
            continue;
        }
        let modified = file.modified.to_offset(offset);
        let captured_at = PrimitiveDateTime::new(modified.date(), modified.time());
        records.push(VideoRecord::new(captured_at, file.path, file.size));
    }
    Ok(records)
}
