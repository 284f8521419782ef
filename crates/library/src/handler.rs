//! Entry point for finished uploads.
//!
//! The transfer engine calls [`on_transfer_complete`] once per completed
//! upload. Whatever happens in here is logged and summarized as an
//! [`Outcome`]; nothing (not even a panic) escapes back into the engine.

use crate::Context;
use crate::organize::{Action, organize_file};
use camdrop_extract::is_video;
use camdrop_storage::validate_path;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// What became of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file is not a video and was left alone.
    Ignored(PathBuf),
    /// The reported path is not inside the storage root.
    Rejected(PathBuf),
    /// The file was handed to the organizer.
    Processed(Action),
    /// Something went wrong; details are in the log.
    Failed(PathBuf),
}

/// Handles one completed upload.
///
/// `path` is normally absolute, as reported by the transfer engine, and must
/// point inside the storage root. Relative paths are taken as relative to the
/// root.
#[instrument(skip(ctx), fields(path = %path.display()))]
pub async fn on_transfer_complete(ctx: &Context, path: &Path) -> Outcome {
    match AssertUnwindSafe(handle(ctx, path)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("Upload handler panicked");
            Outcome::Failed(path.to_path_buf())
        },
    }
}

async fn handle(ctx: &Context, path: &Path) -> Outcome {
    let Some(relative) = relative_to_root(ctx.backend.root(), path) else {
        tracing::warn!(root = %ctx.backend.root().display(), "Rejecting upload outside the storage root");
        return Outcome::Rejected(path.to_path_buf());
    };

    let file = match ctx.backend.stat(&relative).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(error = ?e, "Could not inspect uploaded file");
            return Outcome::Failed(relative);
        },
    };
    tracing::info!(size = file.size, "Received upload");

    if !is_video(&file.path) {
        tracing::info!("Ignoring upload that is not a video");
        return Outcome::Ignored(file.path);
    }

    match organize_file(ctx, &file.path).await {
        Ok(action) => Outcome::Processed(action),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to organize upload");
            Outcome::Failed(file.path)
        },
    }
}

fn relative_to_root(root: &Path, path: &Path) -> Option<PathBuf> {
    let relative = match path.is_absolute() {
        true => path.strip_prefix(root).ok()?,
        false => path,
    };
    validate_path(relative).ok()
}
