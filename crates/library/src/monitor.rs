//! Background maintenance of the storage tree.
//!
//! [`run`] repeats a [`cycle`] (report [`stats`](crate::stats), then
//! [`sweep`](crate::retention::sweep)) until its [`CancellationToken`] is
//! cancelled. The pause between cycles is measured from the end of one cycle
//! to the start of the next, so cycles drift by however long they take.

use crate::Context;
use crate::error::Result;
use crate::retention::{SweepReport, sweep};
use crate::stats::{self, TreeStats};
use std::time::Duration;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Default pause between successful cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);
/// Pause after a failed cycle, regardless of the configured interval.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// One round of maintenance: stats first, then the retention sweep.
///
/// # Errors
/// Fails when the storage tree cannot be read at all; the sweep is skipped
/// for that round.
pub async fn cycle(ctx: &Context) -> Result<(TreeStats, SweepReport)> {
    let stats = stats::collect(&ctx.backend).await?;
    let report = sweep(&ctx.backend, &ctx.retention, OffsetDateTime::now_utc()).await;
    Ok((stats, report))
}

/// Runs maintenance cycles until `cancel` fires.
///
/// A failed cycle is logged and retried after [`RETRY_BACKOFF`]; the loop
/// itself never gives up. Cancellation takes effect while waiting between
/// cycles, never in the middle of one.
#[instrument(skip_all, fields(interval_secs = interval.as_secs()))]
pub async fn run(ctx: &Context, interval: Duration, cancel: CancellationToken) {
    tracing::info!(keep_days = ctx.retention.keep_days().get(), "Storage monitor started");
    while !cancel.is_cancelled() {
        let pause = match cycle(ctx).await {
            Ok(_) => interval,
            Err(e) => {
                tracing::error!(error = ?e, retry_secs = RETRY_BACKOFF.as_secs(), "Storage monitor cycle failed");
                RETRY_BACKOFF
            },
        };
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(pause) => {},
        }
    }
    tracing::info!("Storage monitor stopped");
}
