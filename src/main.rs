//! `camdrop`: organizes DVR uploads into a dated tree, keeps an index of
//! them, and deletes them again once they age out.
//!
//! # Usage
//!
//! ```text
//! camdrop serve                                  # run the storage monitor
//! camdrop ingest /srv/dahua_videos/ch1_20250624000000.dav
//! camdrop --keep-days 7 sweep
//! camdrop catalog --limit 20
//! ```

mod error;
mod logging;

use crate::error::{ErrorKind, Result};
use camdrop_config::{Config, Overrides};
use camdrop_extract::format_timestamp;
use camdrop_index::{DEFAULT_INDEX_FILE, IndexStore, catalog};
use camdrop_library::{Action, Context, Outcome, monitor, on_transfer_complete, stats, sweep};
use camdrop_storage::backend::LocalBackend;
use clap::{Parser, Subcommand};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about = "Organize, index and expire DVR video uploads")]
struct Cli {
    /// TOML configuration file (default: ./camdrop.toml, then the user config
    /// directory).
    #[arg(short, long, value_name = "FILE", env = "CAMDROP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Storage root for uploads.
    #[arg(long, value_name = "DIR", global = true)]
    video_dir: Option<PathBuf>,

    /// Directory for the log file.
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Delete files older than this many days.
    #[arg(long, value_name = "DAYS", global = true)]
    keep_days: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run stats and retention on an interval until interrupted.
    Serve,
    /// Organize finished uploads; suitable as an FTP post-upload hook.
    Ingest {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Run one retention sweep.
    Sweep,
    /// Print the size of the storage tree.
    Stats,
    /// List known videos, newest first.
    Catalog {
        /// Only print this many entries.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    // Must happen while the process is still single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let cli = Cli::parse();
    match try_main(cli, offset) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

fn try_main(cli: Cli, offset: UtcOffset) -> Result<()> {
    let overrides = Overrides {
        video_dir: cli.video_dir,
        log_dir: cli.log_dir,
        keep_days: cli.keep_days,
    };
    let config = Config::load(cli.config.as_deref(), &overrides)
        .and_then(Config::resolve_from_cwd)
        .or_raise(|| ErrorKind::Config)?;
    logging::init(&config.log_dir, offset)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .or_raise(|| ErrorKind::Runtime)?;
    runtime.block_on(execute(cli.command, &config, offset))
}

async fn execute(command: Command, config: &Config, offset: UtcOffset) -> Result<()> {
    let ctx = context(config)?;
    match command {
        Command::Serve => serve(ctx, config).await,
        Command::Ingest { paths } => ingest(&ctx, paths).await,
        Command::Sweep => {
            let report = sweep(&ctx.backend, &ctx.retention, OffsetDateTime::now_utc()).await;
            println!(
                "scanned {} files, removed {} ({:.2} MB), {} vanished, {} failed",
                report.scanned,
                report.removed,
                report.megabytes_freed(),
                report.vanished,
                report.failed
            );
            Ok(())
        },
        Command::Stats => {
            let totals = stats::collect(&ctx.backend).await.or_raise(|| ErrorKind::Monitor)?;
            println!("{} files, {:.2} GB", totals.files, totals.gigabytes());
            Ok(())
        },
        Command::Catalog { limit } => {
            let records = catalog(&ctx.index, &ctx.backend, offset).await.or_raise(|| ErrorKind::Catalog)?;
            for record in records.iter().take(limit.unwrap_or(usize::MAX)) {
                println!(
                    "{}\t{}\t{}",
                    format_timestamp(record.captured_at),
                    record.size_bytes,
                    record.relative_path.display()
                );
            }
            Ok(())
        },
    }
}

fn context(config: &Config) -> Result<Context> {
    let backend = LocalBackend::new("local", &config.video_dir).or_raise(|| ErrorKind::Storage)?;
    let index_path = config.index_file.clone().unwrap_or_else(|| config.video_dir.join(DEFAULT_INDEX_FILE));
    let index = IndexStore::new(index_path, &config.video_dir);
    Ok(Context::new(Arc::new(backend), index, config.keep_days))
}

async fn serve(ctx: Context, config: &Config) -> Result<()> {
    tracing::info!(
        video_dir = %config.video_dir.display(),
        log_dir = %config.log_dir.display(),
        index = %ctx.index.path().display(),
        keep_days = config.keep_days.get(),
        interval_secs = config.sweep_interval_secs.get(),
        "Starting camdrop"
    );
    let cancel = CancellationToken::new();
    let monitor = tokio::spawn({
        let cancel = cancel.clone();
        let interval = config.sweep_interval();
        async move { monitor::run(&ctx, interval, cancel).await }
    });
    let signal = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down");
    cancel.cancel();
    monitor.await.or_raise(|| ErrorKind::Monitor)?;
    signal.or_raise(|| ErrorKind::Signal)
}

async fn ingest(ctx: &Context, paths: Vec<PathBuf>) -> Result<()> {
    let mut failures = 0;
    for path in paths {
        let path = std::path::absolute(&path).unwrap_or(path);
        match on_transfer_complete(ctx, &path).await {
            Outcome::Processed(Action::Organized(record)) => println!("organized\t{}", record.relative_path.display()),
            Outcome::Processed(Action::MovedUnindexed(moved)) => {
                failures += 1;
                println!("unindexed\t{}", moved.display());
            },
            Outcome::Processed(Action::Unclassified(path)) => println!("unclassified\t{}", path.display()),
            Outcome::Ignored(path) => println!("ignored\t{}", path.display()),
            Outcome::Rejected(path) | Outcome::Failed(path) => {
                failures += 1;
                println!("failed\t{}", path.display());
            },
        }
    }
    match failures {
        0 => Ok(()),
        n => exn::bail!(ErrorKind::Ingest(n)),
    }
}
