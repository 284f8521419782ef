//! Log output for the `camdrop` binary.
//!
//! Every event is written twice, to standard output and appended to
//! `<log_dir>/ftp_server.log`, one line each in the form
//! `<local time> - <target> - <LEVEL> - <message and fields>`.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE: &str = "ftp_server.log";

const TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second],[subsecond digits:3]");

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// level.
pub fn init(log_dir: &Path, offset: UtcOffset) -> Result<()> {
    std::fs::create_dir_all(log_dir).or_raise(|| ErrorKind::Logging)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))
        .or_raise(|| ErrorKind::Logging)?;
    let filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().event_format(LineFormat::new(offset)).with_writer(std::io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat::new(offset))
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .or_raise(|| ErrorKind::Logging)?;
    Ok(())
}

/// Single-line event format with timestamps in a fixed offset.
///
/// The offset is looked up once at startup, since asking the OS for it is
/// unsound once other threads exist.
pub struct LineFormat {
    offset: UtcOffset,
}
impl LineFormat {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let timestamp = OffsetDateTime::now_utc().to_offset(self.offset).format(TIMESTAMP).map_err(|_| fmt::Error)?;
        let metadata = event.metadata();
        write!(writer, "{timestamp} - {} - {} - ", metadata.target(), metadata.level())?;
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>()
                    && !fields.is_empty()
                {
                    write!(writer, "{{{fields}}}")?;
                }
                write!(writer, ": ")?;
            }
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
