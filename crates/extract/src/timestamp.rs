//! ISO-8601 rendering of capture times, as stored in the video index.

use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_SECONDS: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const ISO_FRACTIONAL: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// Renders a capture time as `YYYY-MM-DDTHH:MM:SS`, adding the fractional
/// part only when there is one.
pub fn format_timestamp(value: PrimitiveDateTime) -> String {
    let format = match value.nanosecond() {
        0 => ISO_SECONDS,
        _ => ISO_FRACTIONAL,
    };
    // Formatting a PrimitiveDateTime with date and time components only
    // fails for years beyond four digits, which the format cannot express.
    value.format(format).unwrap_or_else(|_| value.to_string())
}

/// Parses a timestamp written by [`format_timestamp`] (or by anything else
/// producing naive ISO-8601 with optional fractional seconds).
pub fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    let value = value.trim();
    PrimitiveDateTime::parse(value, ISO_SECONDS)
        .or_else(|_| PrimitiveDateTime::parse(value, ISO_FRACTIONAL))
        .ok()
}
