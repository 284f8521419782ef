use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::instrument;

/// Length of a `YYYYMMDDHHMMSS` run.
pub const TIMESTAMP_DIGITS: usize = 14;

/// Extracts the capture time embedded in a recorder file name.
///
/// Looks for the first run of ASCII digits that is exactly
/// [`TIMESTAMP_DIGITS`] long and reads it as `YYYYMMDDHHMMSS`. Shorter and
/// longer runs are skipped. Only the first qualifying run is considered: when
/// it does not describe a real date and time (year 0, month 13, February
/// 30th, hour 24...) the result is `None`, even if a later run would have
/// been valid.
///
/// No timezone is implied; the value is whatever the recorder's clock said.
///
/// ```
/// use camdrop_extract::capture_time;
/// use time::macros::datetime;
///
/// assert_eq!(
///     capture_time("Casa_ch1_main_20250624000000_20250624010000.dav"),
///     Some(datetime!(2025-06-24 00:00:00)),
/// );
/// assert_eq!(capture_time("Casa_ch1_main.dav"), None);
/// assert_eq!(capture_time("ch1_20251324000000.dav"), None);
/// ```
#[instrument(level = "trace")]
pub fn capture_time(filename: &str) -> Option<PrimitiveDateTime> {
    let run = DigitRuns::new(filename).find(|run| run.len() == TIMESTAMP_DIGITS)?;
    let number = |range: std::ops::Range<usize>| run[range].parse::<u16>().ok();
    let year = number(0..4).filter(|&year| year > 0)?;
    let month = Month::try_from(u8::try_from(number(4..6)?).ok()?).ok()?;
    let day = u8::try_from(number(6..8)?).ok()?;
    let hour = u8::try_from(number(8..10)?).ok()?;
    let minute = u8::try_from(number(10..12)?).ok()?;
    let second = u8::try_from(number(12..14)?).ok()?;
    let date = Date::from_calendar_date(i32::from(year), month, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

/// Iterator over the maximal runs of ASCII digits in a string, left to right.
///
/// Works on bytes: ASCII digits never occur inside multi-byte UTF-8
/// sequences, so every yielded slice is on a character boundary.
struct DigitRuns<'a> {
    haystack: &'a str,
    position: usize,
}
impl<'a> DigitRuns<'a> {
    fn new(haystack: &'a str) -> Self {
        Self { haystack, position: 0 }
    }
}
impl<'a> Iterator for DigitRuns<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.haystack.as_bytes();
        let start = self.position + bytes[self.position..].iter().position(u8::is_ascii_digit)?;
        let end = bytes[start..].iter().position(|b| !b.is_ascii_digit()).map_or(bytes.len(), |len| start + len);
        self.position = end;
        Some(&self.haystack[start..end])
    }
}
