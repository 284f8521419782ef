//! Where classified videos live inside the storage tree.

use std::path::PathBuf;
use time::PrimitiveDateTime;

/// Top-level directory (relative to the storage root) holding classified videos.
pub const ORGANIZED_DIR: &str = "organized";

/// Directory for videos captured on the day of `captured_at`:
/// `organized/YYYY/MM/DD`, zero-padded.
pub fn destination_dir(captured_at: PrimitiveDateTime) -> PathBuf {
    let mut dir = PathBuf::from(ORGANIZED_DIR);
    dir.push(format!("{:04}", captured_at.year()));
    dir.push(format!("{:02}", u8::from(captured_at.month())));
    dir.push(format!("{:02}", captured_at.day()));
    dir
}

/// Full destination of a video: its [`destination_dir`] plus the original
/// file name, unchanged.
pub fn destination(captured_at: PrimitiveDateTime, filename: &str) -> PathBuf {
    destination_dir(captured_at).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use time::macros::datetime;

    #[test]
    fn test_destination_dir_is_zero_padded() {
        assert_eq!(destination_dir(datetime!(2025-06-04 23:59:59)), Path::new("organized/2025/06/04"));
        assert_eq!(destination_dir(datetime!(0999-01-01 00:00:00)), Path::new("organized/0999/01/01"));
    }

    #[test]
    fn test_destination_keeps_filename() {
        let filename = "Casa_ch1_main_20250624000000_20250624010000.dav";
        assert_eq!(
            destination(datetime!(2025-06-24 00:00:00), filename),
            Path::new("organized/2025/06/24/Casa_ch1_main_20250624000000_20250624010000.dav")
        );
    }
}
