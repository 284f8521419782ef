//! Everything that can be learned about an upload from its name alone.
//!
//! Recorders embed the start of the recording in the file name
//! (`Casa_ch1_main_20250624000000_20250624010000.dav`). This crate pulls that
//! timestamp out, decides whether a file is a video at all, and maps capture
//! times onto the dated `organized/` layout of the storage tree.

mod capture;
mod layout;
mod timestamp;
mod video;

pub use crate::capture::{TIMESTAMP_DIGITS, capture_time};
pub use crate::layout::{ORGANIZED_DIR, destination, destination_dir};
pub use crate::timestamp::{format_timestamp, parse_timestamp};
pub use crate::video::{VIDEO_EXTENSIONS, is_video};
