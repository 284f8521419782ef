//! Filing uploads into the dated tree.
//!
//! The capture time is read from the upload's file name and the file is
//! renamed to `organized/YYYY/MM/DD/<file name>` within the same storage
//! root, then recorded in the index. Files whose names carry no capture time
//! are left exactly where they were uploaded.
//!
//! The rename and the index append are not atomic together: a failed append
//! after a successful rename leaves an organized file with no record
//! ([`Action::MovedUnindexed`]). Nothing reconciles the two later.

pub mod error;
mod file;

pub use self::file::{Action, organize_file};
