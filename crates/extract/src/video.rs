use std::path::Path;

/// File extensions (lowercase, without the dot) treated as recorder video.
pub const VIDEO_EXTENSIONS: [&str; 7] = ["avi", "mp4", "mkv", "mov", "wmv", "flv", "dav"];

/// Returns `true` if the path carries one of the [`VIDEO_EXTENSIONS`],
/// compared case-insensitively.
///
/// ```
/// use camdrop_extract::is_video;
/// assert!(is_video("Casa_ch1_main_20250624000000_20250624010000.DAV"));
/// assert!(!is_video("snapshot.jpg"));
/// ```
pub fn is_video(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|video| video.eq_ignore_ascii_case(ext)))
}
