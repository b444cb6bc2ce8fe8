//! Output directories: file naming and listings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Extensions kept by the captures listing.
pub const CAPTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Extensions kept by the recordings listing.
pub const RECORDING_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv"];

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    extensions.contains(&ext.as_str())
}

/// Names of the regular files in `dir` with one of `extensions`, sorted.
///
/// A missing or unreadable directory is an empty listing.
pub fn list_media(dir: &Path, extensions: &[&str]) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), "Listing skipped: {}", e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, extensions))
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}

/// `<dir>/<prefix>_<unix-ms>.<ext>`, with a numeric suffix when two
/// artifacts land in the same millisecond.
pub fn timestamped_path(dir: &Path, prefix: &str, extension: &str, at: DateTime<Utc>) -> PathBuf {
    let stamp = at.timestamp_millis();
    let mut path = dir.join(format!("{prefix}_{stamp}.{extension}"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{prefix}_{stamp}_{n}.{extension}"));
        n += 1;
    }
    path
}
