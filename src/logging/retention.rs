//! Log folder size cap

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{debug, error, warn};

/// Names containing `.log` (rotated `app.log.1` included)
fn is_log_name(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().contains(".log"))
}

/// Modification time and size of each regular log file among `paths`.
/// Entries that cannot be inspected (e.g. removed meanwhile) are skipped.
fn stat_log_files(paths: impl IntoIterator<Item = PathBuf>) -> Vec<(PathBuf, SystemTime, u64)> {
    let mut files = Vec::new();
    for path in paths.into_iter().filter(|path| is_log_name(path)) {
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable log file");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((path, modified, metadata.len()));
    }
    files
}

/// Delete the oldest log files in `dir` until their total size is at most
/// `max_bytes`. Returns the deleted paths. Files that cannot be inspected or
/// deleted are logged and skipped.
pub fn enforce_max_folder_size(dir: &Path, max_bytes: u64) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).context(format!("Failed to list log folder {}", dir.display()))?;
    let paths = entries.filter_map(|entry| {
        entry
            .inspect_err(|e| warn!(dir = %dir.display(), error = %e, "Skipping unreadable folder entry"))
            .ok()
            .map(|entry| entry.path())
    });
    let mut files = stat_log_files(paths);
    files.sort_by_key(|(_, modified, _)| *modified);

    let mut total: u64 = files.iter().map(|(_, _, size)| size).sum();
    let mut deleted = Vec::new();
    for (path, _, size) in files {
        if total <= max_bytes {
            break;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted log file");
                total = total.saturating_sub(size);
                deleted.push(path);
            }
            Err(e) => error!(path = %path.display(), error = %e, "Failed to delete log file"),
        }
    }
    Ok(deleted)
}
