//! Upward search for the scraper executable.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScrapeError};

/// Exact filenames we accept, in preference order.
const CANDIDATES: [&str; 2] = ["yt-dlp.sh", "yt-dlp"];

/// Walk from `start_dir` up to the filesystem root looking for the scraper.
/// Within each directory a candidate with the execute bit wins over one
/// that merely exists.
pub fn locate_executable(start_dir: &Path) -> Result<PathBuf> {
    let mut dir = start_dir.to_path_buf();

    loop {
        if let Some(found) = find_in_dir(&dir) {
            return Ok(found);
        }
        if !dir.pop() {
            return Err(ScrapeError::ExecutableNotFound);
        }
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    let mut fallback = None;
    for name in CANDIDATES {
        let candidate = dir.join(name);
        if !candidate.is_file() {
            continue;
        }
        if has_execute_bit(&candidate) {
            return Some(candidate);
        }
        fallback.get_or_insert(candidate);
    }
    fallback
}

#[cfg(unix)]
fn has_execute_bit(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn has_execute_bit(_path: &Path) -> bool {
    true
}
