use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Delete files in `dirs` (not recursively) whose names end with one of
/// `suffixes`. Returns how many were removed; unreadable dirs are skipped.
pub fn sweep_orphans<I, P>(dirs: I, suffixes: &[String]) -> usize
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let dirs: BTreeSet<PathBuf> = dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect();
    let mut removed = 0;
    for dir in dirs {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                continue;
            }
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    warn!(path = %path.display(), "removed leftover temp file");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove leftover temp file"),
            }
        }
    }
    removed
}
