use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `path` with `suffix` appended to its final component (`a/b.wav` → `a/b.wav.tmp`).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// File stem as text, lossy for non-UTF-8 names.
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
