use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::batch::job::is_own_artifact;
use crate::config::JobMode;
use crate::error::Result;

fn is_wav(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Expand `inputs` into the files to process. Directories are searched
/// recursively for `.wav` files; explicit files are taken as given. Missing
/// paths are logged and skipped. Output is absolute, sorted and free of
/// duplicates.
///
/// Files written by an earlier run never come back as inputs: temps of
/// either mode are dropped, and in copy mode so are `.BSI.wav` copies and
/// everything under the output root.
pub fn collect_inputs(inputs: &[PathBuf], mode: &JobMode) -> Result<Vec<PathBuf>> {
    let (in_place, out_root) = match mode {
        JobMode::InPlace => (true, None),
        JobMode::CopyTo { output_root } => (false, Some(std::path::absolute(output_root)?)),
    };
    let under_out = |p: &Path| out_root.as_deref().is_some_and(|r| p.starts_with(r));

    let mut files = Vec::new();
    for input in inputs {
        let input = std::path::absolute(input)?;
        if input.is_dir() {
            let walk = WalkDir::new(&input)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| !under_out(e.path()));
            for entry in walk {
                let entry = entry.map_err(|e| {
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"))
                })?;
                let path = entry.path();
                if !entry.file_type().is_file() || !is_wav(path) {
                    continue;
                }
                if is_own_artifact(path, in_place) {
                    debug!(path = %path.display(), "own output; not an input");
                    continue;
                }
                files.push(entry.into_path());
            }
        } else if input.is_file() {
            if under_out(&input) || is_own_artifact(&input, in_place) {
                warn!(path = %input.display(), "written by an earlier run; skipping");
                continue;
            }
            files.push(input);
        } else {
            warn!(path = %input.display(), "input not found; skipping");
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_dirs_for_wav_only() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        fs::create_dir_all(root.join("album/disc2")).unwrap();
        fs::write(root.join("album/b.wav"), b"").unwrap();
        fs::write(root.join("album/a.WAV"), b"").unwrap();
        fs::write(root.join("album/disc2/c.wav"), b"").unwrap();
        fs::write(root.join("album/cover.jpg"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();

        let got = collect_inputs(
            &[
                root.join("album"),
                root.join("album/b.wav"),
                root.join("notes.txt"),
                root.join("missing.wav"),
            ],
            &JobMode::InPlace,
        )
        .unwrap();

        assert_eq!(
            got,
            vec![
                root.join("album/a.WAV"),
                root.join("album/b.wav"),
                root.join("album/disc2/c.wav"),
                root.join("notes.txt"),
            ]
        );
    }

    #[test]
    fn copy_mode_leaves_out_earlier_outputs() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        let out = root.join("Fixed for BSI");
        fs::create_dir_all(out.join("music")).unwrap();
        fs::write(root.join("a.wav"), b"").unwrap();
        fs::write(root.join("b.BSI.wav"), b"").unwrap();
        fs::write(root.join("c.BSI.wav.tmp.wav"), b"").unwrap();
        fs::write(out.join("music/a.BSI.wav"), b"").unwrap();
        fs::write(out.join("music/x.wav"), b"").unwrap();

        let mode = JobMode::CopyTo { output_root: out.clone() };
        let got = collect_inputs(&[root.to_path_buf(), out.join("music/x.wav")], &mode).unwrap();
        assert_eq!(got, vec![root.join("a.wav")]);
    }

    #[test]
    fn in_place_leaves_out_temps_only() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        fs::write(root.join("a.wav"), b"").unwrap();
        fs::write(root.join("a.wav.bsifix.tmp.wav"), b"").unwrap();
        fs::write(root.join("a.wav.bsifix.tmp.wav.ffmpeg.wav"), b"").unwrap();
        fs::write(root.join("b.BSI.wav"), b"").unwrap();

        let got = collect_inputs(
            &[root.to_path_buf(), root.join("a.wav.bsifix.tmp.wav")],
            &JobMode::InPlace,
        )
        .unwrap();
        assert_eq!(got, vec![root.join("a.wav"), root.join("b.BSI.wav")]);
    }
}
