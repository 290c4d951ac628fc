use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::JobMode;
use crate::error::Result;
use crate::util::paths::{stem_of, with_suffix};

/// Final temp file next to the source in in-place mode.
pub const IN_PLACE_TMP_SUFFIX: &str = ".bsifix.tmp.wav";
/// Final temp file next to the destination in copy mode.
pub const COPY_TMP_SUFFIX: &str = ".tmp.wav";
/// Transcoder output, appended to the final temp name.
pub const TRANSCODE_TMP_SUFFIX: &str = ".ffmpeg.wav";
/// Copy-mode destination name: `<stem>.BSI.wav`.
pub const COPY_DEST_SUFFIX: &str = ".BSI.wav";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Skipped,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped | Self::Failed)
    }
}

/// One source file and where its fixed version goes.
#[derive(Clone, Debug)]
pub struct BatchJob {
    pub id: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub in_place: bool,
    state: JobState,
}

impl BatchJob {
    pub fn new(id: usize, source: &Path, mode: &JobMode) -> Result<Self> {
        let source = std::path::absolute(source)?;
        let (destination, in_place) = match mode {
            JobMode::InPlace => (source.clone(), true),
            JobMode::CopyTo { output_root } => (mirrored_destination(&source, output_root)?, false),
        };
        Ok(Self {
            id,
            source,
            destination,
            in_place,
            state: JobState::Pending,
        })
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn start(&mut self) {
        debug_assert_eq!(self.state, JobState::Pending);
        self.state = JobState::Running;
    }

    /// Pending → Skipped, without running anything.
    pub fn skip(&mut self) {
        debug_assert_eq!(self.state, JobState::Pending);
        self.state = JobState::Skipped;
    }

    pub fn finish(&mut self, ok: bool) {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = if ok {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
    }

    /// Where the assembled container is written before publication.
    pub fn temp_path(&self) -> PathBuf {
        if self.in_place {
            with_suffix(&self.destination, IN_PLACE_TMP_SUFFIX)
        } else {
            with_suffix(&self.destination, COPY_TMP_SUFFIX)
        }
    }

    /// Where the transcoder writes its intermediate file.
    pub fn transcode_path(&self) -> PathBuf {
        with_suffix(&self.temp_path(), TRANSCODE_TMP_SUFFIX)
    }
}

/// `<root>/<name of source's parent dir>/<stem>.BSI.wav`, with `root` made absolute.
pub fn mirrored_destination(source: &Path, output_root: &Path) -> Result<PathBuf> {
    let root = std::path::absolute(output_root)?;
    let parent = source
        .parent()
        .and_then(Path::file_name)
        .map(PathBuf::from)
        .unwrap_or_default();
    let name = format!("{}{COPY_DEST_SUFFIX}", stem_of(source));
    Ok(root.join(parent).join(name))
}

/// Name suffixes of temp files this tool may leave behind for a mode.
pub fn orphan_suffixes(in_place: bool) -> [String; 2] {
    let base = if in_place {
        IN_PLACE_TMP_SUFFIX.to_string()
    } else {
        format!("{COPY_DEST_SUFFIX}{COPY_TMP_SUFFIX}")
    };
    let transcode = format!("{base}{TRANSCODE_TMP_SUFFIX}");
    [base, transcode]
}

/// True for files this tool writes itself: temps of either mode, and
/// `.BSI.wav` copies when running in copy mode.
pub fn is_own_artifact(path: &Path, in_place: bool) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let temp = orphan_suffixes(true)
        .iter()
        .chain(orphan_suffixes(false).iter())
        .any(|s| name.ends_with(s.as_str()));
    temp || (!in_place && name.ends_with(COPY_DEST_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_mode_mirrors_one_parent_level() {
        let mode = JobMode::CopyTo {
            output_root: PathBuf::from("/out"),
        };
        let job = BatchJob::new(0, Path::new("/music/album/track 1.wav"), &mode).unwrap();
        assert_eq!(job.destination, PathBuf::from("/out/album/track 1.BSI.wav"));
        assert_eq!(
            job.temp_path(),
            PathBuf::from("/out/album/track 1.BSI.wav.tmp.wav")
        );
        assert_eq!(
            job.transcode_path(),
            PathBuf::from("/out/album/track 1.BSI.wav.tmp.wav.ffmpeg.wav")
        );
        assert_eq!(job.state(), JobState::Pending);
    }

    #[test]
    fn in_place_targets_the_source() {
        let job = BatchJob::new(3, Path::new("/music/a.wav"), &JobMode::InPlace).unwrap();
        assert_eq!(job.destination, job.source);
        assert_eq!(job.temp_path(), PathBuf::from("/music/a.wav.bsifix.tmp.wav"));
    }

    #[test]
    fn lifecycle() {
        let mut job = BatchJob::new(0, Path::new("/m/a.wav"), &JobMode::InPlace).unwrap();
        job.start();
        assert_eq!(job.state(), JobState::Running);
        job.finish(false);
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.state().is_terminal());

        let mut job = BatchJob::new(1, Path::new("/m/b.wav"), &JobMode::InPlace).unwrap();
        job.skip();
        assert!(job.state().is_terminal());
    }

    #[test]
    fn orphan_suffixes_per_mode() {
        assert_eq!(
            orphan_suffixes(true),
            [".bsifix.tmp.wav", ".bsifix.tmp.wav.ffmpeg.wav"]
        );
        assert_eq!(
            orphan_suffixes(false),
            [".BSI.wav.tmp.wav", ".BSI.wav.tmp.wav.ffmpeg.wav"]
        );
    }

    #[test]
    fn own_artifacts_by_name() {
        for name in [
            "a.wav.bsifix.tmp.wav",
            "a.wav.bsifix.tmp.wav.ffmpeg.wav",
            "a.BSI.wav.tmp.wav",
            "a.BSI.wav.tmp.wav.ffmpeg.wav",
        ] {
            assert!(is_own_artifact(Path::new(name), true), "{name}");
            assert!(is_own_artifact(Path::new(name), false), "{name}");
        }
        assert!(is_own_artifact(Path::new("/out/x/a.BSI.wav"), false));
        assert!(!is_own_artifact(Path::new("/music/a.BSI.wav"), true));
        assert!(!is_own_artifact(Path::new("/music/a.wav"), false));
    }
}
