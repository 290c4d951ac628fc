use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Deserialize;
use tracing::debug;

use super::{MetadataProbe, Transcoder};
use crate::error::{FixError, Result};
use crate::meta::tags::TagMap;

#[derive(Deserialize, Default)]
struct ProbeDoc {
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Deserialize, Default)]
struct ProbeFormat {
    #[serde(default)]
    tags: TagMap,
}

/// `ffprobe -show_format` as a metadata probe.
#[derive(Clone, Debug)]
pub struct Ffprobe {
    pub program: PathBuf,
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MetadataProbe for Ffprobe {
    fn probe(&self, src: &Path) -> Result<TagMap> {
        let out = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(src)
            .output()?;
        check_status("ffprobe", &out)?;
        parse_probe_json(&out.stdout)
    }

    fn ensure_available(&self) -> Result<()> {
        require(&self.program)
    }
}

/// Tags under `format.tags` of ffprobe's JSON output.
pub fn parse_probe_json(raw: &[u8]) -> Result<TagMap> {
    let doc: ProbeDoc = serde_json::from_slice(raw).map_err(|e| FixError::ExternalTool {
        tool: "ffprobe".into(),
        detail: format!("unparseable output: {e}"),
    })?;
    Ok(doc.format.tags)
}

/// `ffmpeg` transcoding to `pcm_s24le` WAVE.
#[derive(Clone, Debug)]
pub struct Ffmpeg {
    pub program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, src: &Path, dst: &Path, tags: &[(&'static str, String)]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-v", "error", "-i"])
            .arg(src)
            .args(["-c:a", "pcm_s24le", "-map_metadata", "-1"]);
        for (k, v) in tags {
            cmd.arg("-metadata").arg(format!("{k}={v}"));
        }
        cmd.args(["-f", "wav"]).arg(dst);
        cmd
    }
}

impl Transcoder for Ffmpeg {
    fn transcode(&self, src: &Path, dst: &Path, tags: &[(&'static str, String)]) -> Result<()> {
        let mut cmd = self.command(src, dst, tags);
        debug!(?cmd, "running transcoder");
        let out = cmd.output()?;
        check_status("ffmpeg", &out)
    }

    fn ensure_available(&self) -> Result<()> {
        require(&self.program)
    }
}

fn check_status(tool: &str, out: &Output) -> Result<()> {
    if out.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&out.stderr);
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
    Err(FixError::ExternalTool {
        tool: tool.to_string(),
        detail: format!("{} {}", out.status, last.trim()),
    })
}

fn require(program: &Path) -> Result<()> {
    find_program(program)
        .map(|_| ())
        .ok_or_else(|| FixError::ToolNotFound(program.display().to_string()))
}

/// Resolve `program` the way a shell would: as given when it contains a
/// directory part, else through `PATH`.
pub fn find_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_json_tags() {
        let raw = br#"{"format":{"filename":"a.flac","tags":{"TITLE":"Song","artist":"Band"}}}"#;
        let tags = parse_probe_json(raw).unwrap();
        assert_eq!(tags.get("TITLE").map(String::as_str), Some("Song"));
        assert_eq!(tags.len(), 2);

        assert!(parse_probe_json(br#"{"format":{}}"#).unwrap().is_empty());
        assert!(parse_probe_json(b"{}").unwrap().is_empty());
        assert!(matches!(
            parse_probe_json(b"not json"),
            Err(FixError::ExternalTool { .. })
        ));
    }

    #[test]
    fn ffmpeg_arguments() {
        let cmd = Ffmpeg::new("ffmpeg").command(
            Path::new("in.flac"),
            Path::new("out.wav"),
            &[("title", "A=B".to_string()), ("artist", "C".to_string())],
        );
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-y", "-v", "error", "-i", "in.flac", "-c:a", "pcm_s24le", "-map_metadata", "-1",
                "-metadata", "title=A=B", "-metadata", "artist=C", "-f", "wav", "out.wav",
            ]
        );
    }

    #[test]
    fn missing_program_is_reported() {
        let err = Ffmpeg::new("definitely-not-installed-bsifix-tool")
            .ensure_available()
            .unwrap_err();
        assert!(matches!(err, FixError::ToolNotFound(_)));
    }
}
