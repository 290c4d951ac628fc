use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::meta::tags::MetadataDefaults;

/// Directory name used for copy mode when no output root is given.
pub const DEFAULT_OUT_DIR: &str = "Fixed for BSI";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobMode {
    /// Replace each source file atomically.
    InPlace,
    /// Write `<output_root>/<parent dir name>/<stem>.BSI.wav`, skipping existing ones.
    CopyTo { output_root: PathBuf },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchOptions {
    pub mode: JobMode,
    /// Worker count; `None` uses one per host core.
    pub workers: Option<usize>,
    pub default_artist: String,
    pub default_genre: String,
    /// Remove temp files left behind by an interrupted earlier run.
    pub sweep_orphans: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        let d = MetadataDefaults::default();
        Self {
            mode: JobMode::CopyTo {
                output_root: PathBuf::from(DEFAULT_OUT_DIR),
            },
            workers: None,
            default_artist: d.artist,
            default_genre: d.genre,
            sweep_orphans: true,
        }
    }
}

impl BatchOptions {
    pub fn metadata_defaults(&self) -> MetadataDefaults {
        MetadataDefaults {
            artist: self.default_artist.clone(),
            genre: self.default_genre.clone(),
        }
    }
}

/// Locations of the external programs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl ToolPaths {
    /// Defaults overridden by `BSIFIX_FFMPEG` / `BSIFIX_FFPROBE`.
    pub fn from_env() -> Self {
        let mut p = Self::default();
        if let Some(v) = env::var_os("BSIFIX_FFMPEG").filter(|v| !v.is_empty()) {
            p.ffmpeg = PathBuf::from(v);
        }
        if let Some(v) = env::var_os("BSIFIX_FFPROBE").filter(|v| !v.is_empty()) {
            p.ffprobe = PathBuf::from(v);
        }
        p
    }
}
