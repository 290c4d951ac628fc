//! Seams to the external probe and transcoder.

use std::path::Path;

use crate::error::Result;
use crate::meta::tags::TagMap;

pub mod ffmpeg;

pub use ffmpeg::{Ffmpeg, Ffprobe, find_program};

pub trait MetadataProbe: Send + Sync {
    /// Container-level tags of `src`. Callers treat an error as "no tags".
    fn probe(&self, src: &Path) -> Result<TagMap>;

    /// Fail with `ToolNotFound` when the probe cannot run at all.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }
}

pub trait Transcoder: Send + Sync {
    /// Decode `src` and write a 24-bit PCM WAVE file to `dst`, embedding `tags`
    /// in place of whatever metadata the source carried.
    fn transcode(&self, src: &Path, dst: &Path, tags: &[(&'static str, String)]) -> Result<()>;

    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }
}
