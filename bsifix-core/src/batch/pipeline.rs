use std::fs;
use std::sync::Arc;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::batch::job::BatchJob;
use crate::batch::report::{JobOutcome, JobReport};
use crate::config::ToolPaths;
use crate::error::Result;
use crate::meta::tags::{MetadataDefaults, TagMap, TrackTags};
use crate::tools::{Ffmpeg, Ffprobe, MetadataProbe, Transcoder};
use crate::util::paths::stem_of;
use crate::write::rewrite::{broadcast_chunks, rewrite_container};

/// The external programs a job needs, shared by every worker.
#[derive(Clone)]
pub struct Toolchain {
    pub probe: Arc<dyn MetadataProbe>,
    pub transcoder: Arc<dyn Transcoder>,
}

impl Toolchain {
    pub fn new(probe: Arc<dyn MetadataProbe>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self { probe, transcoder }
    }

    pub fn ffmpeg(paths: &ToolPaths) -> Self {
        Self::new(
            Arc::new(Ffprobe::new(&paths.ffprobe)),
            Arc::new(Ffmpeg::new(&paths.ffmpeg)),
        )
    }

    pub fn ensure_available(&self) -> Result<()> {
        self.transcoder.ensure_available()?;
        self.probe.ensure_available()
    }
}

/// Run one job to a terminal state. Never panics on bad input; every failure
/// ends up in the report.
pub fn run_job(mut job: BatchJob, tools: &Toolchain, defaults: &MetadataDefaults) -> JobReport {
    let outcome = if !job.in_place && job.destination.exists() {
        job.skip();
        JobOutcome::Skipped {
            reason: "destination already exists".into(),
        }
    } else {
        job.start();
        match process(&job, tools, defaults) {
            Ok(()) => {
                job.finish(true);
                JobOutcome::Succeeded
            }
            Err(e) => {
                job.finish(false);
                JobOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        }
    };
    JobReport {
        id: job.id,
        source: job.source,
        destination: job.destination,
        outcome,
    }
}

fn process(job: &BatchJob, tools: &Toolchain, defaults: &MetadataDefaults) -> Result<()> {
    if let Some(parent) = job.destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let tags = tools.probe.probe(&job.source).unwrap_or_else(|e| {
        warn!(src = %job.source.display(), error = %e, "metadata probe failed; using defaults");
        TagMap::new()
    });
    let meta = TrackTags::from_map(&tags).resolve(&stem_of(&job.source), defaults);
    debug!(id = job.id, title = %meta.title, artist = %meta.artist, "metadata resolved");

    // Both temps are removed on drop unless published.
    let final_tmp = TempPath::try_from_path(job.temp_path())?;
    let transcoded = TempPath::try_from_path(job.transcode_path())?;

    tools
        .transcoder
        .transcode(&job.source, &transcoded, &meta.transcode_pairs())?;

    let injected = broadcast_chunks(&meta)?;
    let report = rewrite_container(&transcoded, &final_tmp, &injected)?;
    debug!(
        id = job.id,
        bytes = report.total_len,
        data = report.data_len,
        "container assembled"
    );
    transcoded.close()?;

    final_tmp.persist(&job.destination).map_err(|e| e.error)?;
    Ok(())
}
