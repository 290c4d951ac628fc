use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::batch::job::{BatchJob, is_own_artifact, orphan_suffixes};
use crate::batch::pipeline::{Toolchain, run_job};
use crate::batch::pool::WorkerPool;
use crate::batch::report::{BatchSummary, JobOutcome, JobReport, Reporter};
use crate::batch::sweep::sweep_orphans;
use crate::config::{BatchOptions, JobMode};
use crate::error::Result;

/// Fix every file in `files` on a bounded worker pool.
///
/// Returns `Err` only when the run cannot start (missing tool, output root
/// not creatable, pool construction); per-file problems become `Failed`
/// entries in the summary.
pub fn run_batch(
    files: &[PathBuf],
    opts: &BatchOptions,
    tools: &Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary> {
    tools.ensure_available()?;

    let in_place = matches!(opts.mode, JobMode::InPlace);
    if let JobMode::CopyTo { output_root } = &opts.mode {
        fs::create_dir_all(output_root)?;
    }

    // Reports for jobs that never reach the pool; emitted after the header.
    let mut early = Vec::new();
    let mut jobs = Vec::with_capacity(files.len());
    for (id, src) in files.iter().enumerate() {
        let outcome = match BatchJob::new(id, src, &opts.mode) {
            Ok(job) if is_own_artifact(&job.source, in_place) => JobOutcome::Skipped {
                reason: "written by an earlier run".into(),
            },
            Ok(job) => {
                jobs.push(job);
                continue;
            }
            Err(e) => JobOutcome::Failed {
                cause: e.to_string(),
            },
        };
        early.push(JobReport {
            id,
            source: src.clone(),
            destination: PathBuf::new(),
            outcome,
        });
    }

    if opts.sweep_orphans {
        let dirs = jobs.iter().filter_map(|j| j.destination.parent().map(Path::to_path_buf));
        let n = sweep_orphans(dirs, &orphan_suffixes(in_place));
        if n > 0 {
            warn!(removed = n, "leftover temp files from an earlier run removed");
        }
    }

    let pool = WorkerPool::new(opts.workers)?;
    reporter.batch_started(files.len(), pool.size());
    info!(jobs = jobs.len(), workers = pool.size(), in_place, "submitting jobs");

    let mut summary = BatchSummary::default();
    for r in early {
        reporter.job_finished(&r);
        summary.record(r);
    }

    let defaults = opts.metadata_defaults();
    let pending: Vec<(usize, PathBuf, PathBuf)> = jobs
        .iter()
        .map(|j| (j.id, j.source.clone(), j.destination.clone()))
        .collect();
    let work = jobs.into_iter().map(|job| {
        let tools = tools.clone();
        let defaults = defaults.clone();
        move || run_job(job, &tools, &defaults)
    });

    for (idx, done) in pool.run_all(work) {
        let r = done.unwrap_or_else(|panic| {
            let (id, source, destination) = pending[idx].clone();
            JobReport {
                id,
                source,
                destination,
                outcome: JobOutcome::Failed {
                    cause: format!("worker panicked: {panic}"),
                },
            }
        });
        reporter.job_finished(&r);
        summary.record(r);
    }

    reporter.batch_finished(&summary);
    Ok(summary)
}
