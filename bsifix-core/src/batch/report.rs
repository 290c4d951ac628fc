use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    Skipped { reason: String },
    Failed { cause: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    pub id: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Tally of a finished batch; `reports` are in completion order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub reports: Vec<JobReport>,
}

impl BatchSummary {
    pub fn record(&mut self, r: JobReport) {
        match r.outcome {
            JobOutcome::Succeeded => self.succeeded += 1,
            JobOutcome::Skipped { .. } => self.skipped += 1,
            JobOutcome::Failed { .. } => self.failed += 1,
        }
        self.reports.push(r);
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// Receives batch progress on the thread that runs the batch.
pub trait Reporter {
    fn batch_started(&mut self, _jobs: usize, _workers: usize) {}
    fn job_finished(&mut self, report: &JobReport);
    fn batch_finished(&mut self, _summary: &BatchSummary) {}
}

/// Reporter that only emits tracing events.
#[derive(Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn batch_started(&mut self, jobs: usize, workers: usize) {
        info!(jobs, workers, "batch started");
    }

    fn job_finished(&mut self, r: &JobReport) {
        match &r.outcome {
            JobOutcome::Succeeded => info!(src = %r.source.display(), dst = %r.destination.display(), "fixed"),
            JobOutcome::Skipped { reason } => info!(src = %r.source.display(), %reason, "skipped"),
            JobOutcome::Failed { cause } => warn!(src = %r.source.display(), %cause, "failed"),
        }
    }

    fn batch_finished(&mut self, s: &BatchSummary) {
        info!(
            succeeded = s.succeeded,
            skipped = s.skipped,
            failed = s.failed,
            "batch finished"
        );
    }
}
