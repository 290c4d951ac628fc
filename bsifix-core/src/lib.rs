#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub mod util {
    pub mod copy;
    pub mod paths;
    pub mod text;
}

pub mod container {
    pub mod chunk;
    pub mod format;
    pub mod layout;
    pub mod riff;
    pub mod scanner;
}

pub mod meta;

pub mod write {
    pub mod assembler;
    pub mod rewrite;
}

pub mod read {
    pub mod inspect;
}

pub mod tools;

pub mod batch {
    pub mod job;
    pub mod orchestrator;
    pub mod pipeline;
    pub mod pool;
    pub mod report;
    pub mod sweep;
    pub mod walker;
}

// Re-exports: stable API surface
pub use batch::orchestrator::run_batch;
pub use batch::pipeline::Toolchain;
pub use batch::report::{BatchSummary, JobOutcome, JobReport, Reporter, TracingReporter};
pub use batch::walker::collect_inputs;
pub use config::{BatchOptions, JobMode, ToolPaths};
pub use error::{FixError, Result};
pub use read::inspect::{ContainerReport, inspect};
pub use write::rewrite::{reorder, rewrite_container};
