use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bsifix_core::config::DEFAULT_OUT_DIR;

#[derive(Parser)]
#[command(author, version, about = "Make WAVE files broadcast-ready (PCM fmt, data first, bext + cart)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcode and rewrite files or whole directories
    Fix {
        /// .wav files or directories to search recursively
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Replace each source file instead of writing copies
        #[arg(long, conflicts_with = "out_dir")]
        in_place: bool,

        /// Root for copies: <out-dir>/<parent dir>/<name>.BSI.wav
        #[arg(long = "out-dir", default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        /// Worker count (defaults to the number of cores)
        #[arg(long = "parallel", short = 'j')]
        parallel: Option<usize>,

        /// Genre used when a file has none
        #[arg(long)]
        genre: Option<String>,

        /// Artist used when a file has none
        #[arg(long)]
        artist: Option<String>,

        /// Keep temp files left by an interrupted run
        #[arg(long)]
        no_sweep: bool,

        /// Print the batch summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the chunk layout and broadcast metadata of one file
    Inspect {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Move fmt and data to the front without changing anything else
    Reorder {
        src: PathBuf,
        /// Defaults to rewriting SRC in place
        dest: Option<PathBuf>,
    },
}
