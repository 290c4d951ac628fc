pub mod handlers;

use std::process::ExitCode;

use crate::presentation::cli::{Cli, Commands};
use bsifix_core::error::Result;
use clap::Parser;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Fix {
            inputs,
            in_place,
            out_dir,
            parallel,
            genre,
            artist,
            no_sweep,
            json,
        } => handlers::handle_fix(
            inputs, in_place, out_dir, parallel, genre, artist, no_sweep, json,
        ),
        Commands::Inspect { file, json } => handlers::handle_inspect(file, json),
        Commands::Reorder { src, dest } => handlers::handle_reorder(src, dest),
    }
}
