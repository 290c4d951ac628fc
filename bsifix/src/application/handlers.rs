use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::debug;

use bsifix_core::error::Result;
use bsifix_core::read::inspect::ContainerReport;
use bsifix_core::{
    BatchOptions, BatchSummary, JobMode, JobOutcome, JobReport, Reporter, ToolPaths, Toolchain,
    collect_inputs, inspect, reorder, run_batch,
};

/// Prints one line per finished job and the final tally.
struct ConsoleReporter {
    /// Where copies go; `None` in in-place mode.
    out_root: Option<PathBuf>,
    /// Send progress to stderr so stdout carries only JSON.
    quiet_stdout: bool,
}

impl ConsoleReporter {
    fn say(&self, line: &str) {
        if self.quiet_stdout {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl Reporter for ConsoleReporter {
    fn batch_started(&mut self, jobs: usize, workers: usize) {
        self.say(&format!("fixing {jobs} file(s) with {workers} worker(s)"));
    }

    fn job_finished(&mut self, r: &JobReport) {
        self.say(&outcome_line(r));
    }

    fn batch_finished(&mut self, s: &BatchSummary) {
        self.say(&format!(
            "done: {} succeeded, {} skipped, {} failed",
            s.succeeded, s.skipped, s.failed
        ));
        if let Some(root) = &self.out_root {
            self.say(&format!("output: {}", root.display()));
        }
    }
}

fn outcome_line(r: &JobReport) -> String {
    match &r.outcome {
        JobOutcome::Succeeded => format!(
            "[ok]   {} -> {}",
            r.source.display(),
            r.destination.display()
        ),
        JobOutcome::Skipped { reason } => format!("[skip] {} ({reason})", r.source.display()),
        JobOutcome::Failed { cause } => format!("[fail] {}: {cause}", r.source.display()),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_fix(
    inputs: Vec<PathBuf>,
    in_place: bool,
    out_dir: PathBuf,
    parallel: Option<usize>,
    genre: Option<String>,
    artist: Option<String>,
    no_sweep: bool,
    json: bool,
) -> Result<ExitCode> {
    let mut opts = BatchOptions {
        mode: if in_place {
            JobMode::InPlace
        } else {
            JobMode::CopyTo {
                output_root: out_dir.clone(),
            }
        },
        workers: parallel,
        sweep_orphans: !no_sweep,
        ..BatchOptions::default()
    };
    if let Some(g) = genre {
        opts.default_genre = g;
    }
    if let Some(a) = artist {
        opts.default_artist = a;
    }

    let files = collect_inputs(&inputs, &opts.mode)?;
    if files.is_empty() {
        eprintln!("fix: no .wav files found");
        return Ok(ExitCode::FAILURE);
    }
    debug!(files = files.len(), "inputs collected");

    let tools = Toolchain::ffmpeg(&ToolPaths::from_env());
    let mut reporter = ConsoleReporter {
        out_root: (!in_place).then_some(out_dir),
        quiet_stdout: json,
    };
    let summary = run_batch(&files, &opts, &tools, &mut reporter)?;

    if json {
        let out = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
        println!("{out}");
    }
    Ok(if summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub fn handle_inspect(file: PathBuf, json: bool) -> Result<ExitCode> {
    let report = inspect(&file)?;
    if json {
        let out = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        println!("{out}");
    } else {
        print!("{}", render_report(&file, &report));
    }
    Ok(ExitCode::SUCCESS)
}

fn render_report(file: &Path, r: &ContainerReport) -> String {
    let mut s = String::new();
    let size_note = if r.size_consistent() {
        "size ok".to_string()
    } else {
        format!("size field says {}", r.riff_size as u64 + 8)
    };
    s += &format!(
        "{}: RIFF '{}', {} bytes ({size_note})\n",
        file.display(),
        r.form_type,
        r.file_len
    );
    for c in &r.chunks {
        s += &format!("  {:<4}  size={:<10} off={}\n", c.id, c.size, c.offset);
    }
    if let Some(f) = &r.format {
        let d = &f.descriptor;
        s += &format!(
            "format: tag=0x{:04X} ch={} rate={} bits={} align={} (expected {})\n",
            d.format_tag, d.channels, d.sample_rate, d.bits_per_sample, d.block_align, f.expected_block_align
        );
        if let Some(cb) = f.extension_size {
            s += &format!("  extension: {cb} bytes\n");
        }
    }
    if let Some(b) = &r.bext {
        s += &format!(
            "bext: \"{}\" by \"{}\" ref={} {} {}\n",
            b.description, b.originator, b.originator_reference, b.origination_date, b.origination_time
        );
        if !b.coding_history.is_empty() {
            s += &format!("  {}\n", b.coding_history);
        }
    }
    if let Some(c) = &r.cart {
        s += &format!(
            "cart: v{} \"{}\" by \"{}\" cut={} ({} {})\n",
            c.version, c.title, c.artist, c.cut_id, c.producer_app_id, c.producer_app_version
        );
    }
    for e in &r.info {
        s += &format!("info: {} = {}\n", e.id, e.value);
    }
    s
}

pub fn handle_reorder(src: PathBuf, dest: Option<PathBuf>) -> Result<ExitCode> {
    let dest = dest.unwrap_or_else(|| src.clone());
    let rep = reorder(&src, &dest)?;
    let order: Vec<String> = rep.order.iter().map(|id| id.to_string()).collect();
    eprintln!("reorder: wrote {} ({})", dest.display(), order.join(", "));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tiny_wav() -> Vec<u8> {
        let mut b = b"RIFF\0\0\0\0WAVE".to_vec();
        b.extend_from_slice(b"LIST\x04\0\0\0INFO");
        b.extend_from_slice(b"data\x03\0\0\0abc\0");
        b.extend_from_slice(b"fmt \x10\0\0\0");
        b.extend_from_slice(&[1, 0, 1, 0, 0x40, 0x1F, 0, 0, 0x80, 0x3E, 0, 0, 2, 0, 16, 0]);
        let size = (b.len() - 8) as u32;
        b[4..8].copy_from_slice(&size.to_le_bytes());
        b
    }

    #[test]
    fn outcome_lines() {
        let mut r = JobReport {
            id: 0,
            source: PathBuf::from("in/a.wav"),
            destination: PathBuf::from("out/x/a.BSI.wav"),
            outcome: JobOutcome::Succeeded,
        };
        assert_eq!(outcome_line(&r), "[ok]   in/a.wav -> out/x/a.BSI.wav");
        r.outcome = JobOutcome::Failed {
            cause: "ffmpeg failed".into(),
        };
        assert_eq!(outcome_line(&r), "[fail] in/a.wav: ffmpeg failed");
    }

    #[test]
    fn reorder_then_render() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("t.wav");
        fs::write(&p, tiny_wav()).unwrap();

        handle_reorder(p.clone(), None).unwrap();
        let r = inspect(&p).unwrap();
        let text = render_report(&p, &r);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("(size ok)"));
        assert!(lines[1].trim_start().starts_with("fmt "));
        assert!(lines[2].trim_start().starts_with("data"));
        assert!(lines[3].trim_start().starts_with("LIST"));
        assert!(text.contains("rate=8000 bits=16 align=2"));
    }
}
