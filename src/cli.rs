//! Command-line interface for inspecting and rewriting SeaBASS files
//!
//! Defines the clap argument structure, logging setup and the three
//! subcommands. Library errors are wrapped with `anyhow` context here.

use crate::config::ReadOptions;
use crate::discovery::collect_file_paths;
use crate::document::SeabassFile;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read, inspect and rewrite SeaBASS oceanographic data files
#[derive(Debug, Clone, Parser)]
#[command(name = "seabass", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not log or record non-fatal warnings
    #[arg(long = "no-warn", global = true)]
    pub no_warn: bool,

    /// Keep `!/` directive-change comments
    #[arg(long = "keep-directive-comments", global = true)]
    pub keep_directive_comments: bool,

    /// Keep missing and detection-limit sentinels as numbers
    #[arg(long = "no-mask", global = true)]
    pub no_mask: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Summarise one file, or every .sb file under a directory
    Inspect {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Print one ISO-8601 timestamp per data row
    Datetimes {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Parse a file and write it back out
    Rewrite {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "OUT")]
        output: PathBuf,
    },
}

impl Args {
    /// Reader options selected by the global flags
    pub fn read_options(&self) -> ReadOptions {
        let mut options = if self.no_mask {
            ReadOptions::unmasked()
        } else {
            ReadOptions::default()
        };
        if self.no_warn {
            options = options.with_suppressed_warnings();
        }
        if self.keep_directive_comments {
            options = options.with_directive_comments();
        }
        options
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Set up structured logging to stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("seabass_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Execute the selected subcommand
pub fn run(args: Args) -> Result<()> {
    let options = args.read_options();
    match &args.command {
        Commands::Inspect { path } => inspect(path, &options),
        Commands::Datetimes { file } => datetimes(file, &options),
        Commands::Rewrite { file, output } => rewrite(file, output, &options),
    }
}

fn inspect(path: &Path, options: &ReadOptions) -> Result<()> {
    if !path.is_dir() {
        let file = SeabassFile::open(path, options)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        print_summary(&file);
        return Ok(());
    }

    let files = collect_file_paths(path, crate::constants::SEABASS_EXTENSION)
        .with_context(|| format!("Failed to scan {}", path.display()))?;
    if files.is_empty() {
        println!("{}", format!("No .sb files under {}", path.display()).yellow());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut parsed = Vec::new();
    let mut failed = Vec::new();
    for file_path in &files {
        pb.set_message(
            file_path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        match SeabassFile::open(file_path, options) {
            Ok(file) => parsed.push(file),
            Err(e) => {
                warn!("Skipping {}: {}", file_path.display(), e);
                failed.push((file_path.clone(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    for file in &parsed {
        print_summary(file);
    }
    for (file_path, error) in &failed {
        println!("{} {}", file_path.display().to_string().red().bold(), error);
    }

    println!(
        "{} {} parsed, {} failed",
        "Summary:".bright_green().bold(),
        parsed.len(),
        failed.len()
    );
    Ok(())
}

fn print_summary(file: &SeabassFile) {
    println!("{}", file.path().display().to_string().bright_cyan().bold());
    if let Some(pi) = file.investigator() {
        println!("  {} {}", "investigator:".bright_white(), pi);
    }
    println!(
        "  {} {}   {} {:?}   {} {}",
        "rows:".bright_white(),
        file.row_count(),
        "delimiter:".bright_white(),
        file.delimiter(),
        "missing:".bright_white(),
        file.sentinels().missing.token
    );
    if let Some((start, end)) = file.year_span() {
        println!("  {} {}-{}", "years:".bright_white(), start, end);
    }
    for (field, unit) in file.variables() {
        println!("  {:<24} {}", field, unit.bright_black());
    }
    for warning in file.warnings() {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
}

fn datetimes(path: &Path, options: &ReadOptions) -> Result<()> {
    let file = SeabassFile::open(path, options)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let timestamps = file
        .reconstruct_timestamps()
        .with_context(|| format!("Failed to derive timestamps for {}", path.display()))?;
    if timestamps.is_empty() {
        println!("{}", "No temporal fields found".yellow());
    }
    for timestamp in timestamps {
        println!("{}", timestamp.format("%Y-%m-%dT%H:%M:%S%.6f"));
    }
    Ok(())
}

fn rewrite(path: &Path, output: &Path, options: &ReadOptions) -> Result<()> {
    let file = SeabassFile::open(path, options)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    file.write_to(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} {} -> {}",
        "Rewrote".bright_green().bold(),
        path.display(),
        output.display()
    );
    Ok(())
}
