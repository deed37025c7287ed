//! Command-line interface definitions for lshdupe.
//!
//! All arguments use the clap derive API. Scan tuning flags are optional so
//! that unset flags fall through to the config file and environment layers.
//!
//! # Example
//!
//! ```bash
//! # Find near-duplicates with the defaults (pHash, 32x32, 32 bands, 0.70)
//! lshdupe scan ~/Pictures
//!
//! # Stricter threshold, JSON for scripting
//! lshdupe scan ~/Pictures --threshold 0.9 --output json
//!
//! # Write side-by-side previews of every pair
//! lshdupe scan ~/Pictures --report-dir ./report
//!
//! # Compare two images directly
//! lshdupe compare a.jpg b.jpg
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Near-duplicate image finder.
///
/// lshdupe hashes every image in a directory with a perceptual hash and uses
/// locality-sensitive hashing to find visually similar pairs without
/// comparing every image with every other one.
#[derive(Debug, Parser)]
#[command(name = "lshdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find near-duplicate images in a directory
    Scan(ScanArgs),
    /// Compare two images and print their similarity
    Compare(CompareArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan (not recursive)
    #[arg(value_name = "DIR")]
    pub path: PathBuf,

    /// Similarity a pair must exceed, between 0 and 1 [default: 0.70]
    #[arg(short, long, value_name = "F", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Perceptual hash algorithm [default: phash]
    #[arg(short, long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Hash edge length; signatures have N² bits [default: 32]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub hash_size: Option<u32>,

    /// Number of LSH bands; must divide hash_size² [default: 32]
    #[arg(short, long, value_name = "N")]
    pub bands: Option<usize>,

    /// Number of I/O threads for hashing [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Skip hidden files (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links to files
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write side-by-side images and text notes for every pair to DIR
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Delete one file of every near-duplicate pair (to trash by default)
    #[arg(long)]
    pub delete: bool,

    /// Delete permanently instead of moving to trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long, requires_all = ["delete", "yes"])]
    pub permanent: bool,

    /// Confirm destructive actions (required with --permanent)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First image
    #[arg(value_name = "A")]
    pub first: PathBuf,

    /// Second image
    #[arg(value_name = "B")]
    pub second: PathBuf,

    /// Perceptual hash algorithm [default: phash]
    #[arg(short, long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Hash edge length [default: 32]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub hash_size: Option<u32>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable ranked list
    #[default]
    Text,
    /// JSON document with records and summary
    Json,
    /// One CSV row per pair
    Csv,
}

impl OutputFormat {
    /// Returns true for formats meant for other programs.
    #[must_use]
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Parse a similarity threshold in `[0, 1]`.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {value}"))
    }
}
