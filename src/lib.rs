//! lshdupe - near-duplicate image finder
//!
//! Hashes every image of a directory into a perceptual bit signature and uses
//! locality-sensitive hashing (banding) to find visually similar pairs
//! without an all-pairs comparison. Pairs are confirmed by Hamming
//! similarity and can be exported, previewed side by side, or deleted.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use yansi::Paint;

use crate::actions::{delete_batch, select_for_deletion, validate_selection, DeleteMode};
use crate::cli::{Cli, Commands, CompareArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{
    passes_threshold, FinderConfig, LshParams, NearDuplicate, NearDuplicateFinder, ScanSummary,
};
use crate::error::ExitCode;
use crate::output::{build_report, CsvOutput, JsonDeletion, JsonOutput};
use crate::progress::Progress;

/// Run the application for parsed arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable input
/// directory, unreadable files, or a report directory that cannot be
/// created. Per-file deletion and report failures are not errors; they
/// turn the exit code into [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    if logging::init_logging(cli.verbose, cli.quiet).is_err() {
        log::debug!("Logger already installed");
    }
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load_from_path(cli.config.as_deref())
        .context("failed to load configuration")?;
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Scan(args) => run_scan(&args, config, cli.quiet),
        Commands::Compare(args) => run_compare(&args, config),
    }
}

fn run_scan(args: &ScanArgs, mut config: Config, quiet: bool) -> anyhow::Result<ExitCode> {
    config.apply_overrides(args);
    if config.permanent_delete && args.delete && !args.yes {
        bail!("permanent deletion requires --yes");
    }

    let mut finder_config: FinderConfig = config.finder_config()?;
    if !quiet && !args.output.is_machine_readable() {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }
    let params = finder_config.params;
    let finder = NearDuplicateFinder::new(finder_config);

    let (records, summary) = finder
        .find_near_duplicates(&args.path)
        .with_context(|| format!("scan of {} failed", args.path.display()))?;

    let mut partial = false;

    if let Some(ref report_dir) = args.report_dir {
        let report = build_report(&records, report_dir)?;
        partial |= !report.is_complete();
    }

    let delete_mode = DeleteMode::from_permanent(config.permanent_delete);
    let deletion = if args.delete && !records.is_empty() {
        let selected = select_for_deletion(&records);
        validate_selection(&records, &selected)?;
        let result = delete_batch(&selected, delete_mode);
        partial |= !result.all_succeeded();
        Some(result)
    } else {
        None
    };

    let exit_code = if records.is_empty() {
        ExitCode::NoDuplicates
    } else if partial {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Json => {
            let mut document =
                JsonOutput::new(&records, &summary, &params, config.algorithm, exit_code);
            if let Some(ref result) = deletion {
                document = document.with_deletion(JsonDeletion::from_batch(result, delete_mode));
            }
            document.write_to(&mut out, true)?;
        }
        OutputFormat::Csv => CsvOutput::new(&records).write_to(&mut out)?,
        OutputFormat::Text => {
            write_text(&mut out, &records, &summary, &params, &config, args)?;
            if let Some(ref result) = deletion {
                writeln!(out, "{}", result.summary().bold())?;
            }
        }
    }

    Ok(exit_code)
}

fn write_text<W: Write>(
    out: &mut W,
    records: &[NearDuplicate<PathBuf>],
    summary: &ScanSummary,
    params: &LshParams,
    config: &Config,
    args: &ScanArgs,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(
            out,
            "No near-duplicates found in {} (threshold {:.2}%)",
            args.path.display(),
            params.threshold() * 100.0
        )?;
    } else {
        writeln!(
            out,
            "{} ({} {}x{}, {} bands, threshold {:.2}):",
            "Near-duplicates".bold(),
            config.algorithm,
            params.hash_size(),
            params.hash_size(),
            params.bands(),
            params.threshold()
        )?;
        for (idx, record) in records.iter().enumerate() {
            writeln!(
                out,
                "{:>4}. {}  {}  <->  {}",
                idx + 1,
                format!("{:.4}", record.similarity).green(),
                record.id_a.display(),
                record.id_b.display()
            )?;
        }
    }

    writeln!(
        out,
        "{} pair(s) from {} image(s), {} skipped, {} candidate(s) in {:.2?}",
        records.len(),
        summary.images_hashed,
        summary.skipped.len(),
        summary.lsh.candidate_pairs,
        summary.scan_duration
    )?;
    if !summary.skipped.is_empty() {
        writeln!(out, "{}", "Skipped (not images):".yellow())?;
        for path in &summary.skipped {
            writeln!(out, "  {}", path.display())?;
        }
    }
    if let Some(ref report_dir) = args.report_dir {
        writeln!(out, "Report written to {}", report_dir.display())?;
    }
    Ok(())
}

fn run_compare(args: &CompareArgs, mut config: Config) -> anyhow::Result<ExitCode> {
    config.apply_compare_overrides(args);

    // A single band: banding plays no part in a direct comparison
    config.algorithm.check_hash_size(config.hash_size)?;
    let params = LshParams::new(config.threshold, 1, config.hash_size)?;
    let finder = NearDuplicateFinder::new(
        FinderConfig::default()
            .with_params(params)
            .with_algorithm(config.algorithm),
    );

    let comparison = finder
        .compare(&args.first, &args.second)
        .context("comparison failed")?;
    let near = passes_threshold(comparison.similarity, params.threshold());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Image 1: {}", args.first.display())?;
    writeln!(out, "Image 2: {}", args.second.display())?;
    writeln!(
        out,
        "Hamming distance: {} / {} bits ({})",
        comparison.distance, comparison.total_bits, config.algorithm
    )?;
    let verdict = if near {
        "near-duplicates".green().to_string()
    } else {
        "different".red().to_string()
    };
    writeln!(
        out,
        "Similarity: {:.4} ({} at threshold {:.2})",
        comparison.similarity,
        verdict,
        params.threshold()
    )?;

    Ok(if near {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    })
}
