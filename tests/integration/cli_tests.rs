use clap::Parser;
use lshdupe::cli::Cli;
use lshdupe::error::ExitCode;
use lshdupe::run_app;
use std::path::Path;
use std::sync::PoisonError;
use tempfile::tempdir;

use super::fixtures::{copy_file, empty_config, pattern_image, save_png, write_text};
use crate::ENV_MUTEX;

fn run(config: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec![
        "lshdupe",
        "--quiet",
        "--no-color",
        "--config",
        config.to_str().unwrap(),
    ];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let _lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    run_app(cli)
}

#[test]
fn test_scan_with_duplicates_succeeds() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    let a = save_png(&photos, "a.png", &pattern_image(40, 40, 0));
    copy_file(&a, &photos, "b.png");

    let code = run(
        &config,
        &["scan", photos.to_str().unwrap(), "--hash-size", "8", "--bands", "8", "-o", "json"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_without_duplicates() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    write_text(&photos, "readme.txt");

    let code = run(
        &config,
        &["scan", photos.to_str().unwrap(), "--hash-size", "8", "--bands", "8"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let missing = dir.path().join("nowhere");

    let result = run(&config, &["scan", missing.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_scan_invalid_bands_fails() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());

    let result = run(
        &config,
        &["scan", dir.path().to_str().unwrap(), "--hash-size", "8", "--bands", "5"],
    );
    assert!(result.is_err());
}

#[test]
fn test_scan_delete_permanent() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    let a = save_png(&photos, "a.png", &pattern_image(40, 40, 0));
    let b = copy_file(&a, &photos, "b.png");

    let code = run(
        &config,
        &[
            "scan",
            photos.to_str().unwrap(),
            "--hash-size",
            "8",
            "--bands",
            "8",
            "-o",
            "csv",
            "--delete",
            "--permanent",
            "-y",
        ],
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
}

#[test]
fn test_scan_writes_report() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    let a = save_png(&photos, "a.png", &pattern_image(24, 24, 0));
    copy_file(&a, &photos, "b.png");
    let report = dir.path().join("report");

    let code = run(
        &config,
        &[
            "scan",
            photos.to_str().unwrap(),
            "--hash-size",
            "8",
            "--bands",
            "8",
            "--report-dir",
            report.to_str().unwrap(),
        ],
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(report.join("images").join("pair_0.jpg").is_file());
    assert!(report.join("text").join("pair_0.txt").is_file());
}

#[test]
fn test_compare_identical() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let a = save_png(dir.path(), "a.png", &pattern_image(24, 24, 0));
    let b = copy_file(&a, dir.path(), "b.png");

    let code = run(
        &config,
        &["compare", a.to_str().unwrap(), b.to_str().unwrap(), "--hash-size", "8"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_report_failure_is_partial_success() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    let a = save_png(&photos, "a.png", &pattern_image(24, 24, 0));
    copy_file(&a, &photos, "b.png");
    copy_file(&a, &photos, "c.png");

    // A directory where the first composite should go makes that pair fail
    let report = dir.path().join("report");
    std::fs::create_dir_all(report.join("images").join("pair_0.jpg")).unwrap();

    let code = run(
        &config,
        &[
            "scan",
            photos.to_str().unwrap(),
            "--hash-size",
            "8",
            "--bands",
            "8",
            "-o",
            "json",
            "--report-dir",
            report.to_str().unwrap(),
        ],
    )
    .unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert!(!report.join("text").join("pair_0.txt").exists());
    for index in 1..3 {
        assert!(report.join("images").join(format!("pair_{index}.jpg")).is_file());
        assert!(report.join("text").join(format!("pair_{index}.txt")).is_file());
    }
}

#[test]
fn test_scan_json_delete_succeeds() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    let a = save_png(&photos, "a.png", &pattern_image(24, 24, 0));
    let b = copy_file(&a, &photos, "b.png");
    let c = copy_file(&a, &photos, "c.png");

    let code = run(
        &config,
        &[
            "scan",
            photos.to_str().unwrap(),
            "--hash-size",
            "8",
            "--bands",
            "8",
            "-o",
            "json",
            "--delete",
            "--permanent",
            "-y",
        ],
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(!c.exists());
}

#[test]
fn test_compare_whash_rejects_odd_hash_size() {
    let dir = tempdir().unwrap();
    let config = empty_config(dir.path());
    let a = save_png(dir.path(), "a.png", &pattern_image(24, 24, 0));
    let b = copy_file(&a, dir.path(), "b.png");

    let result = run(
        &config,
        &[
            "compare",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "-a",
            "whash",
            "--hash-size",
            "12",
        ],
    );
    assert!(result.is_err());

    let code = run(
        &config,
        &["compare", a.to_str().unwrap(), b.to_str().unwrap(), "-a", "whash", "--hash-size", "8"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}
