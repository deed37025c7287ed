use lshdupe::duplicates::{FinderConfig, FinderError, LshParams, NearDuplicateFinder};
use lshdupe::scanner::{HashAlgorithm, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use super::fixtures::{copy_file, pattern_image, save_png, write_text};

fn small_finder(walker: WalkerConfig) -> NearDuplicateFinder {
    let config = FinderConfig::default()
        .with_params(LshParams::new(0.7, 8, 8).unwrap())
        .with_algorithm(HashAlgorithm::Dhash)
        .with_io_threads(2)
        .with_walker_config(walker);
    NearDuplicateFinder::new(config)
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (records, summary) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.lsh.candidate_pairs, 0);
}

#[test]
fn test_scan_finds_identical_copies() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(64, 48, 0));
    let b = copy_file(&a, dir.path(), "b.png");

    let (records, summary) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.images_hashed, 2);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id_a, a);
    assert_eq!(records[0].id_b, b);
    assert_eq!(records[0].similarity, 1.0);
    assert_eq!(records[0].distance, 0);
}

#[test]
fn test_scan_skips_non_images_and_succeeds() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(40, 40, 1));
    copy_file(&a, dir.path(), "b.png");
    let notes = write_text(dir.path(), "notes.png");

    let (records, summary) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.images_hashed, 2);
    assert_eq!(summary.skipped, vec![notes.clone()]);
    assert!(records
        .iter()
        .all(|r| r.id_a != notes && r.id_b != notes));
    assert_eq!(records.len(), 1);
}

#[test]
fn test_scan_sniffs_format_from_content() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(32, 32, 0));
    let disguised = copy_file(&a, dir.path(), "photo.dat");

    let (records, summary) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();

    assert!(summary.skipped.is_empty());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id_b, disguised);
}

#[test]
fn test_scan_is_not_recursive() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(32, 32, 0));
    let sub = dir.path().join("nested");
    fs::create_dir(&sub).unwrap();
    copy_file(&a, &sub, "a_copy.png");

    let (records, summary) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(records.is_empty());
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(32, 32, 0));
    copy_file(&a, dir.path(), ".a_copy.png");

    let (records, _) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();
    assert_eq!(records.len(), 1);

    let (records, summary) = small_finder(WalkerConfig::new(false, true))
        .find_near_duplicates(dir.path())
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_results_are_ranked_and_canonical() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(64, 64, 0));
    copy_file(&a, dir.path(), "c.png");
    let b = save_png(dir.path(), "b.png", &pattern_image(48, 48, 0));
    copy_file(&b, dir.path(), "d.png");
    save_png(dir.path(), "e.png", &pattern_image(64, 64, 1));

    let (records, summary) = small_finder(WalkerConfig::default())
        .find_near_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.images_hashed, 5);
    assert!(records.len() >= 2);
    for window in records.windows(2) {
        assert!(window[0].similarity >= window[1].similarity);
    }
    for record in &records {
        assert!(record.id_a < record.id_b);
        assert!(record.similarity > 0.7);
    }
    let pairs: Vec<(PathBuf, PathBuf)> = records
        .iter()
        .map(|r| (r.id_a.clone(), r.id_b.clone()))
        .collect();
    assert!(pairs.contains(&(a, dir.path().join("c.png"))));
    assert!(pairs.contains(&(b, dir.path().join("d.png"))));
}

#[test]
fn test_scan_missing_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let err = small_finder(WalkerConfig::default())
        .find_near_duplicates(&dir.path().join("absent"))
        .unwrap_err();

    assert!(matches!(err, FinderError::PathNotFound(_)));
    assert!(err.is_input_unavailable());
}

#[test]
fn test_scan_file_path_is_fatal() {
    let dir = tempdir().unwrap();
    let file = write_text(dir.path(), "file.txt");

    let err = small_finder(WalkerConfig::default())
        .find_near_duplicates(&file)
        .unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_compare_identical_images() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(50, 30, 0));
    let b = copy_file(&a, dir.path(), "b.png");

    let comparison = small_finder(WalkerConfig::default()).compare(&a, &b).unwrap();
    assert_eq!(comparison.distance, 0);
    assert_eq!(comparison.total_bits, 64);
    assert_eq!(comparison.similarity, 1.0);
}

#[test]
fn test_compare_rejects_non_image() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(50, 30, 0));
    let notes = write_text(dir.path(), "notes.txt");

    let err = small_finder(WalkerConfig::default())
        .compare(&a, &notes)
        .unwrap_err();
    assert!(matches!(err, FinderError::Signature(ref e) if e.is_skippable()));
}
