use lshdupe::duplicates::{FinderConfig, LshParams, NearDuplicate, NearDuplicateFinder};
use lshdupe::output::build_report;
use lshdupe::scanner::HashAlgorithm;
use std::fs;
use tempfile::tempdir;

use super::fixtures::{copy_file, pattern_image, save_png};

#[test]
fn test_report_for_scan_results() {
    let photos = tempdir().unwrap();
    let a = save_png(photos.path(), "a.png", &pattern_image(30, 20, 0));
    let b = copy_file(&a, photos.path(), "b.png");

    let finder = NearDuplicateFinder::new(
        FinderConfig::default()
            .with_params(LshParams::new(0.7, 8, 8).unwrap())
            .with_algorithm(HashAlgorithm::Dhash),
    );
    let (records, _) = finder.find_near_duplicates(photos.path()).unwrap();

    let out = tempdir().unwrap();
    let summary = build_report(&records, out.path()).unwrap();
    assert!(summary.is_complete());
    assert_eq!(summary.pairs_written, 1);

    let composite = image::open(out.path().join("images").join("pair_0.jpg")).unwrap();
    assert_eq!(composite.width(), 60);
    assert_eq!(composite.height(), 20);

    let note = fs::read_to_string(out.path().join("text").join("pair_0.txt")).unwrap();
    assert!(note.contains(&a.display().to_string()));
    assert!(note.contains(&b.display().to_string()));
    assert!(note.contains("Similarity: 1.0"));
}

#[test]
fn test_report_records_failed_pairs() {
    let photos = tempdir().unwrap();
    let a = save_png(photos.path(), "a.png", &pattern_image(10, 10, 0));
    let b = copy_file(&a, photos.path(), "b.png");
    let records = vec![
        NearDuplicate {
            id_a: a.clone(),
            id_b: photos.path().join("vanished.png"),
            similarity: 0.9,
            distance: 6,
        },
        NearDuplicate {
            id_a: a,
            id_b: b,
            similarity: 0.8,
            distance: 12,
        },
    ];

    let out = tempdir().unwrap();
    let summary = build_report(&records, out.path()).unwrap();

    assert!(!summary.is_complete());
    assert_eq!(summary.pairs_written, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].index, 0);
    assert!(out.path().join("images").join("pair_1.jpg").is_file());
    assert!(!out.path().join("images").join("pair_0.jpg").exists());
}

#[test]
fn test_empty_report_creates_directories() {
    let out = tempdir().unwrap();
    let root = out.path().join("report");

    let summary = build_report(&[], &root).unwrap();

    assert_eq!(summary.pairs_written, 0);
    assert!(root.join("images").is_dir());
    assert!(root.join("text").is_dir());
}
