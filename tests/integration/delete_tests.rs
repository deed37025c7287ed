use lshdupe::actions::{delete_batch, select_for_deletion, validate_selection, DeleteMode};
use lshdupe::duplicates::{FinderConfig, LshParams, NearDuplicateFinder};
use lshdupe::scanner::HashAlgorithm;
use tempfile::tempdir;

use super::fixtures::{copy_file, pattern_image, save_png};

#[test]
fn test_permanent_delete_keeps_one_of_each_pair() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(48, 48, 0));
    let b = copy_file(&a, dir.path(), "b.png");
    let c = copy_file(&a, dir.path(), "c.png");

    let finder = NearDuplicateFinder::new(
        FinderConfig::default()
            .with_params(LshParams::new(0.7, 8, 8).unwrap())
            .with_algorithm(HashAlgorithm::Dhash),
    );
    let (records, _) = finder.find_near_duplicates(dir.path()).unwrap();
    assert_eq!(records.len(), 3);

    let selected = select_for_deletion(&records);
    assert_eq!(selected, vec![b.clone(), c.clone()]);
    validate_selection(&records, &selected).unwrap();

    let result = delete_batch(&selected, DeleteMode::Permanent);
    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 2);
    assert!(result.bytes_freed > 0);

    assert!(a.exists());
    assert!(!b.exists());
    assert!(!c.exists());
}

#[test]
fn test_batch_continues_after_failure() {
    let dir = tempdir().unwrap();
    let a = save_png(dir.path(), "a.png", &pattern_image(16, 16, 0));
    let missing = dir.path().join("gone.png");

    let result = delete_batch(&[missing.clone(), a.clone()], DeleteMode::Permanent);

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failures[0].path(), missing.as_path());
    assert!(!a.exists());
}
