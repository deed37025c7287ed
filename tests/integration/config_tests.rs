use lshdupe::config::{Config, ConfigError};
use lshdupe::scanner::HashAlgorithm;
use std::env;
use std::fs;
use std::sync::PoisonError;
use tempfile::tempdir;

use crate::ENV_MUTEX;

const ENV_KEYS: [&str; 4] = [
    "LSHDUPE_THRESHOLD",
    "LSHDUPE_ALGORITHM",
    "LSHDUPE_BANDS",
    "LSHDUPE_HASH_SIZE",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

#[test]
fn test_config_file_layer() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
            threshold = 0.85
            algorithm = "dhash"
            hash_size = 16
            bands = 64
        "#,
    )
    .unwrap();

    let config = Config::load_from_path(Some(&path)).unwrap();
    assert_eq!(config.threshold, 0.85);
    assert_eq!(config.algorithm, HashAlgorithm::Dhash);
    assert_eq!(config.hash_size, 16);
    assert_eq!(config.bands, 64);
    assert_eq!(config.io_threads, 4);

    let params = config.lsh_params().unwrap();
    assert_eq!(params.rows(), 4);
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = 0.85\nbands = 16\n").unwrap();

    env::set_var("LSHDUPE_THRESHOLD", "0.95");
    env::set_var("LSHDUPE_ALGORITHM", "ahash");
    let result = Config::load_from_path(Some(&path));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.threshold, 0.95);
    assert_eq!(config.algorithm, HashAlgorithm::Ahash);
    assert_eq!(config.bands, 16);
}

#[test]
fn test_unknown_algorithm_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "algorithm = \"sha256\"\n").unwrap();

    let err = Config::load_from_path(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_missing_explicit_file() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_path(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn test_indivisible_bands_fail_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "hash_size = 8\nbands = 7\n").unwrap();

    let config = Config::load_from_path(Some(&path)).unwrap();
    assert!(matches!(
        config.lsh_params(),
        Err(ConfigError::Parameters(_))
    ));
    assert!(config.finder_config().is_err());
}

#[test]
fn test_save_then_load() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = Config {
        threshold: 0.9,
        algorithm: HashAlgorithm::Mhash,
        hash_size: 8,
        bands: 8,
        io_threads: 2,
        skip_hidden: true,
        follow_symlinks: false,
        permanent_delete: false,
    };

    config.save(&path).unwrap();
    let loaded = Config::load_from_path(Some(&path)).unwrap();
    assert_eq!(loaded, config);
}
