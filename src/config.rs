//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, else `config.toml` in the platform
//!    config directory when it exists)
//! 3. environment variables prefixed with `LSHDUPE_` (`__` for nesting)
//! 4. command-line flags ([`Config::apply_overrides`])

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{CompareArgs, ScanArgs};
use crate::duplicates::{FinderConfig, LshError, LshParams};
use crate::scanner::{HashAlgorithm, WalkerConfig};

/// Errors raised while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// A layer holds malformed or mistyped values.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The merged values are out of range.
    #[error(transparent)]
    Parameters(#[from] LshError),

    /// Writing the config file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serializing to TOML failed.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Similarity a pair must strictly exceed.
    pub threshold: f64,
    /// Perceptual hash algorithm.
    pub algorithm: HashAlgorithm,
    /// Hash edge length; signatures have `hash_size²` bits.
    pub hash_size: u32,
    /// Number of LSH bands.
    pub bands: usize,
    /// Number of I/O threads for signature computation.
    pub io_threads: usize,
    /// Skip hidden files.
    pub skip_hidden: bool,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Delete permanently instead of moving to trash.
    pub permanent_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            algorithm: HashAlgorithm::Phash,
            hash_size: 32,
            bands: 32,
            io_threads: 4,
            skip_hidden: false,
            follow_symlinks: false,
            permanent_delete: false,
        }
    }
}

impl Config {
    /// Load configuration from defaults, file and environment.
    ///
    /// With `path` set, the file must exist. Without it, the default
    /// platform file is used only when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing or a layer holds
    /// values of the wrong shape, such as an unknown algorithm name.
    pub fn load_from_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.is_file() => return Err(ConfigError::FileNotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            log::debug!("Loading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed("LSHDUPE_").split("__"));

        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Save the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Write`] or [`ConfigError::Serialize`].
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)
    }

    /// Platform config file path, e.g. `~/.config/lshdupe/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "lshdupe", "lshdupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply scan flags on top of the loaded layers.
    pub fn apply_overrides(&mut self, args: &ScanArgs) {
        if let Some(threshold) = args.threshold {
            self.threshold = threshold;
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(hash_size) = args.hash_size {
            self.hash_size = hash_size;
        }
        if let Some(bands) = args.bands {
            self.bands = bands;
        }
        if let Some(io_threads) = args.io_threads {
            self.io_threads = io_threads;
        }
        self.skip_hidden |= args.skip_hidden;
        self.follow_symlinks |= args.follow_symlinks;
        self.permanent_delete |= args.permanent;
    }

    /// Apply compare flags on top of the loaded layers.
    pub fn apply_compare_overrides(&mut self, args: &CompareArgs) {
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(hash_size) = args.hash_size {
            self.hash_size = hash_size;
        }
    }

    /// Validate the LSH parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parameters`] for an out-of-range threshold,
    /// hash size or band count, or a hash size the algorithm cannot use.
    pub fn lsh_params(&self) -> Result<LshParams, ConfigError> {
        self.algorithm.check_hash_size(self.hash_size)?;
        Ok(LshParams::new(self.threshold, self.bands, self.hash_size)?)
    }

    /// Build the finder configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Config::lsh_params`].
    pub fn finder_config(&self) -> Result<FinderConfig, ConfigError> {
        Ok(FinderConfig::default()
            .with_params(self.lsh_params()?)
            .with_algorithm(self.algorithm)
            .with_io_threads(self.io_threads)
            .with_walker_config(WalkerConfig::new(self.follow_symlinks, self.skip_hidden)))
    }
}
