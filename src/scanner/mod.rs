//! Scanner module for directory listing and image signatures.
//!
//! This module provides functionality for:
//! - Listing the regular files of one directory (non-recursive)
//! - Computing perceptual hash signatures of image files
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Single-level directory listing
//! - [`perceptual`]: Perceptual hashing into bit signatures
//! - [`wavelet`]: Haar wavelet hash computed directly on the luma grid
//!
//! # Example
//!
//! ```no_run
//! use lshdupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}", file.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod perceptual;
pub mod walker;
pub mod wavelet;

use std::path::PathBuf;

// Re-export main types
pub use perceptual::{HashAlgorithm, PerceptualHasher, SignatureError, SignatureProvider};
pub use walker::Walker;

/// A regular file found in the scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file
    pub path: PathBuf,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Configuration for directory listing.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links to regular files.
    pub follow_symlinks: bool,

    /// Skip hidden files (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
        }
    }
}

/// Errors that can occur during directory listing.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file disappeared while listing.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The directory itself could not be listed.
    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        /// Directory that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Returns true if the whole listing failed rather than one entry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DirectoryUnreadable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new() {
        let entry = FileEntry::new(PathBuf::from("/test/file.png"));

        assert_eq!(entry.path, PathBuf::from("/test/file.png"));
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(!config.follow_symlinks);
        assert!(!config.skip_hidden);
    }

    #[test]
    fn test_walker_config_new() {
        let config = WalkerConfig::new(true, true);

        assert!(config.follow_symlinks);
        assert!(config.skip_hidden);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");
    }

    #[test]
    fn test_scan_error_fatality() {
        let err = ScanError::DirectoryUnreadable {
            path: PathBuf::from("/dir"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_fatal());
        assert!(!ScanError::NotFound(PathBuf::from("/x")).is_fatal());
    }
}
