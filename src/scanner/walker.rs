//! Single-level directory listing using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which lists the regular files
//! directly inside one directory. Subdirectories are not descended into.
//! Entries come back sorted by file name so runs are reproducible.
//!
//! # Example
//!
//! ```no_run
//! use lshdupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Lists the files of one directory.
#[derive(Debug)]
pub struct Walker {
    /// Directory to list
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given directory.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Iterate over the regular files in the directory.
    ///
    /// Failures on single entries are yielded as [`ScanError`] values; a
    /// failure to read the directory itself is yielded as
    /// [`ScanError::DirectoryUnreadable`].
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if self.config.skip_hidden && is_hidden(path) {
                        log::trace!("Skipping hidden file: {}", path.display());
                        return None;
                    }

                    // With follow_links set, file_type() already describes the target
                    if !entry.file_type().is_file() {
                        log::trace!("Skipping non-regular entry: {}", path.display());
                        return None;
                    }

                    Some(Ok(FileEntry::new(entry.into_path())))
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        let at_root = error.depth() == 0;
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let source = match error.into_io_error() {
            Some(io) => io,
            None => std::io::Error::other("filesystem loop detected"),
        };

        if at_root {
            log::error!("Cannot read directory {}: {}", path.display(), source);
            return ScanError::DirectoryUnreadable { path, source };
        }

        match source.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), source);
                ScanError::Io { path, source }
            }
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
