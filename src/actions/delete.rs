//! Deletion of near-duplicate images.
//!
//! # Overview
//!
//! - [`select_for_deletion`] picks one side of every ranked pair so that each
//!   deleted file keeps at least one near-duplicate on disk
//! - [`delete_to_trash`] moves a file to the system trash (recoverable)
//! - [`permanent_delete`] removes a file for good
//! - [`delete_batch`] runs either over a list, never stopping at a failure
//!
//! # Example
//!
//! ```no_run
//! use lshdupe::actions::delete::{delete_batch, select_for_deletion, DeleteMode};
//! use lshdupe::duplicates::NearDuplicate;
//! use std::path::PathBuf;
//!
//! let records: Vec<NearDuplicate<PathBuf>> = Vec::new();
//! let doomed = select_for_deletion(&records);
//! let result = delete_batch(&doomed, DeleteMode::Trash);
//! println!("{}", result.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde::Serialize;
use thiserror::Error;

use crate::duplicates::NearDuplicate;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File that stayed in place
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {source}")]
    PermanentDeleteFailed {
        /// File that stayed in place
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A selected file has no kept near-duplicate.
    #[error("{0} would be deleted without keeping any of its near-duplicates")]
    NoKeptNeighbor(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being inspected
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NoKeptNeighbor(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Where deleted files go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// System trash, recoverable.
    #[default]
    Trash,
    /// Removed from disk.
    Permanent,
}

impl DeleteMode {
    /// Trash unless `permanent` is set.
    #[must_use]
    pub fn from_permanent(permanent: bool) -> Self {
        if permanent {
            Self::Permanent
        } else {
            Self::Trash
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// How the file was deleted.
    pub mode: DeleteMode,
}

/// Results of a batch deletion.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions.
    pub failures: Vec<DeleteError>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Choose the files to delete from ranked records.
///
/// Records are walked in order. The first file of a pair that is not yet
/// slated for deletion becomes a keeper, and the second is slated unless it
/// is a keeper. If the first file is already slated, the second becomes a
/// keeper. Keepers are never slated afterwards, so every returned path has
/// at least one near-duplicate that stays.
///
/// Paths are returned once each, in the order they were slated.
#[must_use]
pub fn select_for_deletion(records: &[NearDuplicate<PathBuf>]) -> Vec<PathBuf> {
    let mut keepers: HashSet<&Path> = HashSet::new();
    let mut slated: HashSet<&Path> = HashSet::new();
    let mut order = Vec::new();

    for record in records {
        let (a, b) = (record.id_a.as_path(), record.id_b.as_path());

        if !slated.contains(a) {
            keepers.insert(a);
            if !keepers.contains(b) && slated.insert(b) {
                order.push(b.to_path_buf());
            }
        } else if !slated.contains(b) {
            keepers.insert(b);
        }
    }

    log::debug!(
        "Deletion selection: {} to delete, {} kept",
        order.len(),
        keepers.len()
    );
    order
}

/// Check that every selected path keeps a near-duplicate on disk.
///
/// # Errors
///
/// Returns [`DeleteError::NoKeptNeighbor`] for the first selected path
/// whose every partner is also selected.
pub fn validate_selection(
    records: &[NearDuplicate<PathBuf>],
    selected: &[PathBuf],
) -> Result<(), DeleteError> {
    let selected_set: HashSet<&Path> = selected.iter().map(PathBuf::as_path).collect();

    for path in selected {
        let has_kept_neighbor = records.iter().any(|r| {
            (r.id_a == *path && !selected_set.contains(r.id_b.as_path()))
                || (r.id_b == *path && !selected_set.contains(r.id_a.as_path()))
        });
        if !has_kept_neighbor {
            log::error!("Refusing selection: {} has no kept partner", path.display());
            return Err(DeleteError::NoKeptNeighbor(path.clone()));
        }
    }
    Ok(())
}

fn file_size(path: &Path) -> Result<u64, DeleteError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
            _ => DeleteError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `TrashFailed` if the trash backend refuses the file
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::info!("Moved to trash: {} ({})", path.display(), ByteSize::b(size));
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode: DeleteMode::Trash,
    })
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `PermanentDeleteFailed` if removal fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|source| DeleteError::PermanentDeleteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Permanently deleted: {} ({})",
        path.display(),
        ByteSize::b(size)
    );
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode: DeleteMode::Permanent,
    })
}

/// Delete every path, logging each outcome.
///
/// A failure on one file never stops the remaining deletions.
#[must_use]
pub fn delete_batch(paths: &[PathBuf], mode: DeleteMode) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        let outcome = match mode {
            DeleteMode::Trash => delete_to_trash(path),
            DeleteMode::Permanent => permanent_delete(path),
        };

        match outcome {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path.display(), e);
                result.failures.push(e);
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
