//! JSON output formatter for near-duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "parameters": { "algorithm": "phash", "hash_size": 32, "bands": 32, "rows": 32, "threshold": 0.7 },
//!   "near_duplicates": [
//!     { "rank": 1, "file_a": "/p/a.jpg", "file_b": "/p/b.jpg", "similarity": 0.98, "hamming_distance": 20 }
//!   ],
//!   "skipped": ["/p/notes.txt"],
//!   "deletion": {
//!     "mode": "trash",
//!     "deleted": ["/p/b.jpg"],
//!     "failures": [],
//!     "bytes_freed": 48213
//!   },
//!   "summary": {
//!     "total_files": 3,
//!     "images_hashed": 2,
//!     "candidate_pairs": 1,
//!     "near_duplicates": 1,
//!     "exit_code": 0,
//!     "exit_code_name": "LD000"
//!   }
//! }
//! ```
//!
//! `deletion` is present only when `--delete` ran.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::actions::{BatchDeleteResult, DeleteMode};
use crate::duplicates::{LshParams, NearDuplicate, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::HashAlgorithm;

/// One ranked pair in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    /// 1-based position in the ranking
    pub rank: usize,
    /// Smaller path of the pair
    pub file_a: String,
    /// Larger path of the pair
    pub file_b: String,
    /// Normalized Hamming similarity
    pub similarity: f64,
    /// Differing bits
    pub hamming_distance: u32,
}

/// Run parameters in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonParameters {
    /// Hashing algorithm
    pub algorithm: HashAlgorithm,
    /// Hash edge length
    pub hash_size: u32,
    /// Number of bands
    pub bands: usize,
    /// Bits per band
    pub rows: usize,
    /// Similarity threshold (exclusive)
    pub threshold: f64,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Regular files found
    pub total_files: usize,
    /// Files that produced a signature
    pub images_hashed: usize,
    /// Files skipped as non-images
    pub skipped_files: usize,
    /// Entries that could not be listed
    pub scan_errors: usize,
    /// Buckets holding two or more images
    pub shared_buckets: usize,
    /// Size of the most populated bucket
    pub largest_bucket: usize,
    /// Unique candidate pairs
    pub candidate_pairs: usize,
    /// Pairs above the threshold
    pub near_duplicates: usize,
    /// Duration of the signature phase in milliseconds
    pub signature_duration_ms: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "LD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            images_hashed: summary.images_hashed,
            skipped_files: summary.skipped.len(),
            scan_errors: summary.scan_errors.len(),
            shared_buckets: summary.lsh.buckets.shared_buckets,
            largest_bucket: summary.lsh.buckets.largest_bucket,
            candidate_pairs: summary.lsh.candidate_pairs,
            near_duplicates: summary.near_duplicates,
            signature_duration_ms: summary.signature_duration.as_millis() as u64,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A file that could not be deleted.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeleteFailure {
    /// File that stayed in place
    pub path: String,
    /// Why the deletion failed
    pub error: String,
}

/// Outcome of the deletion step.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeletion {
    /// Trash or permanent
    pub mode: DeleteMode,
    /// Files that were removed, in selection order
    pub deleted: Vec<String>,
    /// Files that could not be removed
    pub failures: Vec<JsonDeleteFailure>,
    /// Bytes freed by the removed files
    pub bytes_freed: u64,
}

impl JsonDeletion {
    /// Convert a batch result.
    #[must_use]
    pub fn from_batch(result: &BatchDeleteResult, mode: DeleteMode) -> Self {
        Self {
            mode,
            deleted: result
                .successes
                .iter()
                .map(|d| d.path.to_string_lossy().into_owned())
                .collect(),
            failures: result
                .failures
                .iter()
                .map(|e| JsonDeleteFailure {
                    path: e.path().to_string_lossy().into_owned(),
                    error: e.to_string(),
                })
                .collect(),
            bytes_freed: result.bytes_freed,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the document was produced
    pub generated_at: DateTime<Utc>,
    /// Parameters of the run
    pub parameters: JsonParameters,
    /// Ranked near-duplicate pairs
    pub near_duplicates: Vec<JsonRecord>,
    /// Files skipped as non-images
    pub skipped: Vec<String>,
    /// Deletion outcome, when deletion ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion: Option<JsonDeletion>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document from ranked records and the scan summary.
    #[must_use]
    pub fn new(
        records: &[NearDuplicate<PathBuf>],
        summary: &ScanSummary,
        params: &LshParams,
        algorithm: HashAlgorithm,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            parameters: JsonParameters {
                algorithm,
                hash_size: params.hash_size(),
                bands: params.bands(),
                rows: params.rows(),
                threshold: params.threshold(),
            },
            near_duplicates: records
                .iter()
                .enumerate()
                .map(|(idx, record)| JsonRecord {
                    rank: idx + 1,
                    file_a: record.id_a.to_string_lossy().into_owned(),
                    file_b: record.id_b.to_string_lossy().into_owned(),
                    similarity: record.similarity,
                    hamming_distance: record.distance,
                })
                .collect(),
            skipped: summary
                .skipped
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            deletion: None,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Attach the deletion outcome.
    #[must_use]
    pub fn with_deletion(mut self, deletion: JsonDeletion) -> Self {
        self.deletion = Some(deletion);
        self
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            serde_json::to_string(self)?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
