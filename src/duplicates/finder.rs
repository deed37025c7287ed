//! Near-duplicate finder orchestrating the LSH pipeline.
//!
//! # Overview
//!
//! This module ties the stages together:
//! 1. **Enumerate** - List the regular files of the input directory
//! 2. **Signatures** - Hash every file on a bounded I/O pool
//! 3. **Bucket** - Cut signatures into bands (see [`crate::duplicates::buckets`])
//! 4. **Candidates** - Pair ids sharing a bucket (see [`crate::duplicates::candidates`])
//! 5. **Score & rank** - Confirm pairs on the full signature (see [`crate::duplicates::scoring`])
//!
//! The in-memory core, [`find_near_duplicates`], works on any orderable id
//! type and is independent of the filesystem.
//!
//! # Example
//!
//! ```no_run
//! use lshdupe::duplicates::{FinderConfig, LshParams, NearDuplicateFinder};
//! use std::path::Path;
//!
//! let params = LshParams::new(0.8, 16, 8).unwrap();
//! let finder = NearDuplicateFinder::new(FinderConfig::default().with_params(params));
//!
//! let (records, summary) = finder.find_near_duplicates(Path::new("/photos")).unwrap();
//! for record in &records {
//!     println!("{} ~ {} ({:.2})", record.id_a.display(), record.id_b.display(), record.similarity);
//! }
//! println!("{} images hashed", summary.images_hashed);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::buckets::{BandBuckets, BucketStats};
use super::candidates::generate_candidates;
use super::scoring::{rank, score_candidates, NearDuplicate, ScoreStats};
use super::signature::{LshError, LshParams, Signature};
use crate::progress::ProgressCallback;
use crate::scanner::{
    HashAlgorithm, PerceptualHasher, ScanError, SignatureError, SignatureProvider, Walker,
    WalkerConfig,
};

/// Counts gathered by one pass of the LSH core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LshStats {
    /// Bucket table statistics
    pub buckets: BucketStats,
    /// Unique candidate pairs produced by banding
    pub candidate_pairs: usize,
    /// Scoring outcome
    pub scoring: ScoreStats,
}

/// Find near-duplicate pairs among precomputed signatures.
///
/// Returns records with `id_a < id_b`, sorted by descending similarity.
///
/// # Errors
///
/// - [`LshError::LengthMismatch`] if a signature is not `hash_size²` bits
/// - [`LshError::DuplicateId`] if an id appears twice
pub fn find_near_duplicates<Id>(
    signatures: Vec<(Id, Signature)>,
    params: &LshParams,
) -> Result<Vec<NearDuplicate<Id>>, LshError>
where
    Id: Ord + Hash + Clone + Send + Sync + Debug,
{
    run_lsh(signatures, params, None).map(|(records, _)| records)
}

/// Like [`find_near_duplicates`], also returning per-stage counts.
///
/// # Errors
///
/// Same as [`find_near_duplicates`].
pub fn find_near_duplicates_with_stats<Id>(
    signatures: Vec<(Id, Signature)>,
    params: &LshParams,
) -> Result<(Vec<NearDuplicate<Id>>, LshStats), LshError>
where
    Id: Ord + Hash + Clone + Send + Sync + Debug,
{
    run_lsh(signatures, params, None)
}

fn run_lsh<Id>(
    signatures: Vec<(Id, Signature)>,
    params: &LshParams,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<(Vec<NearDuplicate<Id>>, LshStats), LshError>
where
    Id: Ord + Hash + Clone + Send + Sync + Debug,
{
    let mut seen = HashSet::with_capacity(signatures.len());
    for (id, _) in &signatures {
        if !seen.insert(id) {
            return Err(LshError::DuplicateId(format!("{id:?}")));
        }
    }

    let buckets = BandBuckets::build(&signatures, params)?;
    let candidates = generate_candidates(&buckets);
    let store: HashMap<Id, Signature> = signatures.into_iter().collect();

    if let Some(callback) = progress {
        callback.on_phase_start("scoring", candidates.len());
    }
    let scored = score_candidates(&candidates, &store, params);
    if let Some(callback) = progress {
        callback.on_progress(candidates.len(), "");
        callback.on_phase_end("scoring");
    }
    let (mut records, scoring) = scored?;

    rank(&mut records);

    let stats = LshStats {
        buckets: buckets.stats(),
        candidate_pairs: candidates.len(),
        scoring,
    };

    log::debug!(
        "LSH: {} bands × {} rows, {} shared buckets, {} candidates, {} accepted",
        stats.buckets.bands,
        stats.buckets.rows,
        stats.buckets.shared_buckets,
        stats.candidate_pairs,
        stats.scoring.accepted
    );

    Ok((records, stats))
}

/// Configuration for the near-duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// LSH threshold, band count and hash size.
    pub params: LshParams,
    /// Perceptual hashing algorithm.
    pub algorithm: HashAlgorithm,
    /// Number of I/O threads for signature computation.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Directory listing options.
    pub walker_config: WalkerConfig,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("params", &self.params)
            .field("algorithm", &self.algorithm)
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            params: LshParams::default(),
            algorithm: HashAlgorithm::default(),
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the LSH parameters.
    #[must_use]
    pub fn with_params(mut self, params: LshParams) -> Self {
        self.params = params;
        self
    }

    /// Set the hashing algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the directory listing options.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a directory scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Regular files found in the directory
    pub total_files: usize,
    /// Files that produced a signature
    pub images_hashed: usize,
    /// Files skipped because they are not decodable images
    pub skipped: Vec<PathBuf>,
    /// Entries that could not be listed
    pub scan_errors: Vec<ScanError>,
    /// Bucket, candidate and scoring counts
    pub lsh: LshStats,
    /// Confirmed near-duplicate pairs
    pub near_duplicates: usize,
    /// Time spent computing signatures
    pub signature_duration: Duration,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

/// Result of comparing two images directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairComparison {
    /// Differing bits
    pub distance: u32,
    /// Normalized Hamming similarity
    pub similarity: f64,
    /// Bits per signature
    pub total_bits: usize,
}

/// Errors that can occur during near-duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Input directory not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Input is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The directory could not be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A file could not be hashed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The LSH core rejected its input.
    #[error(transparent)]
    Lsh(#[from] LshError),
}

impl FinderError {
    /// Returns true if the input directory itself was unusable.
    #[must_use]
    pub fn is_input_unavailable(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound(_) | Self::NotADirectory(_) | Self::Scan(_)
        )
    }
}

/// Near-duplicate finder running the full directory pipeline.
///
/// # Example
///
/// ```no_run
/// use lshdupe::duplicates::{FinderConfig, NearDuplicateFinder};
/// use std::path::Path;
///
/// let finder = NearDuplicateFinder::new(FinderConfig::default().with_io_threads(8));
/// match finder.find_near_duplicates(Path::new(".")) {
///     Ok((records, summary)) => {
///         println!("{} pairs from {} images", records.len(), summary.images_hashed);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct NearDuplicateFinder {
    config: FinderConfig,
    provider: Arc<dyn SignatureProvider>,
}

impl NearDuplicateFinder {
    /// Create a finder hashing with the configured perceptual algorithm.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = PerceptualHasher::new(config.algorithm, config.params.hash_size());
        Self {
            config,
            provider: Arc::new(hasher),
        }
    }

    /// Create a finder with a custom signature provider.
    #[must_use]
    pub fn with_provider(config: FinderConfig, provider: Arc<dyn SignatureProvider>) -> Self {
        Self { config, provider }
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find near-duplicate images in one directory.
    ///
    /// Files that are not images are skipped and listed in
    /// [`ScanSummary::skipped`]; any other signature failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist, is not a directory or cannot be listed
    /// - A file cannot be read
    /// - A signature has the wrong length
    pub fn find_near_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<NearDuplicate<PathBuf>>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting near-duplicate scan of {}", path.display());

        let walker = Walker::new(path, self.config.walker_config.clone());
        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) if e.is_fatal() => return Err(FinderError::Scan(e)),
                Err(e) => summary.scan_errors.push(e),
            }
        }
        summary.total_files = files.len();
        log::info!("Found {} files", summary.total_files);

        let signature_start = Instant::now();
        let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
        let signatures = self.compute_signatures(&paths, &mut summary)?;
        summary.signature_duration = signature_start.elapsed();
        summary.images_hashed = signatures.len();

        log::info!(
            "Computed {} signatures ({} skipped) in {:.2?}",
            summary.images_hashed,
            summary.skipped.len(),
            summary.signature_duration
        );

        let (records, lsh) = run_lsh(
            signatures,
            &self.config.params,
            self.config.progress_callback.as_ref(),
        )?;

        summary.lsh = lsh;
        summary.near_duplicates = records.len();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} candidates, {} near-duplicate pairs above {:.2}",
            summary.lsh.candidate_pairs,
            summary.near_duplicates,
            self.config.params.threshold()
        );

        Ok((records, summary))
    }

    /// Hash two files and compare them directly, without banding.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Signature` if either file cannot be hashed,
    /// including when it is not an image.
    pub fn compare(&self, a: &Path, b: &Path) -> Result<PairComparison, FinderError> {
        let sig_a = self.provider.compute(a)?;
        let sig_b = self.provider.compute(b)?;
        let distance = sig_a.hamming_distance(&sig_b)?;

        Ok(PairComparison {
            distance,
            similarity: super::similarity_from_distance(distance, sig_a.len()),
            total_bits: sig_a.len(),
        })
    }

    /// Compute signatures on a bounded pool, keeping enumeration order.
    fn compute_signatures(
        &self,
        paths: &[PathBuf],
        summary: &mut ScanSummary,
    ) -> Result<Vec<(PathBuf, Signature)>, FinderError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("signatures", paths.len());
        }

        let provider = &self.provider;
        let callback = self.config.progress_callback.as_ref();
        let hash_all = || -> Vec<Result<Signature, SignatureError>> {
            paths
                .par_iter()
                .enumerate()
                .map(|(idx, path)| {
                    if let Some(callback) = callback {
                        callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
                    }
                    provider.compute(path)
                })
                .collect()
        };

        // Build a custom thread pool with limited parallelism for I/O
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(hash_all),
            Err(e) => {
                log::warn!(
                    "Failed to create custom thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                hash_all()
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("signatures");
        }

        let mut signatures = Vec::with_capacity(results.len());
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(signature) => signatures.push((path.clone(), signature)),
                Err(e) if e.is_skippable() => {
                    log::warn!("Skipping {}: not a decodable image", path.display());
                    summary.skipped.push(path.clone());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(signatures)
    }
}
