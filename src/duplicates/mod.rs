//! Near-duplicate detection module.
//!
//! This module provides functionality for:
//! - Packed bit signatures and run parameters ([`signature`])
//! - Band-wise bucketing of signatures ([`buckets`])
//! - Deduplicated candidate pairs from shared buckets ([`candidates`])
//! - Hamming similarity scoring and ranking ([`scoring`])
//! - The end-to-end directory pipeline ([`finder`])
//!
//! Data flows strictly forward: signature → bucket → candidate → score → rank.

pub mod buckets;
pub mod candidates;
pub mod finder;
pub mod scoring;
pub mod signature;

pub use buckets::{BandBuckets, BucketStats};
pub use candidates::{generate_candidates, CandidateSet};
pub use finder::{
    find_near_duplicates, find_near_duplicates_with_stats, FinderConfig, FinderError, LshStats,
    NearDuplicateFinder, PairComparison, ScanSummary,
};
pub use scoring::{passes_threshold, rank, score_candidates, NearDuplicate, ScoreStats};
pub use signature::{similarity_from_distance, BandKey, LshError, LshParams, Signature};
