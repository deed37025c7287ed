//! Similarity scoring and ranking of candidate pairs.
//!
//! Candidates are confirmed against the full signatures: the Hamming distance
//! covers every bit, not just the band that brought the pair together. A
//! pair survives only if its similarity is strictly greater than the
//! threshold.

use std::collections::HashMap;
use std::hash::Hash;

use rayon::prelude::*;
use serde::Serialize;

use super::candidates::CandidateSet;
use super::signature::{similarity_from_distance, LshError, LshParams, Signature};

/// A confirmed near-duplicate pair, `id_a < id_b`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearDuplicate<Id> {
    /// Smaller id of the pair
    pub id_a: Id,
    /// Larger id of the pair
    pub id_b: Id,
    /// Normalized Hamming similarity in `[0, 1]`
    pub similarity: f64,
    /// Differing bits between the two signatures
    pub distance: u32,
}

impl<Id> NearDuplicate<Id> {
    /// Split into the `(id_a, id_b, similarity)` triple.
    #[must_use]
    pub fn into_triple(self) -> (Id, Id, f64) {
        (self.id_a, self.id_b, self.similarity)
    }
}

/// Counts from a scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreStats {
    /// Candidates scored
    pub scored: usize,
    /// Candidates above the threshold
    pub accepted: usize,
    /// Candidates at or below the threshold
    pub rejected: usize,
}

/// Returns true if `similarity` passes `threshold`.
///
/// The comparison is strict: a pair sitting exactly on the threshold is
/// rejected.
#[inline]
#[must_use]
pub fn passes_threshold(similarity: f64, threshold: f64) -> bool {
    similarity > threshold
}

/// Score every candidate against the full signatures.
///
/// Scoring runs in parallel; the returned records keep candidate order.
///
/// # Errors
///
/// Returns [`LshError::LengthMismatch`] if two signatures differ in length.
pub fn score_candidates<Id>(
    candidates: &CandidateSet<Id>,
    signatures: &HashMap<Id, Signature>,
    params: &LshParams,
) -> Result<(Vec<NearDuplicate<Id>>, ScoreStats), LshError>
where
    Id: Ord + Hash + Clone + Send + Sync,
{
    let pairs: Vec<&(Id, Id)> = candidates.iter().collect();
    let threshold = params.threshold();
    let total_bits = params.total_bits();

    let scored: Vec<Option<NearDuplicate<Id>>> = pairs
        .par_iter()
        .map(|(a, b)| -> Result<Option<NearDuplicate<Id>>, LshError> {
            let (Some(sig_a), Some(sig_b)) = (signatures.get(a), signatures.get(b)) else {
                log::warn!("Candidate pair without signature, skipping");
                return Ok(None);
            };

            let distance = sig_a.hamming_distance(sig_b)?;
            let similarity = similarity_from_distance(distance, total_bits);

            if passes_threshold(similarity, threshold) {
                Ok(Some(NearDuplicate {
                    id_a: a.clone(),
                    id_b: b.clone(),
                    similarity,
                    distance,
                }))
            } else {
                log::trace!(
                    "Rejected candidate: similarity {:.4} <= threshold {:.4}",
                    similarity,
                    threshold
                );
                Ok(None)
            }
        })
        .collect::<Result<_, LshError>>()?;

    let mut stats = ScoreStats {
        scored: scored.len(),
        ..ScoreStats::default()
    };
    let accepted: Vec<NearDuplicate<Id>> = scored.into_iter().flatten().collect();
    stats.accepted = accepted.len();
    stats.rejected = stats.scored - stats.accepted;

    Ok((accepted, stats))
}

/// Sort records by descending similarity.
///
/// The sort is stable, so equal similarities keep the order they were
/// scored in.
pub fn rank<Id>(records: &mut [NearDuplicate<Id>]) {
    records.sort_by(|x, y| y.similarity.total_cmp(&x.similarity));
}
