//! Candidate generation from shared buckets.
//!
//! Every bucket with two or more members contributes all pairs of its
//! members. Pairs are canonicalized as `(smaller, larger)` and collected into
//! one ordered set, so a pair found in several bands is only scored once.

use std::collections::BTreeSet;

use super::buckets::BandBuckets;

/// Deduplicated, canonically ordered candidate pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet<Id: Ord> {
    pairs: BTreeSet<(Id, Id)>,
}

impl<Id: Ord> Default for CandidateSet<Id> {
    fn default() -> Self {
        Self {
            pairs: BTreeSet::new(),
        }
    }
}

impl<Id: Ord + Clone> CandidateSet<Id> {
    /// Create an empty candidate set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the unordered pair `{a, b}`.
    ///
    /// Self-pairs are ignored. Returns true if the pair was not present yet.
    pub fn insert(&mut self, a: Id, b: Id) -> bool {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => self.pairs.insert((a, b)),
            std::cmp::Ordering::Greater => self.pairs.insert((b, a)),
            std::cmp::Ordering::Equal => false,
        }
    }

    /// Emit every pair of a bucket's members.
    ///
    /// Members are sorted and deduplicated first, so repeated ids in one
    /// bucket never turn into self-pairs.
    pub fn extend_from_bucket(&mut self, members: &[Id]) {
        if members.len() < 2 {
            return;
        }

        let mut sorted: Vec<&Id> = members.iter().collect();
        sorted.sort();
        sorted.dedup();

        for (i, a) in sorted.iter().enumerate() {
            for b in &sorted[i + 1..] {
                self.pairs.insert(((*a).clone(), (*b).clone()));
            }
        }
    }

    /// Returns true if `{a, b}` is a candidate.
    #[must_use]
    pub fn contains(&self, a: &Id, b: &Id) -> bool {
        if a <= b {
            self.pairs.contains(&(a.clone(), b.clone()))
        } else {
            self.pairs.contains(&(b.clone(), a.clone()))
        }
    }

    /// Number of candidate pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &(Id, Id)> + '_ {
        self.pairs.iter()
    }

    /// Pairs in canonical order, owned.
    #[must_use]
    pub fn into_vec(self) -> Vec<(Id, Id)> {
        self.pairs.into_iter().collect()
    }
}

/// Merge the shared buckets of every band into one candidate set.
#[must_use]
pub fn generate_candidates<Id: Ord + Clone>(buckets: &BandBuckets<Id>) -> CandidateSet<Id> {
    let mut candidates = CandidateSet::new();
    let mut shared = 0usize;

    for members in buckets.shared_buckets() {
        shared += 1;
        candidates.extend_from_bucket(members);
    }

    log::debug!(
        "Candidate generation: {} shared buckets → {} unique pairs",
        shared,
        candidates.len()
    );

    candidates
}
