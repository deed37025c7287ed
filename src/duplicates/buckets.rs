//! Bucketing engine: band-wise grouping of signatures.
//!
//! Each signature is cut into `bands` contiguous ranges of `rows` bits. For
//! every band there is one map from the band's raw bits ([`BandKey`]) to the
//! ids that carry exactly those bits. Nothing is compared here; two ids only
//! meet later if they landed in the same bucket of the same band.
//!
//! When `rows * bands` is smaller than the signature, the trailing bits are
//! not part of any band. [`LshParams`] rules that out for whole runs, but the
//! engine itself accepts such partitions.

use std::collections::HashMap;

use super::signature::{BandKey, LshError, LshParams, Signature};

/// Per-band bucket maps.
#[derive(Debug, Clone)]
pub struct BandBuckets<Id> {
    tables: Vec<HashMap<BandKey, Vec<Id>>>,
    rows: usize,
}

/// Statistics about a populated [`BandBuckets`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Number of bands
    pub bands: usize,
    /// Bits per band
    pub rows: usize,
    /// Total buckets across all bands
    pub buckets: usize,
    /// Buckets holding two or more ids
    pub shared_buckets: usize,
    /// Size of the most populated bucket
    pub largest_bucket: usize,
}

impl<Id: Clone> BandBuckets<Id> {
    /// Create empty maps for `bands` bands of `rows` bits each.
    #[must_use]
    pub fn new(bands: usize, rows: usize) -> Self {
        Self {
            tables: (0..bands).map(|_| HashMap::new()).collect(),
            rows,
        }
    }

    /// Bucket every signature according to `params`.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::LengthMismatch`] if a signature is not
    /// `hash_size²` bits long.
    pub fn build(signatures: &[(Id, Signature)], params: &LshParams) -> Result<Self, LshError> {
        let mut buckets = Self::new(params.bands(), params.rows());
        for (id, signature) in signatures {
            if signature.len() != params.total_bits() {
                return Err(LshError::LengthMismatch {
                    expected: params.total_bits(),
                    actual: signature.len(),
                });
            }
            buckets.insert(id.clone(), signature)?;
        }

        log::debug!("Bucketing: {:?}", buckets.stats());
        Ok(buckets)
    }

    /// Add one signature to every band.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::LengthMismatch`] if the signature is shorter than
    /// `bands * rows` bits.
    pub fn insert(&mut self, id: Id, signature: &Signature) -> Result<(), LshError> {
        let covered = self.rows * self.tables.len();
        if signature.len() < covered {
            return Err(LshError::LengthMismatch {
                expected: covered,
                actual: signature.len(),
            });
        }

        let rows = self.rows;
        for (band, table) in self.tables.iter_mut().enumerate() {
            let key = signature.band(band * rows, (band + 1) * rows);
            table.entry(key).or_default().push(id.clone());
        }
        Ok(())
    }

    /// Number of bands.
    #[must_use]
    pub fn band_count(&self) -> usize {
        self.tables.len()
    }

    /// Bits per band.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Bucket map of one band, `None` if `band` is out of range.
    #[must_use]
    pub fn buckets_for_band(&self, band: usize) -> Option<&HashMap<BandKey, Vec<Id>>> {
        self.tables.get(band)
    }

    /// Every bucket holding at least two ids, band by band.
    pub fn shared_buckets(&self) -> impl Iterator<Item = &[Id]> + '_ {
        self.tables
            .iter()
            .flat_map(HashMap::values)
            .filter(|ids| ids.len() > 1)
            .map(Vec::as_slice)
    }

    /// Summary counts for logging and reporting.
    #[must_use]
    pub fn stats(&self) -> BucketStats {
        let mut stats = BucketStats {
            bands: self.tables.len(),
            rows: self.rows,
            ..BucketStats::default()
        };
        for ids in self.tables.iter().flat_map(HashMap::values) {
            stats.buckets += 1;
            if ids.len() > 1 {
                stats.shared_buckets += 1;
            }
            stats.largest_bucket = stats.largest_bucket.max(ids.len());
        }
        stats
    }
}
