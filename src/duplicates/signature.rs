//! Packed bit signatures and LSH parameters.
//!
//! # Overview
//!
//! A [`Signature`] is the fixed-length bit vector produced by a perceptual
//! hash. Bits are packed eight to a byte, least-significant bit first, which
//! is the same layout `image_hasher` uses for `ImageHash::as_bytes`, so a
//! hash can be wrapped without re-ordering.
//!
//! [`LshParams`] carries the three knobs of the banding scheme (threshold,
//! band count, hash size) and validates them once, before any signature is
//! computed.

use std::fmt;

use thiserror::Error;

/// Errors raised by the LSH core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LshError {
    /// Parameters are outside their valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A signature does not have the `hash_size²` bits the run expects.
    #[error("signature has {actual} bits, expected {expected}")]
    LengthMismatch {
        /// Bits required by the run parameters
        expected: usize,
        /// Bits found on the signature
        actual: usize,
    },

    /// The same id was given two signatures.
    #[error("duplicate signature for {0}")]
    DuplicateId(String),
}

/// A fixed-length, immutable, packed bit vector.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    bytes: Box<[u8]>,
    len: usize,
}

impl Signature {
    /// Build a signature from packed bytes holding `len` bits.
    ///
    /// Bits beyond `len` in the last byte are cleared so that equal bit
    /// content always means equal bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::LengthMismatch`] when `bytes` is not exactly
    /// `ceil(len / 8)` long.
    pub fn from_packed(bytes: &[u8], len: usize) -> Result<Self, LshError> {
        if bytes.len() != len.div_ceil(8) {
            return Err(LshError::LengthMismatch {
                expected: len,
                actual: bytes.len() * 8,
            });
        }

        let mut bytes: Box<[u8]> = bytes.into();
        let tail = len % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }

        Ok(Self { bytes, len })
    }

    /// Build a signature from one `bool` per bit.
    #[must_use]
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Self {
            bytes: bytes.into_boxed_slice(),
            len: bits.len(),
        }
    }

    /// Number of bits in the signature.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true for a zero-length signature.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed storage, `ceil(len / 8)` bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Value of bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.len, "bit {index} out of range for {} bits", self.len);
        (self.bytes[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Copy bits `[start, end)` into a standalone packed key.
    ///
    /// Byte-aligned ranges are sliced directly; anything else is re-packed
    /// bit by bit with the same layout.
    #[must_use]
    pub fn band(&self, start: usize, end: usize) -> BandKey {
        debug_assert!(start <= end && end <= self.len);

        if start % 8 == 0 && end % 8 == 0 {
            return BandKey(self.bytes[start / 8..end / 8].into());
        }

        let width = end - start;
        let mut out = vec![0u8; width.div_ceil(8)];
        for offset in 0..width {
            if self.bit(start + offset) {
                out[offset / 8] |= 1 << (offset % 8);
            }
        }
        BandKey(out.into_boxed_slice())
    }

    /// Count of differing bits across the whole signature.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::LengthMismatch`] if the signatures differ in length.
    pub fn hamming_distance(&self, other: &Self) -> Result<u32, LshError> {
        if self.len != other.len {
            return Err(LshError::LengthMismatch {
                expected: self.len,
                actual: other.len,
            });
        }

        Ok(self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Normalized Hamming similarity in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::LengthMismatch`] if the signatures differ in length.
    pub fn similarity(&self, other: &Self) -> Result<f64, LshError> {
        let distance = self.hamming_distance(other)?;
        Ok(similarity_from_distance(distance, self.len))
    }

    /// Signature as a lowercase hex string of its packed bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} bits, {})", self.len, self.to_hex())
    }
}

/// `(total_bits - distance) / total_bits`; a zero-length signature counts
/// as identical.
#[must_use]
pub fn similarity_from_distance(distance: u32, total_bits: usize) -> f64 {
    if total_bits == 0 {
        return 1.0;
    }
    let total = total_bits as f64;
    (total - f64::from(distance)) / total
}

/// Raw bit content of one band, used verbatim as a bucket key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandKey(Box<[u8]>);

impl BandKey {
    /// Packed bytes of the band.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Validated parameters of one LSH run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LshParams {
    threshold: f64,
    bands: usize,
    hash_size: u32,
}

impl LshParams {
    /// Validate and build the parameters.
    ///
    /// `bands` must divide `hash_size²` exactly so that every bit of the
    /// signature belongs to a band.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::InvalidConfiguration`] when the threshold is not a
    /// number in `[0, 1]`, `hash_size` is zero, or `bands` is zero, larger
    /// than `hash_size²`, or does not divide it.
    pub fn new(threshold: f64, bands: usize, hash_size: u32) -> Result<Self, LshError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LshError::InvalidConfiguration(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        if hash_size == 0 {
            return Err(LshError::InvalidConfiguration(
                "hash size must be positive".to_string(),
            ));
        }

        let total_bits = (hash_size as usize).checked_pow(2).ok_or_else(|| {
            LshError::InvalidConfiguration(format!("hash size {hash_size} is too large"))
        })?;
        if bands == 0 || bands > total_bits {
            return Err(LshError::InvalidConfiguration(format!(
                "bands must be within [1, {total_bits}] for hash size {hash_size}, got {bands}"
            )));
        }
        if total_bits % bands != 0 {
            return Err(LshError::InvalidConfiguration(format!(
                "bands ({bands}) must divide the signature length ({total_bits} bits); \
                 {} trailing bits would never be bucketed",
                total_bits % bands
            )));
        }

        Ok(Self {
            threshold,
            bands,
            hash_size,
        })
    }

    /// Minimum similarity a pair must strictly exceed.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of bands per signature.
    #[must_use]
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Hash edge length; signatures have `hash_size²` bits.
    #[must_use]
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }

    /// Bits per signature.
    #[must_use]
    pub fn total_bits(&self) -> usize {
        (self.hash_size as usize).pow(2)
    }

    /// Bits per band.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.total_bits() / self.bands
    }
}

impl Default for LshParams {
    /// Threshold 0.70, 32 bands over a 32×32 hash.
    fn default() -> Self {
        Self {
            threshold: 0.7,
            bands: 32,
            hash_size: 32,
        }
    }
}
