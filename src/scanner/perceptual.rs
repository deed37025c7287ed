//! Perceptual image hashing into fixed-length bit signatures.
//!
//! This module provides the [`PerceptualHasher`], which turns an image file
//! into a `hash_size × hash_size` bit [`Signature`] that stays stable under
//! resizing, recompression and small edits.

use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use image::imageops::FilterType;
use image::ImageReader;
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::wavelet::haar_wavelet_hash;
use crate::duplicates::{LshError, Signature};

/// Supported perceptual hashing algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// pHash (Perceptual Hash) - DCT-based, most resilient to transformations.
    #[default]
    Phash,
    /// dHash (Difference Hash) - horizontal gradients, fast and effective.
    Dhash,
    /// Vertical dHash - gradients between rows instead of columns.
    Vdhash,
    /// aHash (Average Hash) - pixels compared with the mean, fast but less resilient.
    Ahash,
    /// mHash (Median Hash) - pixels compared with the median.
    Mhash,
    /// wHash (Haar Wavelet Hash) - median threshold after removing the
    /// coarsest Haar approximation. Needs a power-of-two hash size.
    Whash,
}

impl HashAlgorithm {
    /// All variants, in display order.
    pub const ALL: [HashAlgorithm; 6] = [
        Self::Phash,
        Self::Dhash,
        Self::Vdhash,
        Self::Ahash,
        Self::Mhash,
        Self::Whash,
    ];

    /// The `image_hasher` configuration, or `None` for hashes computed here.
    fn configure(self, config: HasherConfig) -> Option<HasherConfig> {
        match self {
            Self::Phash => Some(config.hash_alg(HashAlg::Median).preproc_dct()),
            Self::Dhash => Some(config.hash_alg(HashAlg::Gradient)),
            Self::Vdhash => Some(config.hash_alg(HashAlg::VertGradient)),
            Self::Ahash => Some(config.hash_alg(HashAlg::Mean)),
            Self::Mhash => Some(config.hash_alg(HashAlg::Median)),
            Self::Whash => None,
        }
    }

    /// Check that `hash_size` suits this algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`LshError::InvalidConfiguration`] when wHash is paired with a
    /// hash size that is not a power of two.
    pub fn check_hash_size(self, hash_size: u32) -> Result<(), LshError> {
        if self == Self::Whash && !hash_size.is_power_of_two() {
            return Err(LshError::InvalidConfiguration(format!(
                "wHash needs a power-of-two hash size, got {hash_size}"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phash => write!(f, "pHash"),
            Self::Dhash => write!(f, "dHash"),
            Self::Vdhash => write!(f, "vertical dHash"),
            Self::Ahash => write!(f, "aHash"),
            Self::Mhash => write!(f, "mHash"),
            Self::Whash => write!(f, "wHash"),
        }
    }
}

/// Errors that can occur while computing a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The file could be read but is not a decodable image.
    #[error("not an image: {path}: {source}")]
    NotAnImage {
        /// File that failed to decode
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// The file could not be opened or read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The hasher produced a hash of unexpected size.
    #[error("hash of {path} does not have the expected {expected_bits} bits")]
    LengthMismatch {
        /// File that was hashed
        path: PathBuf,
        /// Bits the run expects
        expected_bits: usize,
    },
}

impl SignatureError {
    /// Returns true for failures that only exclude the file from the run.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::NotAnImage { .. })
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotAnImage { path, .. }
            | Self::Io { path, .. }
            | Self::LengthMismatch { path, .. } => path,
        }
    }
}

/// Anything that can turn a file into a signature.
///
/// Implementations must be shareable across the signature worker pool.
pub trait SignatureProvider: Send + Sync {
    /// Compute the signature of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::NotAnImage`] for files that are not images;
    /// any other variant aborts the run.
    fn compute(&self, path: &Path) -> Result<Signature, SignatureError>;

    /// Bits per signature produced by this provider.
    fn signature_bits(&self) -> usize;
}

enum Backend {
    ImageHasher(image_hasher::Hasher),
    HaarWavelet,
}

/// Computes perceptual hash signatures for images.
pub struct PerceptualHasher {
    backend: Backend,
    algorithm: HashAlgorithm,
    hash_size: u32,
}

impl PerceptualHasher {
    /// Create a hasher for `algorithm` producing `hash_size²`-bit signatures.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, hash_size: u32) -> Self {
        let config = HasherConfig::new()
            .hash_size(hash_size, hash_size)
            .resize_filter(FilterType::Lanczos3);

        let backend = match algorithm.configure(config) {
            Some(config) => Backend::ImageHasher(config.to_hasher()),
            None => Backend::HaarWavelet,
        };

        Self {
            backend,
            algorithm,
            hash_size,
        }
    }

    /// Hash `img`; `None` if the result is not `hash_size²` bits long.
    fn hash_bits(&self, img: &image::DynamicImage) -> Option<Signature> {
        let bits = self.signature_bits();
        let signature = match &self.backend {
            Backend::ImageHasher(hasher) => {
                Signature::from_packed(hasher.hash_image(img).as_bytes(), bits).ok()?
            }
            Backend::HaarWavelet => Signature::from_bits(&haar_wavelet_hash(img, self.hash_size)),
        };
        (signature.len() == bits).then_some(signature)
    }

    /// Get the algorithm used by this hasher.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Get the hash edge length.
    #[must_use]
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::Phash, 8)
    }
}

impl SignatureProvider for PerceptualHasher {
    fn compute(&self, path: &Path) -> Result<Signature, SignatureError> {
        let io_err = |source: io::Error| SignatureError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Sniff the format from content so misnamed files still decode
        let reader = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?;

        let img = reader.decode().map_err(|source| SignatureError::NotAnImage {
            path: path.to_path_buf(),
            source,
        })?;

        self.hash_bits(&img)
            .ok_or_else(|| SignatureError::LengthMismatch {
                path: path.to_path_buf(),
                expected_bits: self.signature_bits(),
            })
    }

    fn signature_bits(&self) -> usize {
        (self.hash_size as usize).pow(2)
    }
}
