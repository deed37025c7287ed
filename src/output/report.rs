//! Report directory with side-by-side previews of every pair.
//!
//! For ranked pair `i` (0-based) the report holds:
//!
//! - `images/pair_<i>.jpg`: both images pasted next to each other on a
//!   black RGB canvas of `w1 + w2` by `max(h1, h2)` pixels
//! - `text/pair_<i>.txt`: the two paths and the similarity
//!
//! A pair that cannot be rendered is logged and counted; the remaining
//! pairs are still written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, RgbImage};
use thiserror::Error;

use crate::duplicates::NearDuplicate;

/// Errors that can occur while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A report directory could not be created. Fatal for the report.
    #[error("cannot create report directory {path}: {source}")]
    CreateDir {
        /// Directory that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An input image could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        /// Image path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An input image could not be decoded, or the preview not encoded.
    #[error("image error for {path}: {source}")]
    Image {
        /// Image path
        path: PathBuf,
        /// Decoder or encoder error
        #[source]
        source: image::ImageError,
    },

    /// The combined canvas would be wider than `u32::MAX`.
    #[error("combined width of {a} and {b} overflows")]
    TooWide {
        /// First image
        a: PathBuf,
        /// Second image
        b: PathBuf,
    },

    /// A text note could not be written.
    #[error("cannot write {path}: {source}")]
    WriteText {
        /// Note path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// A pair that could not be written.
#[derive(Debug)]
pub struct PairFailure {
    /// Position of the pair in the ranking (0-based)
    pub index: usize,
    /// What went wrong
    pub error: ReportError,
}

/// Outcome of [`build_report`].
#[derive(Debug, Default)]
pub struct ReportSummary {
    /// Pairs written completely
    pub pairs_written: usize,
    /// Pairs that failed
    pub failures: Vec<PairFailure>,
}

impl ReportSummary {
    /// Returns true if every pair was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write previews and notes for every record under `out_dir`.
///
/// # Errors
///
/// Returns [`ReportError::CreateDir`] if `out_dir`, `images/` or `text/`
/// cannot be created. Failures of single pairs are collected in the
/// returned summary instead.
pub fn build_report(
    records: &[NearDuplicate<PathBuf>],
    out_dir: &Path,
) -> Result<ReportSummary, ReportError> {
    let images_dir = out_dir.join("images");
    let text_dir = out_dir.join("text");
    for dir in [&images_dir, &text_dir] {
        fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }

    log::info!(
        "Writing report for {} pairs to {}",
        records.len(),
        out_dir.display()
    );

    let mut summary = ReportSummary::default();
    for (index, record) in records.iter().enumerate() {
        match write_pair(index, record, &images_dir, &text_dir) {
            Ok(()) => summary.pairs_written += 1,
            Err(error) => {
                log::warn!("Report pair {} failed: {}", index, error);
                summary.failures.push(PairFailure { index, error });
            }
        }
    }

    log::info!(
        "Report complete: {} written, {} failed",
        summary.pairs_written,
        summary.failures.len()
    );
    Ok(summary)
}

fn write_pair(
    index: usize,
    record: &NearDuplicate<PathBuf>,
    images_dir: &Path,
    text_dir: &Path,
) -> Result<(), ReportError> {
    let a = open_image(&record.id_a)?;
    let b = open_image(&record.id_b)?;
    let canvas = compose_side_by_side(&a, &b).ok_or_else(|| ReportError::TooWide {
        a: record.id_a.clone(),
        b: record.id_b.clone(),
    })?;

    let image_path = images_dir.join(format!("pair_{index}.jpg"));
    canvas
        .save(&image_path)
        .map_err(|source| ReportError::Image {
            path: image_path.clone(),
            source,
        })?;

    let text_path = text_dir.join(format!("pair_{index}.txt"));
    fs::write(&text_path, pair_note(record)).map_err(|source| ReportError::WriteText {
        path: text_path.clone(),
        source,
    })?;

    log::debug!("Wrote {}", image_path.display());
    Ok(())
}

fn open_image(path: &Path) -> Result<DynamicImage, ReportError> {
    let open_err = |source: io::Error| ReportError::Open {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(open_err)?
        .with_guessed_format()
        .map_err(open_err)?
        .decode()
        .map_err(|source| ReportError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Paste `a` and `b` next to each other, top-aligned.
///
/// Returns `None` if the combined width does not fit in `u32`.
#[must_use]
pub fn compose_side_by_side(a: &DynamicImage, b: &DynamicImage) -> Option<RgbImage> {
    let width = a.width().checked_add(b.width())?;
    let height = a.height().max(b.height());

    let mut canvas = RgbImage::new(width, height);
    image::imageops::replace(&mut canvas, &a.to_rgb8(), 0, 0);
    image::imageops::replace(&mut canvas, &b.to_rgb8(), i64::from(a.width()), 0);
    Some(canvas)
}

/// Text note for one pair.
#[must_use]
pub fn pair_note(record: &NearDuplicate<PathBuf>) -> String {
    format!(
        "Image 1: {}\nImage 2: {}\nSimilarity: {:?}\n",
        record.id_a.display(),
        record.id_b.display(),
        record.similarity
    )
}
