//! CSV output formatter for near-duplicate scan results.
//!
//! One row is generated for each ranked pair.
//!
//! # Columns
//!
//! - `rank`: 1-based position in the ranking
//! - `file_a`, `file_b`: the two paths, `file_a < file_b`
//! - `similarity`: normalized Hamming similarity
//! - `hamming_distance`: differing bits

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::NearDuplicate;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    file_a: &'a str,
    file_b: &'a str,
    similarity: f64,
    hamming_distance: u32,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    records: &'a [NearDuplicate<PathBuf>],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter over ranked records.
    #[must_use]
    pub fn new(records: &'a [NearDuplicate<PathBuf>]) -> Self {
        Self { records }
    }

    /// Write the header and one row per record.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.records.is_empty() {
            csv_writer.write_record(["rank", "file_a", "file_b", "similarity", "hamming_distance"])?;
        }

        for (idx, record) in self.records.iter().enumerate() {
            let file_a = record.id_a.to_string_lossy();
            let file_b = record.id_b.to_string_lossy();
            csv_writer.serialize(CsvRow {
                rank: idx + 1,
                file_a: &file_a,
                file_b: &file_b,
                similarity: record.similarity,
                hamming_distance: record.distance,
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
