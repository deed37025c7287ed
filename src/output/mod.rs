//! Output formatters for near-duplicate scan results.
//!
//! This module provides different outputs for ranked pairs:
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//! - A report directory with side-by-side previews
//!
//! # Example
//!
//! ```no_run
//! use lshdupe::duplicates::{FinderConfig, NearDuplicateFinder};
//! use lshdupe::output::CsvOutput;
//! use std::path::Path;
//!
//! let finder = NearDuplicateFinder::new(FinderConfig::default());
//! let (records, _) = finder.find_near_duplicates(Path::new(".")).unwrap();
//!
//! CsvOutput::new(&records).write_to(std::io::stdout()).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod report;

// Re-export main types
pub use csv::{CsvOutput, CsvOutputError};
pub use json::{JsonDeletion, JsonOutput, JsonOutputError};
pub use report::{build_report, ReportError, ReportSummary};
