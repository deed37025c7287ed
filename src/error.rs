//! Exit codes and structured error output.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: near-duplicates found
/// - 1: error
/// - 2: completed, no near-duplicates
/// - 3: completed, but some deletions or report pairs failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and near-duplicates were found.
    Success = 0,
    /// The run failed.
    GeneralError = 1,
    /// Scan completed without near-duplicates.
    NoDuplicates = 2,
    /// Scan completed but per-file actions failed.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "LD000",
            Self::GeneralError => "LD001",
            Self::NoDuplicates => "LD002",
            Self::PartialSuccess => "LD003",
        }
    }
}

/// Error object printed with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "LD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Messages of the underlying causes, outermost first
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::NoDuplicates.as_i32(), 2);
        assert_eq!(ExitCode::PartialSuccess.as_i32(), 3);
    }

    #[test]
    fn test_code_prefix() {
        assert_eq!(ExitCode::GeneralError.code_prefix(), "LD001");
        assert_eq!(ExitCode::PartialSuccess.code_prefix(), "LD003");
    }

    #[test]
    fn test_structured_error_json() {
        let err = anyhow::anyhow!("disk on fire").context("scan failed");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);
        let json = serde_json::to_value(&structured).unwrap();

        assert_eq!(json["code"], "LD001");
        assert_eq!(json["exit_code"], 1);
        assert_eq!(json["message"], "scan failed");
        assert_eq!(json["causes"][0], "disk on fire");
    }
}
