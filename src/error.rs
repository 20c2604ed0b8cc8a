//! Error types for the report-card batch.
//!
//! [`BatchError`] covers conditions that abort the whole batch before any
//! artifact is written. [`EntityError`] covers conditions that are isolated
//! to one entity; the orchestrator reports them and moves on.

use std::path::PathBuf;
use std::time::Duration;

/// Fatal, batch-aborting conditions.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The source workbook does not exist.
    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The source exists but could not be opened or parsed as a workbook.
    #[error("failed to read source {}: {message}", .path.display())]
    SourceUnreadable { path: PathBuf, message: String },

    /// The requested worksheet is not present in the workbook.
    #[error("worksheet '{sheet}' not found in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    /// Required columns are missing from the header row.
    #[error("source is missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Per-entity conditions. None of these stop the batch.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// No usable measurement remained for the entity.
    #[error("no scores recorded")]
    EmptyMeasurements,

    /// A measurement cell held something other than a number.
    #[error("row {row}: score '{value}' is not a number")]
    DataType { row: u32, value: String },

    /// Rows sharing an identity disagree on the display name.
    #[error("row {row}: name '{found}' does not match '{expected}'")]
    InconsistentName {
        row: u32,
        expected: String,
        found: String,
    },

    /// Writing the artifact failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document could not be produced in the requested format.
    #[error("render error: {0}")]
    Render(String),

    /// Writing the artifact took longer than the configured limit.
    #[error("writing {} timed out after {}s", .path.display(), .limit.as_secs())]
    Timeout { path: PathBuf, limit: Duration },
}

impl EntityError {
    /// Create an I/O error bound to the artifact path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a render error from any displayable message.
    pub fn render(msg: impl std::fmt::Display) -> Self {
        Self::Render(msg.to_string())
    }

    /// Whether this condition is a skip rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::EmptyMeasurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_every_missing_column() {
        let err = BatchError::Schema {
            missing: vec!["Name".to_string(), "Subject Score".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "source is missing required column(s): Name, Subject Score"
        );
    }

    #[test]
    fn test_only_empty_measurements_is_a_skip() {
        assert!(EntityError::EmptyMeasurements.is_skip());
        assert!(!EntityError::DataType {
            row: 3,
            value: "abc".to_string()
        }
        .is_skip());
        assert!(!EntityError::render("boom").is_skip());
    }
}
