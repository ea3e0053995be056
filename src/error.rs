//! Error taxonomy for the exploration pipeline.
//!
//! Every stage of the pipeline (validation, summary, charts, cleaning, export)
//! reports failures through [`ExploreError`]. Each variant's message names the
//! failing operation and the underlying cause, so a caller can show it to a
//! user as-is:
//!
//! ```
//! use tablescope::error::ExploreError;
//!
//! let err = ExploreError::InvalidColumnSelection {
//!     column: "age".to_owned(),
//! };
//! assert_eq!(
//!     err.to_string(),
//!     "Invalid column selection: column 'age' does not exist in the current table"
//! );
//! ```
//!
//! ## Fault domains
//!
//! Errors are values, never panics. The orchestrator in
//! [`crate::explorer::session`] collects one `Result` per stage, and the chart
//! battery collects one `Result` per chart kind, so a failure is reported where
//! it happened and the remaining work still runs.
//!
//! ## Display surfaces
//!
//! The external display layer wants plain strings. `From<ExploreError> for String`
//! and the `Serialize` impl (which writes the `Display` text) cover that.

use crate::explorer::charts::ChartKind;
use serde::Serialize;
use std::fmt;

/// Main error type for tablescope operations.
#[derive(Debug)]
pub enum ExploreError {
    /// The input had no header, or a header and zero data rows.
    EmptyDataset,

    /// Structural parse failure (ragged rows, bad encoding, duplicate headers).
    MalformedInput(String),

    /// Charts need at least two columns.
    InsufficientColumns { found: usize },

    /// A selected column no longer resolves against the table.
    InvalidColumnSelection { column: String },

    /// One chart kind failed to generate.
    ChartGeneration { chart: ChartKind, cause: String },

    /// Descriptive statistics failed for one column.
    StatisticsComputation { column: String, cause: String },

    /// A cleaning step failed.
    CleaningOperation { step: String, cause: String },

    /// The table could not be encoded for export.
    ExportEncoding(String),

    /// Configuration errors
    Config(String),

    /// I/O errors (config files, log directories)
    Io(std::io::Error),
}

impl fmt::Display for ExploreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataset => write!(
                f,
                "Dataset validation failed: the uploaded CSV is empty, please provide a valid dataset"
            ),
            Self::MalformedInput(msg) => write!(
                f,
                "Dataset validation failed: the CSV could not be parsed ({msg})"
            ),
            Self::InsufficientColumns { found } => write!(
                f,
                "Chart selection unavailable: at least two columns are required for visualization, found {found}"
            ),
            Self::InvalidColumnSelection { column } => write!(
                f,
                "Invalid column selection: column '{column}' does not exist in the current table"
            ),
            Self::ChartGeneration { chart, cause } => {
                write!(f, "Error generating {chart}: {cause}")
            }
            Self::StatisticsComputation { column, cause } => write!(
                f,
                "Error calculating summary statistics for '{column}': {cause}"
            ),
            Self::CleaningOperation { step, cause } => {
                write!(f, "An error occurred while {step}: {cause}")
            }
            Self::ExportEncoding(msg) => write!(
                f,
                "An error occurred while preparing the CSV for download: {msg}"
            ),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ExploreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl ExploreError {
    /// Short machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyDataset => "EmptyDatasetError",
            Self::MalformedInput(_) => "MalformedInputError",
            Self::InsufficientColumns { .. } => "InsufficientColumnsError",
            Self::InvalidColumnSelection { .. } => "InvalidColumnSelectionError",
            Self::ChartGeneration { .. } => "ChartGenerationError",
            Self::StatisticsComputation { .. } => "StatisticsComputationError",
            Self::CleaningOperation { .. } => "CleaningOperationError",
            Self::ExportEncoding(_) => "ExportEncodingError",
            Self::Config(_) => "ConfigError",
            Self::Io(_) => "IoError",
        }
    }

    pub(crate) fn chart(chart: ChartKind, cause: impl fmt::Display) -> Self {
        Self::ChartGeneration {
            chart,
            cause: cause.to_string(),
        }
    }
}

impl From<std::io::Error> for ExploreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ExploreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

// For the display layer, which only deals in strings
impl From<ExploreError> for String {
    fn from(err: ExploreError) -> Self {
        err.to_string()
    }
}

impl Serialize for ExploreError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Result type alias for tablescope operations.
pub type Result<T> = std::result::Result<T, ExploreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_operation() {
        let err = ExploreError::ChartGeneration {
            chart: ChartKind::CorrelationHeatmap,
            cause: "needs two numeric columns".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Error generating Correlation Heatmap: needs two numeric columns"
        );
    }

    #[test]
    fn test_error_conversion_to_string() {
        let s: String = ExploreError::EmptyDataset.into();
        assert!(s.contains("empty"), "message should mention emptiness: {s}");
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ExploreError::EmptyDataset.kind(), "EmptyDatasetError");
        assert_eq!(
            ExploreError::InsufficientColumns { found: 1 }.kind(),
            "InsufficientColumnsError"
        );
    }

    #[test]
    fn test_error_serializes_as_message() -> anyhow::Result<()> {
        let err = ExploreError::ExportEncoding("buffer closed".to_owned());
        let json = serde_json::to_string(&err)?;
        assert_eq!(
            json,
            "\"An error occurred while preparing the CSV for download: buffer closed\""
        );
        Ok(())
    }
}
