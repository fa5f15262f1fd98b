use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop the snapshot pipeline from producing a value.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The workbook or one of its sheets could not be opened.
    #[error("cannot read sheet '{sheet}' from {}: {reason}", path.display())]
    DataSource {
        path: PathBuf,
        sheet: String,
        reason: String,
    },

    /// A sheet is missing a column the pipeline depends on.
    #[error("sheet '{table}' has no column '{column}'")]
    Schema { table: String, column: String },

    /// A filter predicate matched no rows.
    #[error("no rows in '{table}' for {criteria}")]
    NoMatchingRow { table: String, criteria: String },

    /// Currency or number text could not be parsed.
    #[error("'{text}' is not a number ({context})")]
    NumericParse { text: String, context: String },

    /// A share was requested against a zero total.
    #[error("cannot compute share of '{part}' against a zero total")]
    DivisionByZero { part: String },
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

impl SnapshotError {
    pub(crate) fn data_source(
        path: impl Into<PathBuf>,
        sheet: &str,
        reason: impl ToString,
    ) -> Self {
        SnapshotError::DataSource {
            path: path.into(),
            sheet: sheet.to_string(),
            reason: reason.to_string(),
        }
    }
}
