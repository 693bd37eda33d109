//! Error kinds raised by the stratified analysis engine.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Failures surfaced by parsing and statistics.
///
/// Errors are raised where they are detected and passed through the
/// orchestrator unchanged.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The table is not two rows by two columns.
    #[error("expected a 2x2 table, found {rows}x{cols}")]
    InvalidShape { rows: usize, cols: usize },
    /// The pass rule names a column the table does not have.
    #[error("column `{0}` not found in table")]
    ColumnNotFound(String),
    /// A cell is missing, negative or not finite.
    #[error("invalid count {value} at row {row}, column {col}")]
    InvalidCount { row: usize, col: usize, value: f64 },
    /// Zero totals, zero pooled denominators or an unsolvable expected cell.
    #[error("degenerate table: {0}")]
    DegenerateTable(String),
    #[error("no strata supplied")]
    EmptyStrata,
    #[error("distribution error: {0}")]
    Distribution(String),
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
