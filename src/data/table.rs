//! Tabular containers that can be read as a 2x2 contingency table.

use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Any container exposing labelled columns and indexed rows of counts.
///
/// Rows are groups (group 0 first), columns are outcome categories.
pub trait ContingencyTable {
    /// `(rows, columns)`.
    fn shape(&self) -> (usize, usize);

    fn column_labels(&self) -> Vec<String>;

    /// Raw cell value. Returns `InvalidCount` with a NaN value for nulls.
    fn cell(&self, row: usize, col: usize) -> Result<f64>;
}

impl<T: ContingencyTable + ?Sized> ContingencyTable for &T {
    fn shape(&self) -> (usize, usize) {
        (**self).shape()
    }

    fn column_labels(&self) -> Vec<String> {
        (**self).column_labels()
    }

    fn cell(&self, row: usize, col: usize) -> Result<f64> {
        (**self).cell(row, col)
    }
}

impl ContingencyTable for DataFrame {
    fn shape(&self) -> (usize, usize) {
        DataFrame::shape(self)
    }

    fn column_labels(&self) -> Vec<String> {
        self.get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn cell(&self, row: usize, col: usize) -> Result<f64> {
        let (rows, cols) = DataFrame::shape(self);
        let series = self
            .select_at_idx(col)
            .ok_or(AnalysisError::InvalidShape { rows, cols })?;
        let values = series.cast(&DataType::Float64)?;
        values
            .f64()?
            .get(row)
            .ok_or(AnalysisError::InvalidCount {
                row,
                col,
                value: f64::NAN,
            })
    }
}

/// Plain labelled table, the wire form used by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTable {
    #[serde(default)]
    pub label: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl LabeledTable {
    pub fn new<S: Into<String>>(columns: [S; 2], rows: [[f64; 2]; 2]) -> Self {
        Self {
            label: None,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.iter().map(|row| row.to_vec()).collect(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl ContingencyTable for LabeledTable {
    fn shape(&self) -> (usize, usize) {
        let rows = self.rows.len();
        let cols = self.columns.len();
        // Ragged rows report their own width so the shape check rejects them.
        match self.rows.iter().find(|row| row.len() != cols) {
            Some(ragged) => (rows, ragged.len()),
            None => (rows, cols),
        }
    }

    fn column_labels(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn cell(&self, row: usize, col: usize) -> Result<f64> {
        let (rows, cols) = ContingencyTable::shape(self);
        self.rows
            .get(row)
            .and_then(|values| values.get(col))
            .copied()
            .ok_or(AnalysisError::InvalidShape { rows, cols })
    }
}
