use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Name of the time-axis column in oscilloscope exports.
pub const TIME_COLUMN: &str = "TIME";

/// An ordered table of samples as exported by the oscilloscope.
///
/// Rows are stored in acquisition order and every row has exactly one value
/// per column. Transforms in this crate only ever filter or subsample rows;
/// they never reorder them or synthesise new values.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct SampleTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SampleTable {
    pub fn new(columns: Vec<String>) -> Self {
        SampleTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from columns and rows, rejecting rows whose width
    /// does not match the header.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ViewerError::InvalidArgument(format!(
                "row {} has {} values but the table has {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(SampleTable { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the `TIME` column, or `MissingTimeColumn`.
    pub fn time_index(&self) -> Result<usize> {
        self.column_index(TIME_COLUMN)
            .ok_or(ViewerError::MissingTimeColumn)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Returns a table holding the rows at `indices`, in the order given.
    ///
    /// Callers pass strictly increasing indices so the result stays a
    /// subsequence of `self`. Out-of-range indices are skipped.
    pub fn select_rows(&self, indices: &[usize]) -> SampleTable {
        SampleTable {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Returns a table with only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> SampleTable
    where
        F: FnMut(&[f64]) -> bool,
    {
        SampleTable {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }
}
