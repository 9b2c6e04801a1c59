use ndarray::{Array2, ArrayView1};

use super::variable::VariableId;
use crate::error::{NetworkError, Result};

/// Immutable matrix of boolean observations: one row per sample, one column
/// per variable (indexed by `VariableId`).
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    values: Array2<bool>,
}

impl DataTable {
    /// Builds a table from row vectors that must all have `columns` entries.
    pub fn from_rows(rows: Vec<Vec<bool>>, columns: usize) -> Result<Self> {
        let row_count = rows.len();
        let mut flat = Vec::with_capacity(row_count * columns);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                return Err(NetworkError::malformed(
                    i + 1,
                    format!("sample row has {} values, expected {}", row.len(), columns),
                ));
            }
            flat.extend(row);
        }
        let values = Array2::from_shape_vec((row_count, columns), flat)
            .map_err(|e| NetworkError::malformed(0, e.to_string()))?;
        Ok(DataTable { values })
    }

    pub fn row_count(&self) -> usize {
        self.values.nrows()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, bool> {
        self.values.row(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, bool>> {
        self.values.rows().into_iter()
    }

    /// Counts the rows where every variable in `trues` is true and every
    /// variable in `falses` is false. Either slice may be empty.
    ///
    /// Fails with `EmptyDataset` when the table has no rows, since every
    /// probability computed from these counts needs at least one sample.
    pub fn count_matching(&self, trues: &[VariableId], falses: &[VariableId]) -> Result<usize> {
        if self.row_count() == 0 {
            return Err(NetworkError::EmptyDataset);
        }

        let count = self
            .values
            .rows()
            .into_iter()
            .filter(|row| {
                trues.iter().all(|v| row[v.index()]) && falses.iter().all(|v| !row[v.index()])
            })
            .count();
        Ok(count)
    }
}
