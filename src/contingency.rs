//! Contingency tables
//!
//! Joint counts of two categorical variables with the drill-down helpers the
//! relationship panel needs: top-N ranking and single-cell lookup.

use crate::error::{AnalysisError, Result};
use crate::stats::percent_of;
use crate::types::{CategoryValue, RankedCell, SelectedCell, VariableType, ORDINAL_LEVELS};
use serde::{Deserialize, Serialize};

/// Counts of joint occurrences; rows are variable A, columns variable B
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub row_categories: Vec<CategoryValue>,
    pub col_categories: Vec<CategoryValue>,
    pub counts: Vec<Vec<usize>>,
}

/// Axis categories for a variable type, in table order
///
/// Booleans are ordered true-first so the 2x2 table reads TT, TF, FT, FF.
pub fn categories_for(kind: VariableType) -> Option<Vec<CategoryValue>> {
    match kind {
        VariableType::Boolean => Some(vec![CategoryValue::Flag(true), CategoryValue::Flag(false)]),
        VariableType::Ordinal => Some((1..=ORDINAL_LEVELS).map(CategoryValue::Level).collect()),
        VariableType::Numeric | VariableType::Array => None,
    }
}

/// Category a canonical value falls into
pub fn category_of(kind: VariableType, value: f64) -> Option<CategoryValue> {
    match kind {
        VariableType::Boolean if value == 1.0 => Some(CategoryValue::Flag(true)),
        VariableType::Boolean if value == 0.0 => Some(CategoryValue::Flag(false)),
        VariableType::Ordinal
            if value.fract() == 0.0 && (1.0..=ORDINAL_LEVELS as f64).contains(&value) =>
        {
            Some(CategoryValue::Level(value as u8))
        }
        _ => None,
    }
}

impl ContingencyTable {
    /// Tabulate paired canonical values
    ///
    /// Returns `None` when either type is not categorical or a value does not
    /// fall on its scale.
    pub fn build(kind_a: VariableType, a: &[f64], kind_b: VariableType, b: &[f64]) -> Option<Self> {
        let row_categories = categories_for(kind_a)?;
        let col_categories = categories_for(kind_b)?;
        let mut counts = vec![vec![0usize; col_categories.len()]; row_categories.len()];

        for (va, vb) in a.iter().zip(b) {
            let category_a = category_of(kind_a, *va)?;
            let category_b = category_of(kind_b, *vb)?;
            let row = row_categories.iter().position(|c| *c == category_a)?;
            let col = col_categories.iter().position(|c| *c == category_b)?;
            counts[row][col] += 1;
        }

        Some(Self {
            row_categories,
            col_categories,
            counts,
        })
    }

    pub fn rows(&self) -> usize {
        self.row_categories.len()
    }

    pub fn cols(&self) -> usize {
        self.col_categories.len()
    }

    /// Sum of all cells
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// `(TT, TF, FT, FF)` for a boolean x boolean table
    pub fn boolean_counts(&self) -> Option<(usize, usize, usize, usize)> {
        let flags = categories_for(VariableType::Boolean)?;
        if self.row_categories != flags || self.col_categories != flags {
            return None;
        }
        Some((
            self.counts[0][0],
            self.counts[0][1],
            self.counts[1][0],
            self.counts[1][1],
        ))
    }

    /// Highest-count cells, ties kept in row-major scan order
    pub fn top_cells(&self, n: usize) -> Vec<RankedCell> {
        let total = self.total();
        let mut cells: Vec<RankedCell> = self
            .counts
            .iter()
            .enumerate()
            .flat_map(|(row, counts)| {
                counts.iter().enumerate().map(move |(col, count)| (row, col, *count))
            })
            .map(|(row, col, count)| RankedCell {
                row,
                col,
                category_a: self.row_categories[row],
                category_b: self.col_categories[col],
                count,
                percent_of_total: percent_of(count, total),
            })
            .collect();

        // stable sort keeps scan order among equal counts
        cells.sort_by(|a, b| b.count.cmp(&a.count));
        cells.truncate(n);
        cells
    }

    /// Look up one cell chosen by the user
    pub fn select(&self, row: usize, col: usize) -> Result<SelectedCell> {
        let count = self
            .counts
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or(AnalysisError::CellOutOfRange {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })?;
        let total = self.total();
        Ok(SelectedCell {
            category_a: self.row_categories[row],
            category_b: self.col_categories[col],
            count,
            percent_of_total: percent_of(count, total),
            total,
        })
    }
}
