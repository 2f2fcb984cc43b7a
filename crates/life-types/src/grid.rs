//! The validated cell matrix of one generation.
//!
//! A [`Grid`] can only be obtained through validation ([`Grid::from_rows`],
//! deserialization) or by mapping an existing grid cell-for-cell
//! ([`Grid::map_cells`]), so every value of this type satisfies:
//!
//! - at least one row and one column,
//! - every row has the same length,
//! - every cell is dead or alive (`0` or `1` on the wire).
//!
//! Cells are stored row-major in a flat vector. Coordinates outside the
//! grid read as dead, which is what gives the board its fixed,
//! non-wrapping edges.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Number of cells packed into one fingerprint word.
const FINGERPRINT_WORD_BITS: usize = 64;

/// Ways a raw cell matrix can fail validation.
///
/// Every variant is a client error: the payload describes a board the
/// simulation cannot run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// No cell matrix was supplied at all.
    #[error("cells payload is required")]
    Missing,

    /// A row of the matrix was null.
    #[error("row {row} cannot be null")]
    NullRow {
        /// Zero-based index of the null row.
        row: usize,
    },

    /// The matrix has no rows.
    #[error("board must contain at least one row")]
    NoRows,

    /// The first row has no columns.
    #[error("board must contain at least one column")]
    NoColumns,

    /// A row is shorter or longer than the first row.
    #[error("all rows must contain the same number of columns (row {row} has {found}, expected {expected})")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },

    /// A cell holds something other than `0` or `1`.
    #[error("cells must be either 0 or 1 (found {value} at row {row}, column {column})")]
    NonBinaryCell {
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        column: usize,
        /// The value that was supplied.
        value: i64,
    },
}

/// A rectangular matrix of dead/alive cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<u8>>")]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Validate a raw integer matrix.
    ///
    /// Rows are checked in order; the first rule a row breaks is the
    /// error reported.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, GridError> {
        let first = rows.first().ok_or(GridError::NoRows)?;
        let columns = first.len();
        if columns == 0 {
            return Err(GridError::NoColumns);
        }

        let mut cells = Vec::with_capacity(rows.len().saturating_mul(columns));
        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns {
                return Err(GridError::RaggedRow {
                    row,
                    expected: columns,
                    found: values.len(),
                });
            }
            for (column, &value) in values.iter().enumerate() {
                match value {
                    0 => cells.push(false),
                    1 => cells.push(true),
                    _ => return Err(GridError::NonBinaryCell { row, column, value }),
                }
            }
        }

        Ok(Self {
            rows: rows.len(),
            columns,
            cells,
        })
    }

    /// An all-dead grid of the given size.
    pub fn dead(rows: NonZeroUsize, columns: NonZeroUsize) -> Self {
        Self {
            rows: rows.get(),
            columns: columns.get(),
            cells: vec![false; rows.get().saturating_mul(columns.get())],
        }
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Whether the cell at `(row, column)` is alive.
    ///
    /// Coordinates outside the grid are dead.
    pub fn is_alive(&self, row: usize, column: usize) -> bool {
        self.index(row, column)
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Number of alive cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Build a grid of the same shape by computing every cell from its
    /// coordinates and current value.
    ///
    /// The shape cannot change, so the result is valid by construction.
    #[must_use]
    pub fn map_cells(&self, mut f: impl FnMut(usize, usize, bool) -> bool) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for row in 0..self.rows {
            for column in 0..self.columns {
                cells.push(f(row, column, self.is_alive(row, column)));
            }
        }
        Self {
            rows: self.rows,
            columns: self.columns,
            cells,
        }
    }

    /// Copy the cells out as a `0`/`1` matrix.
    ///
    /// The returned rows are owned by the caller; mutating them has no
    /// effect on this grid.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().map(|&alive| u8::from(alive)).collect())
            .collect()
    }

    /// Content fingerprint used for fixed-point and cycle detection.
    pub fn fingerprint(&self) -> Fingerprint {
        let bits = self
            .cells
            .chunks(FINGERPRINT_WORD_BITS)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0_u64, |word, &alive| word.rotate_left(1) | u64::from(alive))
            })
            .collect();
        Fingerprint {
            rows: self.rows,
            columns: self.columns,
            bits,
        }
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        row.checked_mul(self.columns)?.checked_add(column)
    }
}

impl TryFrom<Vec<Vec<i64>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

/// Compact identity of a grid's full contents.
///
/// Two fingerprints are equal exactly when the grids they came from have
/// the same dimensions and the same value in every cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    rows: usize,
    columns: usize,
    bits: Vec<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(rows: &[&[i64]]) -> Grid {
        let owned: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&owned).unwrap()
    }

    #[test]
    fn valid_matrix_round_trips_exact_cells() {
        let g = grid(&[&[0, 1, 0], &[1, 1, 0]]);
        assert_eq!(g.rows(), 2);
        assert_eq!(g.columns(), 3);
        assert_eq!(g.to_rows(), vec![vec![0, 1, 0], vec![1, 1, 0]]);
        assert_eq!(g.population(), 3);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert_eq!(Grid::from_rows(&[]), Err(GridError::NoRows));
    }

    #[test]
    fn empty_first_row_is_rejected() {
        assert_eq!(Grid::from_rows(&[vec![]]), Err(GridError::NoColumns));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = Grid::from_rows(&[vec![0, 1], vec![1, 0], vec![1]]);
        assert_eq!(
            result,
            Err(GridError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn non_binary_values_are_rejected() {
        let result = Grid::from_rows(&[vec![0, 1], vec![2, 0]]);
        assert_eq!(
            result,
            Err(GridError::NonBinaryCell {
                row: 1,
                column: 0,
                value: 2
            })
        );
        assert!(Grid::from_rows(&[vec![-1]]).is_err());
    }

    #[test]
    fn out_of_bounds_reads_as_dead() {
        let g = grid(&[&[1, 1], &[1, 1]]);
        assert!(g.is_alive(1, 1));
        assert!(!g.is_alive(2, 0));
        assert!(!g.is_alive(0, 2));
        assert!(!g.is_alive(usize::MAX, usize::MAX));
    }

    #[test]
    fn to_rows_is_an_independent_copy() {
        let g = grid(&[&[1, 0]]);
        let mut copy = g.to_rows();
        if let Some(cell) = copy.first_mut().and_then(|row| row.first_mut()) {
            *cell = 0;
        }
        assert!(g.is_alive(0, 0));
    }

    #[test]
    fn map_cells_preserves_shape() {
        let g = grid(&[&[1, 0, 1], &[0, 0, 0]]);
        let inverted = g.map_cells(|_, _, alive| !alive);
        assert_eq!(inverted.rows(), 2);
        assert_eq!(inverted.columns(), 3);
        assert_eq!(inverted.to_rows(), vec![vec![0, 1, 0], vec![1, 1, 1]]);
    }

    #[test]
    fn fingerprints_match_only_identical_grids() {
        let a = grid(&[&[0, 1], &[1, 0]]);
        let b = grid(&[&[0, 1], &[1, 0]]);
        let c = grid(&[&[1, 0], &[0, 1]]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_shape_with_same_cells() {
        // Same four dead cells, laid out 1x4 vs 2x2 vs 4x1.
        let wide = grid(&[&[0, 0, 0, 0]]);
        let square = grid(&[&[0, 0], &[0, 0]]);
        let tall = grid(&[&[0], &[0], &[0], &[0]]);
        assert_ne!(wide.fingerprint(), square.fingerprint());
        assert_ne!(square.fingerprint(), tall.fingerprint());
    }

    #[test]
    fn fingerprint_spans_multiple_words() {
        let mut row = vec![0; 130];
        let base = Grid::from_rows(&[row.clone()]).unwrap();
        if let Some(cell) = row.get_mut(129) {
            *cell = 1;
        }
        let tail_alive = Grid::from_rows(&[row]).unwrap();
        assert_ne!(base.fingerprint(), tail_alive.fingerprint());
    }

    #[test]
    fn dead_grid_has_no_population() {
        let three = NonZeroUsize::new(3).unwrap();
        let g = Grid::dead(three, three);
        assert_eq!(g.population(), 0);
        assert_eq!(g.to_rows(), vec![vec![0; 3]; 3]);
    }

    #[test]
    fn serde_uses_the_matrix_form_and_validates() {
        let g = grid(&[&[1, 0], &[0, 1]]);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json, serde_json::json!([[1, 0], [0, 1]]));

        let back: Grid = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);

        let ragged: Result<Grid, _> = serde_json::from_value(serde_json::json!([[1, 0], [1]]));
        assert!(ragged.is_err());
    }
}
