//! The B3/S23 transition rule on a bounded grid.
//!
//! Neighbours that fall outside the grid count as dead; the board does
//! not wrap around. The functions here are pure and deterministic: the
//! same input grid always produces the same output grid.

use life_types::Grid;

/// Row/column offsets of the eight surrounding cells.
const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Compute the generation that follows `grid`.
///
/// An alive cell survives with two or three alive neighbours; a dead cell
/// becomes alive with exactly three. Everything else is dead.
pub fn next_generation(grid: &Grid) -> Grid {
    grid.map_cells(|row, column, alive| {
        matches!(
            (alive, alive_neighbours(grid, row, column)),
            (true, 2 | 3) | (false, 3)
        )
    })
}

/// Count the alive cells among the up-to-eight in-bounds neighbours of
/// `(row, column)`.
pub fn alive_neighbours(grid: &Grid, row: usize, column: usize) -> u8 {
    NEIGHBOUR_OFFSETS
        .iter()
        .filter(|&&(dr, dc)| {
            match (row.checked_add_signed(dr), column.checked_add_signed(dc)) {
                (Some(r), Some(c)) => grid.is_alive(r, c),
                _ => false,
            }
        })
        .fold(0_u8, |count, _| count.saturating_add(1))
}
