//! One generation of one board.

use crate::grid::Grid;
use crate::ids::BoardId;

/// Consistency failures when deriving a successor state.
///
/// These cannot be caused by client input: the transition function
/// always preserves shape, so hitting one of these means a defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The successor grid does not have the predecessor's dimensions.
    #[error("successor grid is {found_rows}x{found_columns}, expected {rows}x{columns}")]
    ShapeChanged {
        /// Predecessor row count.
        rows: usize,
        /// Predecessor column count.
        columns: usize,
        /// Successor row count.
        found_rows: usize,
        /// Successor column count.
        found_columns: usize,
    },

    /// The generation counter cannot be advanced any further.
    #[error("generation counter overflow after generation {0}")]
    GenerationOverflow(u64),
}

/// Immutable snapshot of a board at one generation.
///
/// Generation 0 is the state the client supplied; every later generation
/// is produced by [`BoardState::successor`] from the one before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    board_id: BoardId,
    generation: u64,
    cells: Grid,
}

impl BoardState {
    /// The client-supplied generation 0 of a board.
    pub const fn initial(board_id: BoardId, cells: Grid) -> Self {
        Self {
            board_id,
            generation: 0,
            cells,
        }
    }

    /// Rebuild a state loaded from storage.
    pub const fn restore(board_id: BoardId, generation: u64, cells: Grid) -> Self {
        Self {
            board_id,
            generation,
            cells,
        }
    }

    /// Wrap `cells` as the generation following this one.
    pub fn successor(&self, cells: Grid) -> Result<Self, StateError> {
        if cells.rows() != self.cells.rows() || cells.columns() != self.cells.columns() {
            return Err(StateError::ShapeChanged {
                rows: self.cells.rows(),
                columns: self.cells.columns(),
                found_rows: cells.rows(),
                found_columns: cells.columns(),
            });
        }
        let generation = self
            .generation
            .checked_add(1)
            .ok_or(StateError::GenerationOverflow(self.generation))?;
        Ok(Self {
            board_id: self.board_id,
            generation,
            cells,
        })
    }

    /// The board this state belongs to.
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Generation number, starting at 0.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The cell matrix.
    pub const fn cells(&self) -> &Grid {
        &self.cells
    }
}
