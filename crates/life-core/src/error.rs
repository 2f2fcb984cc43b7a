//! Error taxonomy of the simulation core.
//!
//! [`LifeError`] is what every [`BoardService`](crate::service::BoardService)
//! operation returns. The HTTP layer maps each variant to a status code;
//! only [`LifeError::Storage`] and [`LifeError::Internal`] are server-side
//! failures.

use life_types::{BoardId, GridError, StateError};

use crate::repository::RepositoryError;

/// Errors produced by board operations.
#[derive(Debug, thiserror::Error)]
pub enum LifeError {
    /// The supplied cell matrix is malformed.
    #[error("invalid board state: {0}")]
    InvalidShape(#[from] GridError),

    /// A numeric request parameter is out of range.
    #[error("{0}")]
    InvalidArgument(String),

    /// No board with this identity exists.
    #[error("board with id '{0}' was not found")]
    BoardNotFound(BoardId),

    /// The iteration budget ran out before a fixed point or cycle.
    #[error("final state was not reached for board '{board_id}' after {iterations} iterations")]
    NoConvergence {
        /// The board that did not settle.
        board_id: BoardId,
        /// The iteration budget that was used up.
        iterations: u32,
    },

    /// Another request stored this generation first.
    #[error("generation {generation} of board '{board_id}' was already stored by another request")]
    Conflict {
        /// The contested board.
        board_id: BoardId,
        /// The generation that could not be written.
        generation: u64,
    },

    /// Advancement stopped because the service is shutting down.
    #[error("advancement of board '{board_id}' was cancelled before generation {generation} was stored")]
    Cancelled {
        /// The board being advanced.
        board_id: BoardId,
        /// The generation that was not stored.
        generation: u64,
    },

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A computed state broke a structural invariant.
    #[error("internal error: {0}")]
    Internal(#[from] StateError),
}

impl From<RepositoryError> for LifeError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownBoard(board_id) => Self::BoardNotFound(board_id),
            RepositoryError::GenerationConflict {
                board_id,
                generation,
            } => Self::Conflict {
                board_id,
                generation,
            },
            RepositoryError::Backend(message) => Self::Storage(message),
        }
    }
}
