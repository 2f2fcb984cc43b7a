//! Error types for the storage layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors and adds the two history-integrity failures the
//! repository contract distinguishes. [`DbError`] converts into the core's
//! [`RepositoryError`] at the trait boundary.

use life_core::RepositoryError;
use life_types::BoardId;

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Cells could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row does not decode into a valid board state.
    #[error("corrupt board state row: {0}")]
    Corrupt(String),

    /// A value does not fit the column it is stored in.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A generation was written for a board that does not exist.
    #[error("board {0} does not exist")]
    UnknownBoard(BoardId),

    /// A generation was written out of order or twice.
    #[error("generation {generation} of board {board_id} is not the next generation")]
    GenerationConflict {
        /// The board being written.
        board_id: BoardId,
        /// The rejected generation.
        generation: u64,
    },

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<DbError> for RepositoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UnknownBoard(board_id) => Self::UnknownBoard(board_id),
            DbError::GenerationConflict {
                board_id,
                generation,
            } => Self::GenerationConflict {
                board_id,
                generation,
            },
            other => Self::Backend(other.to_string()),
        }
    }
}
