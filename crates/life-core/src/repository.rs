//! Storage contract for board histories, plus an in-memory implementation.
//!
//! The core never talks to a database directly. Everything it needs is the
//! four operations of [`BoardRepository`]; any backend that honours them
//! (in-memory, `PostgreSQL`, something else) can be injected into
//! [`BoardService`](crate::service::BoardService).
//!
//! [`InMemoryBoardRepository`] is used by tests and by the server when no
//! database is configured.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use life_types::{BoardId, BoardState, Grid};
use tokio::sync::RwLock;

/// Errors reported by a [`BoardRepository`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A state was saved for a board that was never created.
    #[error("board {0} does not exist")]
    UnknownBoard(BoardId),

    /// A state was saved whose generation is not exactly latest + 1.
    #[error("generation {generation} of board {board_id} conflicts with the stored history")]
    GenerationConflict {
        /// The board being written.
        board_id: BoardId,
        /// The rejected generation.
        generation: u64,
    },

    /// The backend itself failed (connection, query, decoding).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable, append-only storage of per-board generation histories.
///
/// Implementations must keep each board's history gapless: generation 0
/// is written by [`create_board`](Self::create_board) and every
/// [`save_state`](Self::save_state) must carry the next generation.
pub trait BoardRepository: Send + Sync {
    /// Store `cells` as generation 0 of a new board and return its id.
    fn create_board(
        &self,
        cells: &Grid,
    ) -> impl Future<Output = Result<BoardId, RepositoryError>> + Send;

    /// The highest stored generation of a board, or `None` if the board
    /// is unknown.
    fn latest_state(
        &self,
        board_id: BoardId,
    ) -> impl Future<Output = Result<Option<BoardState>, RepositoryError>> + Send;

    /// Every stored generation of a board in increasing order, or an empty
    /// vector if the board is unknown.
    fn all_states(
        &self,
        board_id: BoardId,
    ) -> impl Future<Output = Result<Vec<BoardState>, RepositoryError>> + Send;

    /// Append a generation.
    ///
    /// Fails with [`RepositoryError::UnknownBoard`] if the board was never
    /// created and with [`RepositoryError::GenerationConflict`] if the
    /// generation is not the next one.
    fn save_state(
        &self,
        state: &BoardState,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Process-local board storage.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardRepository {
    boards: Arc<RwLock<BTreeMap<BoardId, Vec<BoardState>>>>,
}

impl InMemoryBoardRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardRepository for InMemoryBoardRepository {
    async fn create_board(&self, cells: &Grid) -> Result<BoardId, RepositoryError> {
        let board_id = BoardId::new();
        let initial = BoardState::initial(board_id, cells.clone());
        self.boards.write().await.insert(board_id, vec![initial]);
        tracing::debug!(%board_id, "Created in-memory board");
        Ok(board_id)
    }

    async fn latest_state(&self, board_id: BoardId) -> Result<Option<BoardState>, RepositoryError> {
        let boards = self.boards.read().await;
        Ok(boards
            .get(&board_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn all_states(&self, board_id: BoardId) -> Result<Vec<BoardState>, RepositoryError> {
        let boards = self.boards.read().await;
        Ok(boards.get(&board_id).cloned().unwrap_or_default())
    }

    async fn save_state(&self, state: &BoardState) -> Result<(), RepositoryError> {
        let board_id = state.board_id();
        let mut boards = self.boards.write().await;
        let history = boards
            .get_mut(&board_id)
            .ok_or(RepositoryError::UnknownBoard(board_id))?;

        let expected = history
            .last()
            .map_or(0, |latest| latest.generation().saturating_add(1));
        if state.generation() != expected {
            return Err(RepositoryError::GenerationConflict {
                board_id,
                generation: state.generation(),
            });
        }

        history.push(state.clone());
        Ok(())
    }
}
