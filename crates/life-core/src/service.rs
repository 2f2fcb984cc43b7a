//! Board advancement protocol.
//!
//! [`BoardService`] ties the transition rule and the convergence detector
//! to a [`BoardRepository`]. Each operation is a sequential chain: compute
//! one generation, wait for it to be stored, compute the next. Generation
//! N is always stored before generation N+1 is computed, so a failure
//! part-way leaves a gapless history that later requests resume from.
//!
//! The service assumes at most one in-flight advancement per board. The
//! repository's generation check turns a violation of that assumption
//! into [`LifeError::Conflict`] instead of a corrupted history.

use std::num::NonZeroU32;

use life_types::{BoardId, BoardState, Grid};
use tracing::{debug, info};

use crate::cancel::CancellationFlag;
use crate::convergence::{self, Convergence, GenerationSink};
use crate::error::LifeError;
use crate::repository::BoardRepository;
use crate::transition::next_generation;

/// Board operations over an injected repository.
#[derive(Debug, Clone)]
pub struct BoardService<R> {
    repository: R,
    cancel: CancellationFlag,
    default_max_iterations: NonZeroU32,
}

impl<R: BoardRepository> BoardService<R> {
    /// Create a service with a fresh cancellation flag.
    pub fn new(repository: R, default_max_iterations: NonZeroU32) -> Self {
        Self {
            repository,
            cancel: CancellationFlag::new(),
            default_max_iterations,
        }
    }

    /// Share an externally owned cancellation flag.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Iteration budget used when a final-state request names none.
    pub const fn default_max_iterations(&self) -> NonZeroU32 {
        self.default_max_iterations
    }

    /// Store a validated grid as generation 0 of a new board.
    pub async fn create_board(&self, cells: &Grid) -> Result<BoardId, LifeError> {
        let board_id = self.repository.create_board(cells).await?;
        info!(
            %board_id,
            rows = cells.rows(),
            columns = cells.columns(),
            population = cells.population(),
            "Created board"
        );
        Ok(board_id)
    }

    /// Compute, store, and return the generation after the latest one.
    pub async fn next_state(&self, board_id: BoardId) -> Result<BoardState, LifeError> {
        let current = self.latest(board_id).await?;
        self.step(&current).await
    }

    /// Advance a board by `steps` generations, storing each one before
    /// computing the next, and return them in order.
    ///
    /// The latest state is read once and the chain continues in memory. A
    /// concurrent writer on the same board surfaces as
    /// [`LifeError::Conflict`] partway through the run, and the generations
    /// stored before it stay in the history.
    pub async fn advance(&self, board_id: BoardId, steps: u32) -> Result<Vec<BoardState>, LifeError> {
        if steps == 0 {
            return Err(LifeError::InvalidArgument(String::from(
                "steps must be greater than zero",
            )));
        }

        let mut current = self.latest(board_id).await?;
        let mut produced = Vec::new();
        for _ in 0..steps {
            let next = self.step(&current).await?;
            produced.push(next.clone());
            current = next;
        }

        info!(
            %board_id,
            steps,
            generation = current.generation(),
            "Advanced board"
        );
        Ok(produced)
    }

    /// Fast-forward a board until it reaches a fixed point or revisits an
    /// earlier grid.
    ///
    /// Uses the configured default budget when `max_iterations` is `None`.
    pub async fn final_state(
        &self,
        board_id: BoardId,
        max_iterations: Option<u32>,
    ) -> Result<Convergence, LifeError> {
        let budget = match max_iterations {
            None => self.default_max_iterations,
            Some(n) => NonZeroU32::new(n).ok_or_else(|| {
                LifeError::InvalidArgument(String::from(
                    "max iterations must be greater than zero",
                ))
            })?,
        };

        let history = self.repository.all_states(board_id).await?;
        convergence::find_final_state(board_id, &history, budget, self).await
    }

    async fn latest(&self, board_id: BoardId) -> Result<BoardState, LifeError> {
        self.repository
            .latest_state(board_id)
            .await?
            .ok_or(LifeError::BoardNotFound(board_id))
    }

    async fn step(&self, current: &BoardState) -> Result<BoardState, LifeError> {
        let next = current.successor(next_generation(current.cells()))?;
        self.persist(&next).await?;
        Ok(next)
    }
}

impl<R: BoardRepository> GenerationSink for BoardService<R> {
    async fn persist(&self, state: &BoardState) -> Result<(), LifeError> {
        if self.cancel.is_cancelled() {
            return Err(LifeError::Cancelled {
                board_id: state.board_id(),
                generation: state.generation(),
            });
        }
        self.repository.save_state(state).await?;
        debug!(
            board_id = %state.board_id(),
            generation = state.generation(),
            population = state.cells().population(),
            "Stored generation"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::convergence::StopReason;
    use crate::repository::{InMemoryBoardRepository, RepositoryError};

    /// Wraps the in-memory repository and fails saves of one generation.
    #[derive(Clone, Default)]
    struct FlakyRepository {
        inner: InMemoryBoardRepository,
        fail_generation: Option<u64>,
    }

    impl BoardRepository for FlakyRepository {
        async fn create_board(&self, cells: &Grid) -> Result<BoardId, RepositoryError> {
            self.inner.create_board(cells).await
        }

        async fn latest_state(
            &self,
            board_id: BoardId,
        ) -> Result<Option<BoardState>, RepositoryError> {
            self.inner.latest_state(board_id).await
        }

        async fn all_states(&self, board_id: BoardId) -> Result<Vec<BoardState>, RepositoryError> {
            self.inner.all_states(board_id).await
        }

        async fn save_state(&self, state: &BoardState) -> Result<(), RepositoryError> {
            if self.fail_generation == Some(state.generation()) {
                return Err(RepositoryError::Backend(String::from("connection reset")));
            }
            self.inner.save_state(state).await
        }
    }

    /// Lets another writer store `rival_generation` just before the
    /// service's own save of it.
    #[derive(Clone, Default)]
    struct RacingRepository {
        inner: InMemoryBoardRepository,
        rival_generation: u64,
    }

    impl BoardRepository for RacingRepository {
        async fn create_board(&self, cells: &Grid) -> Result<BoardId, RepositoryError> {
            self.inner.create_board(cells).await
        }

        async fn latest_state(
            &self,
            board_id: BoardId,
        ) -> Result<Option<BoardState>, RepositoryError> {
            self.inner.latest_state(board_id).await
        }

        async fn all_states(&self, board_id: BoardId) -> Result<Vec<BoardState>, RepositoryError> {
            self.inner.all_states(board_id).await
        }

        async fn save_state(&self, state: &BoardState) -> Result<(), RepositoryError> {
            if state.generation() == self.rival_generation {
                self.inner.save_state(state).await?;
            }
            self.inner.save_state(state).await
        }
    }

    fn grid(rows: &[&[i64]]) -> Grid {
        let owned: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&owned).unwrap()
    }

    fn blinker() -> Grid {
        grid(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 0]])
    }

    fn service<R: BoardRepository>(repo: R) -> BoardService<R> {
        BoardService::new(repo, NonZeroU32::new(500).unwrap())
    }

    #[tokio::test]
    async fn next_state_stores_and_returns_generation_one() {
        let svc = service(InMemoryBoardRepository::new());
        let id = svc.create_board(&blinker()).await.unwrap();

        let next = svc.next_state(id).await.unwrap();

        assert_eq!(next.generation(), 1);
        assert_eq!(next.cells(), &next_generation(&blinker()));
        let latest = svc.repository().latest_state(id).await.unwrap().unwrap();
        assert_eq!(latest, next);
    }

    #[tokio::test]
    async fn advance_returns_exactly_n_consecutive_generations() {
        let svc = service(InMemoryBoardRepository::new());
        let start = grid(&[&[0, 1, 0, 0], &[0, 0, 1, 0], &[1, 1, 1, 0], &[0, 0, 0, 0]]);
        let id = svc.create_board(&start).await.unwrap();
        svc.next_state(id).await.unwrap();

        let states = svc.advance(id, 3).await.unwrap();

        let generations: Vec<u64> = states.iter().map(BoardState::generation).collect();
        assert_eq!(generations, vec![2, 3, 4]);

        let mut expected = next_generation(&start);
        for state in &states {
            expected = next_generation(&expected);
            assert_eq!(state.cells(), &expected);
        }
        assert_eq!(svc.repository().all_states(id).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn advance_rejects_zero_steps() {
        let svc = service(InMemoryBoardRepository::new());
        let id = svc.create_board(&blinker()).await.unwrap();
        assert!(matches!(
            svc.advance(id, 0).await,
            Err(LifeError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn unknown_board_is_not_found_everywhere() {
        let svc = service(InMemoryBoardRepository::new());
        let id = BoardId::new();

        assert!(matches!(svc.next_state(id).await, Err(LifeError::BoardNotFound(b)) if b == id));
        assert!(matches!(svc.advance(id, 2).await, Err(LifeError::BoardNotFound(b)) if b == id));
        assert!(matches!(
            svc.final_state(id, None).await,
            Err(LifeError::BoardNotFound(b)) if b == id
        ));
    }

    #[tokio::test]
    async fn failed_save_leaves_resumable_prefix() {
        let repo = FlakyRepository {
            fail_generation: Some(3),
            ..FlakyRepository::default()
        };
        let svc = service(repo);
        let id = svc.create_board(&blinker()).await.unwrap();

        let err = svc.advance(id, 5).await.unwrap_err();
        assert!(matches!(err, LifeError::Storage(_)));

        let history = svc.repository().all_states(id).await.unwrap();
        let generations: Vec<u64> = history.iter().map(BoardState::generation).collect();
        assert_eq!(generations, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn final_state_uses_default_budget_and_persists_path() {
        let svc = service(InMemoryBoardRepository::new());
        let id = svc.create_board(&grid(&[&[1, 1], &[1, 1]])).await.unwrap();

        let result = svc.final_state(id, None).await.unwrap();

        assert_eq!(result.reason, StopReason::FixedPoint);
        assert_eq!(result.iterations, 1);
        let latest = svc.repository().latest_state(id).await.unwrap().unwrap();
        assert_eq!(latest, result.state);
    }

    #[tokio::test]
    async fn final_state_rejects_zero_budget() {
        let svc = service(InMemoryBoardRepository::new());
        let id = svc.create_board(&blinker()).await.unwrap();
        assert!(matches!(
            svc.final_state(id, Some(0)).await,
            Err(LifeError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn final_state_after_advance_sees_whole_history() {
        let svc = service(InMemoryBoardRepository::new());
        let id = svc.create_board(&blinker()).await.unwrap();
        svc.advance(id, 1).await.unwrap();

        // Generations 0 and 1 are stored; generation 2 repeats generation 0.
        let result = svc.final_state(id, Some(1)).await.unwrap();
        assert_eq!(result.reason, StopReason::Cycle);
        assert_eq!(result.state.generation(), 2);
    }

    #[tokio::test]
    async fn cancellation_stops_before_storing() {
        let cancel = CancellationFlag::new();
        let svc = service(InMemoryBoardRepository::new()).with_cancellation(cancel.clone());
        let id = svc.create_board(&blinker()).await.unwrap();
        svc.next_state(id).await.unwrap();

        cancel.cancel();
        let err = svc.advance(id, 3).await.unwrap_err();

        assert!(matches!(err, LifeError::Cancelled { generation: 2, .. }));
        let latest = svc.repository().latest_state(id).await.unwrap().unwrap();
        assert_eq!(latest.generation(), 1);
    }

    #[tokio::test]
    async fn cancelled_advance_with_maximum_steps_returns_an_error() {
        let cancel = CancellationFlag::new();
        let svc = service(InMemoryBoardRepository::new()).with_cancellation(cancel.clone());
        let id = svc.create_board(&blinker()).await.unwrap();

        cancel.cancel();
        let err = svc.advance(id, u32::MAX).await.unwrap_err();

        assert!(matches!(err, LifeError::Cancelled { generation: 1, .. }));
        assert_eq!(svc.repository().all_states(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writer_is_reported_as_conflict() {
        let repo = InMemoryBoardRepository::new();
        let svc = service(repo.clone());
        let id = svc.create_board(&blinker()).await.unwrap();
        let stale = repo.latest_state(id).await.unwrap().unwrap();

        svc.next_state(id).await.unwrap();
        let err = svc.persist(&stale.successor(blinker()).unwrap()).await.unwrap_err();

        assert!(matches!(err, LifeError::Conflict { generation: 1, .. }));
    }

    #[tokio::test]
    async fn advance_stops_with_conflict_when_another_writer_interleaves() {
        let repo = RacingRepository {
            rival_generation: 3,
            ..RacingRepository::default()
        };
        let svc = service(repo);
        let id = svc.create_board(&blinker()).await.unwrap();

        let err = svc.advance(id, 5).await.unwrap_err();

        assert!(matches!(err, LifeError::Conflict { generation: 3, .. }));
        let history = svc.repository().all_states(id).await.unwrap();
        let generations: Vec<u64> = history.iter().map(BoardState::generation).collect();
        assert_eq!(generations, vec![0, 1, 2, 3]);
    }
}
