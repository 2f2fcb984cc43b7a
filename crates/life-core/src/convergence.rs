//! Fast-forwarding a board until it settles.
//!
//! A board has settled when the next generation is either identical to
//! the current one (a fixed point) or identical to any generation seen
//! before (a cycle of some period). Detection works on [`Fingerprint`]s of
//! the whole history, seeded from every stored generation, so cycles of
//! any length are caught, not only period-1 ones.
//!
//! Every computed generation is handed to a [`GenerationSink`] before it
//! is checked, including the one that closes the cycle. The returned
//! final state is therefore always part of the stored history.

use std::collections::HashSet;
use std::future::Future;
use std::num::NonZeroU32;

use life_types::{BoardId, BoardState, Fingerprint};
use tracing::info;

use crate::error::LifeError;
use crate::transition::next_generation;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last generation maps onto itself.
    FixedPoint,
    /// The last generation repeats an earlier, different one.
    Cycle,
}

/// Outcome of a successful search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergence {
    /// The first generation that repeats an earlier grid.
    pub state: BoardState,
    /// How many generations were computed to get there.
    pub iterations: u32,
    /// Fixed point or longer cycle.
    pub reason: StopReason,
}

/// Destination for generations computed during the search.
pub trait GenerationSink: Sync {
    /// Persist one generation. An error aborts the search.
    fn persist(&self, state: &BoardState) -> impl Future<Output = Result<(), LifeError>> + Send;
}

/// Advance from the last entry of `history` until the board settles or
/// `max_iterations` generations have been computed.
///
/// `history` must hold every stored generation of `board_id` in order;
/// an empty history means the board does not exist.
pub async fn find_final_state<S: GenerationSink>(
    board_id: BoardId,
    history: &[BoardState],
    max_iterations: NonZeroU32,
    sink: &S,
) -> Result<Convergence, LifeError> {
    let Some(last) = history.last() else {
        return Err(LifeError::BoardNotFound(board_id));
    };

    let mut seen: HashSet<Fingerprint> = history
        .iter()
        .map(|state| state.cells().fingerprint())
        .collect();
    let mut current = last.clone();

    for iteration in 1..=max_iterations.get() {
        let next = current.successor(next_generation(current.cells()))?;
        sink.persist(&next).await?;

        let reason = if next.cells() == current.cells() {
            Some(StopReason::FixedPoint)
        } else if !seen.insert(next.cells().fingerprint()) {
            Some(StopReason::Cycle)
        } else {
            None
        };

        if let Some(reason) = reason {
            info!(
                %board_id,
                generation = next.generation(),
                iterations = iteration,
                ?reason,
                "Final state reached"
            );
            return Ok(Convergence {
                state: next,
                iterations: iteration,
                reason,
            });
        }

        current = next;
    }

    Err(LifeError::NoConvergence {
        board_id,
        iterations: max_iterations.get(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use life_types::Grid;

    use super::*;

    /// Collects persisted generations; optionally fails at one generation.
    #[derive(Default)]
    struct RecordingSink {
        stored: Mutex<Vec<BoardState>>,
        fail_at: Option<u64>,
    }

    impl RecordingSink {
        fn generations(&self) -> Vec<u64> {
            self.stored
                .lock()
                .unwrap()
                .iter()
                .map(BoardState::generation)
                .collect()
        }
    }

    impl GenerationSink for RecordingSink {
        async fn persist(&self, state: &BoardState) -> Result<(), LifeError> {
            if self.fail_at == Some(state.generation()) {
                return Err(LifeError::Storage(String::from("disk full")));
            }
            self.stored.lock().unwrap().push(state.clone());
            Ok(())
        }
    }

    fn grid(rows: &[&[i64]]) -> Grid {
        let owned: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&owned).unwrap()
    }

    fn budget(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    /// A glider in the top-left of a 12x12 board; it needs far more than
    /// four generations to reach an edge.
    fn glider() -> Grid {
        let mut rows = vec![vec![0_i64; 12]; 12];
        for (r, c) in [(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)] {
            if let Some(cell) = rows.get_mut(r).and_then(|row| row.get_mut(c)) {
                *cell = 1;
            }
        }
        Grid::from_rows(&rows).unwrap()
    }

    #[tokio::test]
    async fn block_converges_in_one_iteration() {
        let id = BoardId::new();
        let history = vec![BoardState::initial(id, grid(&[&[1, 1], &[1, 1]]))];
        let sink = RecordingSink::default();

        let result = find_final_state(id, &history, budget(500), &sink).await.unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.reason, StopReason::FixedPoint);
        assert_eq!(result.state.generation(), 1);
        assert_eq!(sink.generations(), vec![1]);
    }

    #[tokio::test]
    async fn blinker_cycle_is_detected_within_two_iterations() {
        let id = BoardId::new();
        let horizontal = grid(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 0]]);
        let history = vec![BoardState::initial(id, horizontal.clone())];
        let sink = RecordingSink::default();

        let result = find_final_state(id, &history, budget(2), &sink).await.unwrap();

        assert_eq!(result.iterations, 2);
        assert_eq!(result.reason, StopReason::Cycle);
        assert_eq!(result.state.generation(), 2);
        assert_eq!(result.state.cells(), &horizontal);
        assert_eq!(sink.generations(), vec![1, 2]);
    }

    #[tokio::test]
    async fn seeded_history_catches_cycle_immediately() {
        let id = BoardId::new();
        let horizontal = grid(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 0]]);
        let vertical = grid(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 0]]);
        let zero = BoardState::initial(id, horizontal);
        let one = zero.successor(vertical).unwrap();
        let history = vec![zero, one];
        let sink = RecordingSink::default();

        let result = find_final_state(id, &history, budget(1), &sink).await.unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.state.generation(), 2);
    }

    #[tokio::test]
    async fn exhausted_budget_reports_no_convergence() {
        let id = BoardId::new();
        let history = vec![BoardState::initial(id, glider())];
        let sink = RecordingSink::default();

        let err = find_final_state(id, &history, budget(4), &sink).await.unwrap_err();

        assert!(matches!(
            err,
            LifeError::NoConvergence { board_id, iterations: 4 } if board_id == id
        ));
        assert_eq!(sink.generations(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn empty_history_means_unknown_board() {
        let id = BoardId::new();
        let sink = RecordingSink::default();
        let err = find_final_state(id, &[], budget(10), &sink).await.unwrap_err();
        assert!(matches!(err, LifeError::BoardNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn sink_failure_aborts_search_with_prefix_kept() {
        let id = BoardId::new();
        let history = vec![BoardState::initial(id, glider())];
        let sink = RecordingSink {
            fail_at: Some(3),
            ..RecordingSink::default()
        };

        let err = find_final_state(id, &history, budget(50), &sink).await.unwrap_err();

        assert!(matches!(err, LifeError::Storage(_)));
        assert_eq!(sink.generations(), vec![1, 2]);
    }

    #[tokio::test]
    async fn dying_pattern_settles_on_empty_board() {
        let id = BoardId::new();
        let history = vec![BoardState::initial(id, grid(&[&[1, 0, 0], &[0, 0, 0], &[0, 0, 1]]))];
        let sink = RecordingSink::default();

        let result = find_final_state(id, &history, budget(10), &sink).await.unwrap();

        assert_eq!(result.state.cells().population(), 0);
        assert_eq!(result.reason, StopReason::FixedPoint);
        assert_eq!(result.iterations, 2);
    }
}
