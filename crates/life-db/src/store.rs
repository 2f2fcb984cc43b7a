//! Backend selection for board storage.
//!
//! Defines an enum-based dispatch over the repository implementations so
//! the server can pick one at startup from `storage.backend` without
//! boxing futures.

use life_core::config::{StorageBackend, StorageConfig};
use life_core::{BoardRepository, InMemoryBoardRepository, RepositoryError};
use life_types::{BoardId, BoardState, Grid};

use crate::board_store::PgBoardRepository;
use crate::error::DbError;
use crate::postgres::{PostgresConfig, PostgresPool};

// ---------------------------------------------------------------------------
// Unified store enum (dyn-compatible alternative to trait objects)
// ---------------------------------------------------------------------------

/// The configured board store.
#[derive(Debug, Clone)]
pub enum BoardStore {
    /// Process-local storage.
    Memory(InMemoryBoardRepository),
    /// `PostgreSQL` storage.
    Postgres(PgBoardRepository),
}

impl BoardStore {
    /// Open the store named by `storage.backend`.
    ///
    /// For `postgres`, connects the pool and applies migrations when
    /// `storage.run_migrations` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the pool cannot connect or a migration fails.
    pub async fn connect(config: &StorageConfig) -> Result<Self, DbError> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory board storage");
                Ok(Self::Memory(InMemoryBoardRepository::new()))
            }
            StorageBackend::Postgres => {
                let pool = PostgresPool::connect(&PostgresConfig::from(config)).await?;
                if config.run_migrations {
                    pool.run_migrations().await?;
                }
                Ok(Self::Postgres(PgBoardRepository::new(pool.into_inner())))
            }
        }
    }

    /// Release backend resources. Clones of a `Postgres` store share one
    /// pool, so this closes it for all of them.
    pub async fn close(&self) {
        if let Self::Postgres(repo) = self {
            repo.close().await;
        }
    }

    /// Short backend name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl BoardRepository for BoardStore {
    async fn create_board(&self, cells: &Grid) -> Result<BoardId, RepositoryError> {
        match self {
            Self::Memory(repo) => repo.create_board(cells).await,
            Self::Postgres(repo) => repo.create_board(cells).await,
        }
    }

    async fn latest_state(&self, board_id: BoardId) -> Result<Option<BoardState>, RepositoryError> {
        match self {
            Self::Memory(repo) => repo.latest_state(board_id).await,
            Self::Postgres(repo) => repo.latest_state(board_id).await,
        }
    }

    async fn all_states(&self, board_id: BoardId) -> Result<Vec<BoardState>, RepositoryError> {
        match self {
            Self::Memory(repo) => repo.all_states(board_id).await,
            Self::Postgres(repo) => repo.all_states(board_id).await,
        }
    }

    async fn save_state(&self, state: &BoardState) -> Result<(), RepositoryError> {
        match self {
            Self::Memory(repo) => repo.save_state(state).await,
            Self::Postgres(repo) => repo.save_state(state).await,
        }
    }
}
