//! `PostgreSQL` board repository.
//!
//! A board is one row in `boards` plus one row per generation in
//! `board_states`. Cells are stored as a JSONB matrix of 0/1 so the table
//! is readable from `psql` and decodes back through the same validation
//! as API input.
//!
//! Appends are conditional: the insert only happens when the generation
//! equals the stored maximum plus one. Two writers racing on the same
//! generation collide on the `(board_id, generation)` primary key.

use life_core::{BoardRepository, RepositoryError};
use life_types::{BoardId, BoardState, Grid};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Board storage backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    /// Create a repository over an existing pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }

    /// Insert the board row and generation 0 in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Encoding`] if the grid does not fit the schema
    /// and [`DbError::Postgres`] if either insert fails.
    pub async fn insert_board(&self, cells: &Grid) -> Result<BoardId, DbError> {
        let board_id = BoardId::new();
        let row_count = i32::try_from(cells.rows())
            .map_err(|e| DbError::Encoding(format!("{} rows: {e}", cells.rows())))?;
        let column_count = i32::try_from(cells.columns())
            .map_err(|e| DbError::Encoding(format!("{} columns: {e}", cells.columns())))?;
        let encoded = serde_json::to_value(cells)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"INSERT INTO boards (id, row_count, column_count)
              VALUES ($1, $2, $3)",
        )
        .bind(board_id.into_inner())
        .bind(row_count)
        .bind(column_count)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"INSERT INTO board_states (board_id, generation, cells)
              VALUES ($1, 0, $2)",
        )
        .bind(board_id.into_inner())
        .bind(&encoded)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(%board_id, row_count, column_count, "Inserted board");
        Ok(board_id)
    }

    /// Fetch the highest stored generation of a board.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Corrupt`] if the stored row does not decode.
    pub async fn get_latest_state(&self, board_id: BoardId) -> Result<Option<BoardState>, DbError> {
        let row = sqlx::query_as::<_, BoardStateRow>(
            r"SELECT board_id, generation, cells, created_at
              FROM board_states
              WHERE board_id = $1
              ORDER BY generation DESC
              LIMIT 1",
        )
        .bind(board_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(BoardStateRow::into_state).transpose()
    }

    /// Fetch every stored generation of a board in increasing order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Corrupt`] if any stored row does not decode.
    pub async fn get_all_states(&self, board_id: BoardId) -> Result<Vec<BoardState>, DbError> {
        let rows = sqlx::query_as::<_, BoardStateRow>(
            r"SELECT board_id, generation, cells, created_at
              FROM board_states
              WHERE board_id = $1
              ORDER BY generation ASC",
        )
        .bind(board_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BoardStateRow::into_state).collect()
    }

    /// Append a generation if it directly follows the stored maximum.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownBoard`] if the board row is missing,
    /// [`DbError::GenerationConflict`] if the generation is not the next
    /// one, and [`DbError::Postgres`] for any other failure.
    pub async fn append_state(&self, state: &BoardState) -> Result<(), DbError> {
        let board_id = state.board_id();
        let generation = state.generation();
        let generation_i64 = i64::try_from(generation)
            .map_err(|e| DbError::Encoding(format!("generation {generation}: {e}")))?;
        let encoded = serde_json::to_value(state.cells())?;

        let result = sqlx::query(
            r"INSERT INTO board_states (board_id, generation, cells)
              SELECT $1::uuid, $2::bigint, $3::jsonb
              WHERE $2::bigint = (
                  SELECT COALESCE(MAX(generation) + 1, 0)
                  FROM board_states
                  WHERE board_id = $1::uuid
              )",
        )
        .bind(board_id.into_inner())
        .bind(generation_i64)
        .bind(&encoded)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, board_id, generation))?;

        if result.rows_affected() == 0 {
            return if self.board_exists(board_id).await? {
                Err(DbError::GenerationConflict {
                    board_id,
                    generation,
                })
            } else {
                Err(DbError::UnknownBoard(board_id))
            };
        }

        tracing::debug!(%board_id, generation, "Appended board state");
        Ok(())
    }

    async fn board_exists(&self, board_id: BoardId) -> Result<bool, DbError> {
        let exists =
            sqlx::query_scalar::<_, bool>(r"SELECT EXISTS (SELECT 1 FROM boards WHERE id = $1)")
                .bind(board_id.into_inner())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

/// Map constraint violations on `board_states` to history errors.
fn classify_write_error(err: sqlx::Error, board_id: BoardId, generation: u64) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return DbError::GenerationConflict {
                board_id,
                generation,
            };
        }
        if db_err.is_foreign_key_violation() {
            return DbError::UnknownBoard(board_id);
        }
    }
    DbError::Postgres(err)
}

impl BoardRepository for PgBoardRepository {
    async fn create_board(&self, cells: &Grid) -> Result<BoardId, RepositoryError> {
        Ok(self.insert_board(cells).await?)
    }

    async fn latest_state(&self, board_id: BoardId) -> Result<Option<BoardState>, RepositoryError> {
        Ok(self.get_latest_state(board_id).await?)
    }

    async fn all_states(&self, board_id: BoardId) -> Result<Vec<BoardState>, RepositoryError> {
        Ok(self.get_all_states(board_id).await?)
    }

    async fn save_state(&self, state: &BoardState) -> Result<(), RepositoryError> {
        Ok(self.append_state(state).await?)
    }
}

/// A row from the `board_states` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoardStateRow {
    /// Owning board.
    pub board_id: Uuid,
    /// Generation number, 0 for the initial grid.
    pub generation: i64,
    /// Cells as a JSON matrix of 0/1.
    pub cells: serde_json::Value,
    /// When the generation was stored.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl BoardStateRow {
    /// Decode the row, re-validating the stored grid.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Corrupt`] if the generation is negative or the
    /// cells are not a rectangular 0/1 matrix.
    pub fn into_state(self) -> Result<BoardState, DbError> {
        let board_id = BoardId::from(self.board_id);
        let generation = u64::try_from(self.generation).map_err(|e| {
            DbError::Corrupt(format!(
                "board {board_id} has generation {}: {e}",
                self.generation
            ))
        })?;
        let cells: Grid = serde_json::from_value(self.cells).map_err(|e| {
            DbError::Corrupt(format!("board {board_id} generation {generation}: {e}"))
        })?;
        Ok(BoardState::restore(board_id, generation, cells))
    }
}
