//! REST API endpoint handlers for the board API.
//!
//! Handlers parse and validate the request, delegate to the
//! [`BoardService`](life_core::BoardService) in [`AppState`], and project
//! the resulting states onto the wire DTOs. Validation failures never reach
//! the simulation core.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/boards` | Create a board from a cell matrix |
//! | `GET` | `/api/boards/{id}/next` | Compute and store the next generation |
//! | `GET` | `/api/boards/{id}/states?steps=N` | Advance N generations |
//! | `GET` | `/api/boards/{id}/final?maxIterations=N` | Run to a fixed point or cycle |
//! | `GET` | `/health` | Liveness probe |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use life_core::BoardRepository;
use life_types::{
    BoardId, BoardStateResponse, BoardStatesResponse, CreateBoardRequest, CreateBoardResponse,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/boards/{id}/states`.
#[derive(Debug, Deserialize)]
pub struct StatesQuery {
    /// Number of generations to advance. Required, must be positive.
    pub steps: Option<i64>,
}

/// Query parameters for `GET /api/boards/{id}/final`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalQuery {
    /// Iteration budget. Defaults to the configured budget.
    pub max_iterations: Option<i64>,
}

// ---------------------------------------------------------------------------
// POST /api/boards
// ---------------------------------------------------------------------------

/// Validate a cell matrix and store it as generation 0 of a new board.
///
/// Responds `201 Created` with a `Location` header pointing at the
/// board's next-generation endpoint.
pub async fn create_board<R: BoardRepository>(
    State(state): State<Arc<AppState<R>>>,
    body: Result<Json<CreateBoardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let grid = request.into_grid()?;

    let board_id = state.service.create_board(&grid).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/boards/{board_id}/next"))],
        Json(CreateBoardResponse { board_id }),
    ))
}

// ---------------------------------------------------------------------------
// GET /api/boards/{id}/next
// ---------------------------------------------------------------------------

/// Compute, store, and return the generation after the latest one.
pub async fn next_state<R: BoardRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<BoardStateResponse>, ApiError> {
    let board_id = parse_board_id(&id)?;
    let next = state.service.next_state(board_id).await?;
    Ok(Json(BoardStateResponse::from(&next)))
}

// ---------------------------------------------------------------------------
// GET /api/boards/{id}/states
// ---------------------------------------------------------------------------

/// Advance a board by `steps` generations and return all of them.
pub async fn advance<R: BoardRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    query: Result<Query<StatesQuery>, QueryRejection>,
) -> Result<Json<BoardStatesResponse>, ApiError> {
    let Query(params) = query?;
    let steps = positive_u32(params.steps, "steps")?
        .ok_or_else(|| ApiError::InvalidQuery(String::from("steps is required")))?;
    let board_id = parse_board_id(&id)?;

    let states = state.service.advance(board_id, steps).await?;

    Ok(Json(BoardStatesResponse {
        board_id,
        states: states.iter().map(BoardStateResponse::from).collect(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/boards/{id}/final
// ---------------------------------------------------------------------------

/// Run a board forward until it stops changing or repeats itself.
///
/// Responds `422` when the iteration budget runs out first.
pub async fn final_state<R: BoardRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    query: Result<Query<FinalQuery>, QueryRejection>,
) -> Result<Json<BoardStateResponse>, ApiError> {
    let Query(params) = query?;
    let budget = positive_u32(params.max_iterations, "maxIterations")?;
    let board_id = parse_board_id(&id)?;

    let outcome = state.service.final_state(board_id, budget).await?;
    Ok(Json(BoardStateResponse::from(&outcome.state)))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Board ids are opaque; a segment that is not a UUID names no board.
fn parse_board_id(s: &str) -> Result<BoardId, ApiError> {
    s.parse::<BoardId>().map_err(|e| {
        tracing::debug!(id = s, error = %e, "Path segment is not a board id");
        ApiError::UnknownBoard(s.to_owned())
    })
}

/// Check an optional count parameter is in `1..=u32::MAX`.
fn positive_u32(value: Option<i64>, name: &str) -> Result<Option<u32>, ApiError> {
    value
        .map(|n| {
            u32::try_from(n)
                .ok()
                .filter(|&count| count > 0)
                .ok_or_else(|| {
                    ApiError::InvalidQuery(format!(
                        "{name} must be between 1 and {}, got {n}",
                        u32::MAX
                    ))
                })
        })
        .transpose()
}
