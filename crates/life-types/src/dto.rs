//! Request and response bodies of the board API.
//!
//! Field names are `camelCase` on the wire. Types here export `TypeScript`
//! bindings so API clients share the same shapes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::board::BoardState;
use crate::grid::{Grid, GridError};
use crate::ids::BoardId;

/// Body of `POST /api/boards`.
///
/// Both the matrix and its rows are optional at the type level so that a
/// missing or null payload is reported as a shape error instead of a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    /// Row-major matrix of `0` (dead) and `1` (alive).
    #[serde(default)]
    pub cells: Option<Vec<Option<Vec<i64>>>>,
}

impl CreateBoardRequest {
    /// Validate the payload into a [`Grid`].
    pub fn into_grid(self) -> Result<Grid, GridError> {
        let rows = self.cells.ok_or(GridError::Missing)?;
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row, values)| values.ok_or(GridError::NullRow { row }))
            .collect::<Result<Vec<_>, _>>()?;
        Grid::from_rows(&rows)
    }
}

/// Body returned by `POST /api/boards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardResponse {
    /// Identifier assigned to the new board.
    pub board_id: BoardId,
}

/// One generation as seen by API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct BoardStateResponse {
    /// Board the generation belongs to.
    pub board_id: BoardId,
    /// Generation number.
    pub generation: u64,
    /// Row-major `0`/`1` matrix.
    pub cells: Vec<Vec<u8>>,
}

impl From<&BoardState> for BoardStateResponse {
    fn from(state: &BoardState) -> Self {
        Self {
            board_id: state.board_id(),
            generation: state.generation(),
            cells: state.cells().to_rows(),
        }
    }
}

/// Body returned by `GET /api/boards/{id}/states`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct BoardStatesResponse {
    /// Board the generations belong to.
    pub board_id: BoardId,
    /// Newly produced generations in increasing order.
    pub states: Vec<BoardStateResponse>,
}
