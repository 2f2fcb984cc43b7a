//! Shared type definitions for the Life service.
//!
//! This crate is the single source of truth for the values that flow
//! between the simulation core, the storage layer, and the HTTP API.
//! Wire types export `TypeScript` bindings via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- [`BoardId`], the opaque board identity
//! - [`grid`] -- [`Grid`], the validated cell matrix, and its [`Fingerprint`]
//! - [`board`] -- [`BoardState`], one generation of one board
//! - [`dto`] -- request/response bodies of the board API

pub mod board;
pub mod dto;
pub mod grid;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use board::{BoardState, StateError};
pub use dto::{BoardStateResponse, BoardStatesResponse, CreateBoardRequest, CreateBoardResponse};
pub use grid::{Fingerprint, Grid, GridError};
pub use ids::BoardId;
