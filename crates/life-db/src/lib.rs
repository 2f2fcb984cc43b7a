//! `PostgreSQL` storage for the Life service.
//!
//! Implements the core's [`BoardRepository`](life_core::BoardRepository)
//! contract on top of two tables and picks a backend at startup.
//!
//! # Schema
//!
//! ```text
//! boards        (id, row_count, column_count, created_at)
//! board_states  (board_id -> boards.id, generation, cells JSONB, created_at)
//!               PRIMARY KEY (board_id, generation)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, and migrations
//! - [`board_store`] -- [`PgBoardRepository`] and its row type
//! - [`store`] -- [`BoardStore`], the memory/postgres dispatch enum
//! - [`error`] -- Shared error types

pub mod board_store;
pub mod error;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use board_store::{BoardStateRow, PgBoardRepository};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::BoardStore;
