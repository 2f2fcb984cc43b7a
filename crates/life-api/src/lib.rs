//! HTTP API for the Life service.
//!
//! This crate provides an Axum HTTP server that exposes board creation
//! and advancement over JSON:
//!
//! - **`POST /api/boards`** stores a validated cell matrix as generation 0
//! - **`GET /api/boards/{id}/next`** computes one generation
//! - **`GET /api/boards/{id}/states`** computes several generations
//! - **`GET /api/boards/{id}/final`** runs until a fixed point or cycle
//!
//! Failures are reported as `application/problem+json` bodies; see
//! [`error::ApiError`] for the status mapping.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::{ApiError, ProblemDetails};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
