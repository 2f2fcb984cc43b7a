//! Axum router construction for the board API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin clients and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use life_core::BoardRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::attach_instance;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the board API.
///
/// The router includes:
/// - `POST /api/boards` -- create a board
/// - `GET /api/boards/{id}/next` -- next generation
/// - `GET /api/boards/{id}/states` -- advance `steps` generations
/// - `GET /api/boards/{id}/final` -- run to a fixed point or cycle
/// - `GET /health` -- liveness probe
///
/// CORS is configured to allow any origin.
pub fn build_router<R>(state: Arc<AppState<R>>) -> Router
where
    R: BoardRepository + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/boards", post(handlers::create_board::<R>))
        .route("/api/boards/{id}/next", get(handlers::next_state::<R>))
        .route("/api/boards/{id}/states", get(handlers::advance::<R>))
        .route("/api/boards/{id}/final", get(handlers::final_state::<R>))
        .layer(middleware::from_fn(attach_instance))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
