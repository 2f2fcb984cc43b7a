//! Shared application state for the board API.
//!
//! [`AppState`] wraps the [`BoardService`] every handler delegates to.
//! The service is generic over its repository so tests can run the full
//! router against the in-memory store.

use life_core::{BoardRepository, BoardService};

/// State shared across all request handlers.
#[derive(Debug)]
pub struct AppState<R> {
    /// Board operations over the configured store.
    pub service: BoardService<R>,
}

impl<R: BoardRepository> AppState<R> {
    /// Wrap a configured service.
    pub const fn new(service: BoardService<R>) -> Self {
        Self { service }
    }
}
