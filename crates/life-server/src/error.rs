//! Error types for the Life server binary.
//!
//! [`ServerError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the Life server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: life_core::ConfigError,
    },

    /// The board store could not be opened.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying storage error.
        #[from]
        source: life_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: life_api::ServerError,
    },
}
