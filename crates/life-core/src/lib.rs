//! Simulation core of the Life service.
//!
//! Derives successive generations of a bounded Game of Life board,
//! persists each one through an injected repository, and fast-forwards
//! boards until they reach a fixed point or a cycle.
//!
//! # Modules
//!
//! - [`transition`] -- the pure B3/S23 rule on a non-wrapping grid
//! - [`convergence`] -- fixed-point and cycle detection over a history
//! - [`service`] -- [`BoardService`], the create/next/advance/final protocol
//! - [`repository`] -- [`BoardRepository`] contract and [`InMemoryBoardRepository`]
//! - [`cancel`] -- [`CancellationFlag`] checked before every write
//! - [`config`] -- `life-config.yaml` loading
//! - [`error`] -- [`LifeError`] taxonomy

pub mod cancel;
pub mod config;
pub mod convergence;
pub mod error;
pub mod repository;
pub mod service;
pub mod transition;

pub use cancel::CancellationFlag;
pub use config::{ConfigError, LifeConfig};
pub use convergence::{Convergence, GenerationSink, StopReason};
pub use error::LifeError;
pub use repository::{BoardRepository, InMemoryBoardRepository, RepositoryError};
pub use service::BoardService;
