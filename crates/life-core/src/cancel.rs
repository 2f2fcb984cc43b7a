//! Shared cancellation flag for in-flight advancement.
//!
//! The server sets the flag when it begins shutting down. Advancement
//! loops check it before every persistence call, so a request stops at a
//! generation boundary and never leaves a half-written generation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to a one-way cancellation switch.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// A flag that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation for every clone of this flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
