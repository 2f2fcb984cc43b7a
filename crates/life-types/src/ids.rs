//! Board identity.
//!
//! A [`BoardId`] is assigned by the persistence layer when a board is
//! created and is the only key used to address that board's history.
//! The simulation never looks inside it; it is compared, hashed, logged,
//! and handed back to storage, nothing more.
//!
//! Identifiers are UUID v7 (time-ordered) so that boards created close
//! together sort close together in the `boards` table index.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Opaque identifier for one board and its generation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoardId(pub Uuid);

impl BoardId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for BoardId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for BoardId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BoardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for BoardId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<BoardId> for Uuid {
    fn from(id: BoardId) -> Self {
        id.0
    }
}
