//! Piece Identity

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::rules::catalog::PieceKind;

/// Stable piece identifier (monotonic counter, never reused within a board).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A placeable token.
///
/// This is a plain value: where the piece sits is recorded only in the
/// board's placement table, so copies held by the change log can never
/// go stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Identity
    pub id: PieceId,
    /// Catalog kind
    pub kind: PieceKind,
}

impl Piece {
    /// Create a piece value.
    pub const fn new(id: PieceId, kind: PieceKind) -> Self {
        Self { id, kind }
    }
}
