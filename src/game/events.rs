//! Board Change Log
//!
//! The ordered record of everything the engine did during one call. It is
//! the whole contract with the presentation layer, so entries carry plain
//! positions and piece values, never references into the board.

use serde::{Serialize, Deserialize};

use crate::core::position::Position;
use crate::board::piece::Piece;
use crate::rules::catalog::PieceKind;

/// Kind of a change entry, without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChangeAction {
    /// Spawner produced a piece
    PieceCreation = 0,
    /// Piece fell or was swapped
    PieceMove = 1,
    /// Piece relocated by a shuffle
    PieceMoveShuffle = 2,
    /// Piece consumed by a match
    PieceDestroy = 3,
    /// Pattern matched (scoring signal)
    PieceMatch = 4,
    /// Shuffle round started
    BoardShuffle = 5,
    /// No playable configuration within budget
    BoardShuffleLimitReached = 6,
    /// Wait for pending effects before continuing
    PhaseTransition = 7,
}

/// One observable mutation (or barrier).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChangeLogEntry {
    /// A spawner produced `piece` at `to`.
    PieceCreation {
        /// Spawn cell
        to: Position,
        /// New piece
        piece: Piece,
    },

    /// `piece` moved one step from `from` to `to`.
    PieceMove {
        /// Previous cell
        from: Position,
        /// New cell
        to: Position,
        /// Moved piece
        piece: Piece,
    },

    /// Net shuffle relocation of `from_piece`.
    ///
    /// `to_piece` is the piece that held `to` before the shuffle; it has
    /// its own entry describing where it went.
    PieceMoveShuffle {
        /// Cell before the shuffle
        from: Position,
        /// Cell after the shuffle
        to: Position,
        /// Moved piece
        from_piece: Piece,
        /// Original occupant of `to`
        to_piece: Piece,
    },

    /// `piece` was removed from `cell` by a match.
    PieceDestroy {
        /// Cell emptied
        cell: Position,
        /// Destroyed piece
        piece: Piece,
    },

    /// A pattern matched. No board mutation on its own.
    PieceMatch {
        /// Pattern name
        pattern: String,
        /// Pattern score
        score: u32,
        /// Basic kind the pattern matched as
        kind: PieceKind,
        /// Covered cells in pattern order
        cells: Vec<Position>,
    },

    /// A shuffle round started.
    BoardShuffle,

    /// Terminal: the board cannot reach a playable configuration.
    BoardShuffleLimitReached,

    /// Barrier between phases.
    PhaseTransition,
}

impl ChangeLogEntry {
    /// Payload-free kind of this entry.
    pub fn action(&self) -> ChangeAction {
        match self {
            ChangeLogEntry::PieceCreation { .. } => ChangeAction::PieceCreation,
            ChangeLogEntry::PieceMove { .. } => ChangeAction::PieceMove,
            ChangeLogEntry::PieceMoveShuffle { .. } => ChangeAction::PieceMoveShuffle,
            ChangeLogEntry::PieceDestroy { .. } => ChangeAction::PieceDestroy,
            ChangeLogEntry::PieceMatch { .. } => ChangeAction::PieceMatch,
            ChangeLogEntry::BoardShuffle => ChangeAction::BoardShuffle,
            ChangeLogEntry::BoardShuffleLimitReached => ChangeAction::BoardShuffleLimitReached,
            ChangeLogEntry::PhaseTransition => ChangeAction::PhaseTransition,
        }
    }

    /// True for the phase barrier.
    #[inline]
    pub fn is_phase_transition(&self) -> bool {
        matches!(self, ChangeLogEntry::PhaseTransition)
    }
}

/// Append-only buffer of entries with a few phase-aware helpers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeLog {
    entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    #[inline]
    pub fn push(&mut self, entry: ChangeLogEntry) {
        self.entries.push(entry);
    }

    /// Append many entries.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = ChangeLogEntry>) {
        self.entries.extend(entries);
    }

    /// Append a phase transition unless the log already ends with one.
    pub fn barrier(&mut self) {
        if !self.entries.last().is_some_and(ChangeLogEntry::is_phase_transition) {
            self.entries.push(ChangeLogEntry::PhaseTransition);
        }
    }

    /// Current length, usable as a rollback mark.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was logged.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything logged after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }

    /// Last entry.
    pub fn last(&self) -> Option<&ChangeLogEntry> {
        self.entries.last()
    }

    /// Remove and return the last entry.
    pub fn pop(&mut self) -> Option<ChangeLogEntry> {
        self.entries.pop()
    }

    /// Number of entries of one kind.
    pub fn count(&self, action: ChangeAction) -> usize {
        count_actions(&self.entries, action)
    }

    /// Borrow the entries.
    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    /// Take the entries.
    pub fn into_entries(self) -> Vec<ChangeLogEntry> {
        self.entries
    }
}

/// Number of entries of one kind in a slice.
pub fn count_actions(entries: &[ChangeLogEntry], action: ChangeAction) -> usize {
    entries.iter().filter(|e| e.action() == action).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::PieceId;

    fn piece() -> Piece {
        Piece::new(PieceId(7), PieceKind(1))
    }

    #[test]
    fn test_barrier_is_not_doubled() {
        let mut log = ChangeLog::new();
        log.barrier();
        log.barrier();
        assert_eq!(log.entries(), &[ChangeLogEntry::PhaseTransition]);

        log.push(ChangeLogEntry::BoardShuffle);
        log.barrier();
        assert_eq!(log.len(), 3);
        assert_eq!(log.count(ChangeAction::PhaseTransition), 2);
    }

    #[test]
    fn test_truncate_to_mark() {
        let mut log = ChangeLog::new();
        log.push(ChangeLogEntry::PieceDestroy { cell: Position::new(0, 0), piece: piece() });
        let mark = log.len();
        log.push(ChangeLogEntry::BoardShuffle);
        log.push(ChangeLogEntry::PhaseTransition);

        log.truncate(mark);
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().map(ChangeLogEntry::action), Some(ChangeAction::PieceDestroy));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = ChangeLogEntry::PieceMove {
            from: Position::new(1, 0),
            to: Position::new(1, 1),
            piece: piece(),
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["action"], "piece_move");
        assert_eq!(json["piece"]["id"], 7);
        assert_eq!(json["to"]["y"], 1);

        let back: ChangeLogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);

        let barrier = serde_json::to_value(ChangeLogEntry::PhaseTransition).unwrap();
        assert_eq!(barrier["action"], "phase_transition");
    }
}
