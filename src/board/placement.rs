//! Placement Table
//!
//! Single source of truth for which piece sits in which cell. Both
//! directions of the link (cell -> piece, piece -> cell) are updated by the
//! same call, and every call validates before it mutates, so a failed
//! operation leaves the table untouched.

use std::collections::BTreeMap;

use crate::board::piece::{Piece, PieceId};
use crate::board::topology::CellIndex;

/// Placement failures. All of these are caller bugs or defects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// Index outside the arena.
    #[error("cell index {0} out of range")]
    OutOfRange(CellIndex),

    /// Cell is blocked.
    #[error("cell {0} is blocked")]
    Blocked(CellIndex),

    /// Target cell already holds a piece.
    #[error("cell {index} already holds {occupant:?}")]
    Occupied {
        /// Target cell
        index: CellIndex,
        /// Current occupant
        occupant: PieceId,
    },

    /// Piece is already on the board.
    #[error("piece {piece:?} already placed at cell {at}")]
    AlreadyPlaced {
        /// Piece
        piece: PieceId,
        /// Where it is
        at: CellIndex,
    },

    /// Source cell holds no piece.
    #[error("cell {0} is empty")]
    Empty(CellIndex),
}

/// Bidirectional cell <-> piece table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placements {
    by_cell: Vec<Option<Piece>>,
    by_piece: BTreeMap<PieceId, CellIndex>,
}

impl Placements {
    /// Empty table for `len` cells.
    pub fn new(len: usize) -> Self {
        Self {
            by_cell: vec![None; len],
            by_piece: BTreeMap::new(),
        }
    }

    /// Piece in a cell.
    #[inline]
    pub fn piece_at(&self, index: CellIndex) -> Option<Piece> {
        self.by_cell.get(index).copied().flatten()
    }

    /// True if the cell holds a piece.
    #[inline]
    pub fn is_occupied(&self, index: CellIndex) -> bool {
        self.piece_at(index).is_some()
    }

    /// Cell holding a piece.
    #[inline]
    pub fn cell_of(&self, piece: PieceId) -> Option<CellIndex> {
        self.by_piece.get(&piece).copied()
    }

    /// Number of placed pieces.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.by_piece.len()
    }

    /// Placed pieces in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, Piece)> + '_ {
        self.by_cell
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|piece| (index, piece)))
    }

    /// Per-cell copy of the table.
    pub fn snapshot(&self) -> Vec<Option<Piece>> {
        self.by_cell.clone()
    }

    fn check_vacant(&self, index: CellIndex) -> Result<(), PlacementError> {
        match self.by_cell.get(index) {
            None => Err(PlacementError::OutOfRange(index)),
            Some(Some(occupant)) => Err(PlacementError::Occupied {
                index,
                occupant: occupant.id,
            }),
            Some(None) => Ok(()),
        }
    }

    fn check_occupied(&self, index: CellIndex) -> Result<Piece, PlacementError> {
        match self.by_cell.get(index) {
            None => Err(PlacementError::OutOfRange(index)),
            Some(None) => Err(PlacementError::Empty(index)),
            Some(Some(piece)) => Ok(*piece),
        }
    }

    /// Put a floating piece into an empty cell.
    pub fn place(&mut self, piece: Piece, index: CellIndex) -> Result<(), PlacementError> {
        if let Some(at) = self.cell_of(piece.id) {
            return Err(PlacementError::AlreadyPlaced { piece: piece.id, at });
        }
        self.check_vacant(index)?;

        self.by_cell[index] = Some(piece);
        self.by_piece.insert(piece.id, index);
        Ok(())
    }

    /// Take the piece out of a cell, leaving it floating.
    pub fn release(&mut self, index: CellIndex) -> Option<Piece> {
        let piece = self.by_cell.get_mut(index)?.take()?;
        self.by_piece.remove(&piece.id);
        Some(piece)
    }

    /// Move a piece from `from` into the empty cell `to`.
    pub fn relocate(&mut self, from: CellIndex, to: CellIndex) -> Result<Piece, PlacementError> {
        let piece = self.check_occupied(from)?;
        self.check_vacant(to)?;

        self.by_cell[from] = None;
        self.by_cell[to] = Some(piece);
        self.by_piece.insert(piece.id, to);
        Ok(piece)
    }

    /// Swap the pieces of two occupied cells.
    pub fn exchange(&mut self, a: CellIndex, b: CellIndex) -> Result<(), PlacementError> {
        let piece_a = self.check_occupied(a)?;
        let piece_b = self.check_occupied(b)?;
        if a == b {
            return Ok(());
        }

        self.by_cell[a] = Some(piece_b);
        self.by_cell[b] = Some(piece_a);
        self.by_piece.insert(piece_a.id, b);
        self.by_piece.insert(piece_b.id, a);
        Ok(())
    }

    /// Verify both directions agree.
    pub fn is_consistent(&self) -> bool {
        let forward = self
            .iter()
            .all(|(index, piece)| self.by_piece.get(&piece.id) == Some(&index));
        let backward = self
            .by_piece
            .iter()
            .all(|(id, index)| self.piece_at(*index).map(|p| p.id) == Some(*id));
        forward && backward && self.iter().count() == self.by_piece.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::catalog::PieceKind;

    fn piece(id: u32) -> Piece {
        Piece::new(PieceId(id), PieceKind(1))
    }

    #[test]
    fn test_place_and_release() {
        let mut table = Placements::new(4);

        table.place(piece(1), 2).unwrap();
        assert_eq!(table.piece_at(2), Some(piece(1)));
        assert_eq!(table.cell_of(PieceId(1)), Some(2));
        assert!(table.is_consistent());

        assert_eq!(table.release(2), Some(piece(1)));
        assert_eq!(table.cell_of(PieceId(1)), None);
        assert_eq!(table.release(2), None);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_place_rejections_leave_table_untouched() {
        let mut table = Placements::new(2);
        table.place(piece(1), 0).unwrap();
        let before = table.clone();

        assert_eq!(
            table.place(piece(2), 0),
            Err(PlacementError::Occupied { index: 0, occupant: PieceId(1) })
        );
        assert_eq!(
            table.place(piece(1), 1),
            Err(PlacementError::AlreadyPlaced { piece: PieceId(1), at: 0 })
        );
        assert_eq!(table.place(piece(3), 9), Err(PlacementError::OutOfRange(9)));
        assert_eq!(table, before);
    }

    #[test]
    fn test_relocate() {
        let mut table = Placements::new(3);
        table.place(piece(1), 0).unwrap();
        table.place(piece(2), 2).unwrap();

        assert_eq!(table.relocate(0, 1), Ok(piece(1)));
        assert_eq!(table.cell_of(PieceId(1)), Some(1));

        let before = table.clone();
        assert!(matches!(table.relocate(1, 2), Err(PlacementError::Occupied { .. })));
        assert_eq!(table.relocate(0, 1), Err(PlacementError::Empty(0)));
        assert_eq!(table, before);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_exchange() {
        let mut table = Placements::new(3);
        table.place(piece(1), 0).unwrap();
        table.place(piece(2), 1).unwrap();

        table.exchange(0, 1).unwrap();
        assert_eq!(table.piece_at(0), Some(piece(2)));
        assert_eq!(table.cell_of(PieceId(1)), Some(1));
        assert!(table.is_consistent());

        assert_eq!(table.exchange(0, 2), Err(PlacementError::Empty(2)));
        assert_eq!(table.live_count(), 2);
    }
}
