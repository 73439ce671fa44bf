//! Shuffle Resolver
//!
//! Random pairwise exchanges among occupied cells, reported as one net
//! relocation per piece that ended up somewhere else.

use std::collections::BTreeMap;

use tracing::{debug, error};

use crate::board::piece::{Piece, PieceId};
use crate::board::state::Board;
use crate::board::topology::CellIndex;
use crate::game::events::ChangeLogEntry;

/// Net effect of a shuffle on one piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShuffleMove {
    /// Piece that moved
    pub piece: Piece,
    /// Cell before the shuffle
    pub from: CellIndex,
    /// Cell after the shuffle
    pub to: CellIndex,
    /// Piece that held `to` before the shuffle
    pub displaced: Piece,
}

impl ShuffleMove {
    /// Change log entry for this move.
    pub fn to_entry(&self, board: &Board) -> ChangeLogEntry {
        ChangeLogEntry::PieceMoveShuffle {
            from: board.topology.position(self.from),
            to: board.topology.position(self.to),
            from_piece: self.piece,
            to_piece: self.displaced,
        }
    }
}

/// Shuffle the board and return its change entries.
pub fn shuffle(board: &mut Board) -> Vec<ChangeLogEntry> {
    let moves = shuffle_round(board);
    moves.iter().map(|m| m.to_entry(board)).collect()
}

/// One shuffle round: `width * height` random exchanges between distinct
/// occupied cells. Boards with fewer than two pieces are left as they are.
pub fn shuffle_round(board: &mut Board) -> Vec<ShuffleMove> {
    let candidates: Vec<CellIndex> = board.placements.iter().map(|(index, _)| index).collect();
    let before = board.placements.snapshot();
    let origin: BTreeMap<PieceId, CellIndex> = board
        .placements
        .iter()
        .map(|(index, piece)| (piece.id, index))
        .collect();

    let draws = board.topology.len();
    for _ in 0..draws {
        let Some((a, b)) = board.rng.next_distinct_pair(candidates.len()) else {
            break;
        };
        if let Err(err) = board.placements.exchange(candidates[a], candidates[b]) {
            error!(%err, "shuffle exchange failed");
            break;
        }
    }

    let mut moves = Vec::new();
    for &to in &candidates {
        let (Some(piece), Some(displaced)) = (board.placements.piece_at(to), before[to]) else {
            continue;
        };
        let Some(&from) = origin.get(&piece.id) else {
            continue;
        };
        if from != to {
            moves.push(ShuffleMove { piece, from, to, displaced });
        }
    }

    debug!(pieces = candidates.len(), moved = moves.len(), "shuffle round");
    moves
}

/// Undo a round returned by `shuffle_round`.
///
/// The moved pieces form a permutation of their cells, so lifting them
/// all and putting each back in `from` always succeeds.
pub fn revert(board: &mut Board, moves: &[ShuffleMove]) {
    for m in moves {
        board.placements.release(m.to);
    }
    for m in moves {
        if let Err(err) = board.placements.place(m.piece, m.from) {
            error!(%err, piece = ?m.piece.id, "shuffle revert failed");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::position::Direction;
    use crate::core::rng::DeterministicRng;
    use crate::rules::catalog::{CatalogConfig, PieceDefinition, PieceKind};
    use crate::rules::pattern::PatternSet;
    use crate::board::config::{BoardConfig, EngineConfig};

    fn board(config: BoardConfig, seed: u64) -> Board {
        let catalog = CatalogConfig::new(vec![
            PieceDefinition::basic(PieceKind(1), "Red"),
            PieceDefinition::basic(PieceKind(2), "Blue"),
            PieceDefinition::basic(PieceKind(3), "Green"),
        ]);
        Board::new(&config, &catalog, &PatternSet::classic(), EngineConfig::default(), DeterministicRng::new(seed)).unwrap()
    }

    fn sorted_ids(board: &Board) -> Vec<PieceId> {
        let mut ids: Vec<PieceId> = board.pieces().iter().map(|(_, p)| p.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_shuffle_preserves_pieces() {
        let mut board = board(BoardConfig::uniform(5, 5, Direction::Down), 21);
        let ids = sorted_ids(&board);

        let entries = board.shuffle();
        assert!(!entries.is_empty());
        assert_eq!(sorted_ids(&board), ids);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_entries_describe_net_moves() {
        let mut board = board(BoardConfig::uniform(4, 4, Direction::Down), 8);
        let before = board.snapshot();

        for entry in board.shuffle() {
            let ChangeLogEntry::PieceMoveShuffle { from, to, from_piece, to_piece } = entry else {
                panic!("unexpected entry {entry:?}");
            };
            assert_ne!(from, to);
            assert_eq!(board.piece_at(to), Some(from_piece));
            let to_index = board.topology().index_of(to).unwrap();
            assert_eq!(before[to_index], Some(to_piece));
        }
    }

    #[test]
    fn test_blocked_and_empty_cells_stay_put() {
        let legend = [('R', PieceKind(1)), ('B', PieceKind(2)), ('G', PieceKind(3))];
        let config = BoardConfig::uniform(3, 3, Direction::Down)
            .with_layout(&["...", "R#G", "BRG"], &legend)
            .without_auto_fill();
        let mut board = board(config, 4);

        board.shuffle();
        let snapshot = board.snapshot();
        assert!(snapshot[..3].iter().all(Option::is_none));
        assert!(snapshot[4].is_none());
        assert_eq!(board.live_piece_count(), 5);
    }

    #[test]
    fn test_single_piece_is_noop() {
        let config = BoardConfig::uniform(1, 1, Direction::Down);
        let mut board = board(config, 1);
        let hash = board.compute_hash();

        assert!(board.shuffle().is_empty());
        assert_eq!(board.compute_hash(), hash);
    }

    #[test]
    fn test_revert_restores_board() {
        let mut board = board(BoardConfig::uniform(6, 6, Direction::Down), 99);
        let hash = board.compute_hash();

        let moves = shuffle_round(&mut board);
        assert!(!moves.is_empty());
        revert(&mut board, &moves);

        assert_eq!(board.compute_hash(), hash);
        assert!(board.is_consistent());
    }
}
