//! Swap Validator
//!
//! A player swap is applied tentatively and kept only if the resulting
//! board has at least one match. Hints alone do not count.

use tracing::{debug, error};

use crate::core::position::{Direction, Position};
use crate::board::state::Board;
use crate::board::topology::CellIndex;
use crate::game::matcher::find_patterns;

/// Check the structural preconditions of a swap: both cells in bounds,
/// orthogonally adjacent, normal and occupied. No pattern search.
pub fn swap_cells(board: &Board, a: Position, b: Position) -> Option<(CellIndex, CellIndex)> {
    let topology = &board.topology;
    let ia = topology.index_of(a)?;
    let ib = topology.index_of(b)?;

    let adjacent = Direction::ALL
        .iter()
        .any(|dir| topology.cell(ia).neighbor(*dir) == Some(ib));
    if !adjacent {
        return None;
    }

    for index in [ia, ib] {
        if topology.cell(index).is_blocked() || !board.placements.is_occupied(index) {
            return None;
        }
    }
    Some((ia, ib))
}

/// Swap the pieces at `a` and `b` if that produces a match.
///
/// Returns false and leaves the board unchanged otherwise. No
/// `PieceMove` entries are produced for the exchange itself.
pub fn swap(board: &mut Board, a: Position, b: Position) -> bool {
    let Some((ia, ib)) = swap_cells(board, a, b) else {
        return false;
    };

    if let Err(err) = board.placements.exchange(ia, ib) {
        error!(%err, %a, %b, "swap exchange failed");
        return false;
    }

    if find_patterns(board).has_matches() {
        debug!(%a, %b, "swap accepted");
        return true;
    }

    if let Err(err) = board.placements.exchange(ia, ib) {
        error!(%err, %a, %b, "swap rollback failed");
    }
    false
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::rules::catalog::{CatalogConfig, PieceDefinition, PieceKind};
    use crate::rules::pattern::{Pattern, PatternSet};
    use crate::board::config::{BoardConfig, EngineConfig};
    use crate::game::events::ChangeLogEntry;

    const RED: PieceKind = PieceKind(1);
    const BLUE: PieceKind = PieceKind(2);
    const GREEN: PieceKind = PieceKind(3);

    fn board(rows: &[&str]) -> Board {
        let catalog = CatalogConfig::new(vec![
            PieceDefinition::basic(RED, "Red"),
            PieceDefinition::basic(BLUE, "Blue"),
            PieceDefinition::basic(GREEN, "Green"),
        ]);
        let patterns = PatternSet::matches_only(vec![Pattern::horizontal(3, 10), Pattern::vertical(3, 10)]);
        let config = BoardConfig::uniform(rows[0].len() as u32, rows.len() as u32, Direction::Down)
            .with_layout(rows, &[('R', RED), ('B', BLUE), ('G', GREEN)])
            .without_auto_fill();
        Board::new(&config, &catalog, &patterns, EngineConfig::default(), DeterministicRng::new(2)).unwrap()
    }

    #[test]
    fn test_swap_creating_match_is_kept() {
        let mut board = board(&["RRBR", "GBGB"]);

        assert!(board.swap(Position::new(2, 0), Position::new(3, 0)));
        assert_eq!(board.to_string(), "RRRB\nGBGB\n");
        assert!(board.is_consistent());
    }

    #[test]
    fn test_accepted_swap_leaves_log_to_phases() {
        let mut board = board(&["RRBR", "GBGB"]);

        assert!(board.swap(Position::new(2, 0), Position::new(3, 0)));
        let log = board.run_board_phases();
        assert!(matches!(&log[0], ChangeLogEntry::PieceMatch { kind, .. } if *kind == RED));
    }

    #[test]
    fn test_swap_without_match_is_rolled_back() {
        let mut board = board(&["RBGR", "GRBG"]);
        let hash = board.compute_hash();

        assert!(!board.swap(Position::new(0, 0), Position::new(1, 0)));
        assert_eq!(board.compute_hash(), hash);
    }

    #[test]
    fn test_non_adjacent_rejected() {
        let mut board = board(&["RRBR", "GBGB"]);
        let hash = board.compute_hash();

        // would match, but the cells are two apart
        assert!(!board.swap(Position::new(1, 0), Position::new(3, 0)));
        assert!(!board.swap(Position::new(0, 0), Position::new(1, 1)));
        assert!(!board.swap(Position::new(0, 0), Position::new(0, 0)));
        assert_eq!(board.compute_hash(), hash);
    }

    #[test]
    fn test_out_of_bounds_and_empty_rejected() {
        let mut board = board(&["RR.R", "GBGB"]);

        assert!(!board.swap(Position::new(3, 0), Position::new(4, 0)));
        assert!(!board.swap(Position::new(2, 0), Position::new(3, 0)));
        assert!(!board.swap(Position::new(-1, 0), Position::new(0, 0)));
    }

    #[test]
    fn test_swap_cells_checks_structure_only() {
        let board = board(&["RB", "GR"]);

        assert_eq!(swap_cells(&board, Position::new(0, 0), Position::new(1, 0)), Some((0, 1)));
        assert_eq!(swap_cells(&board, Position::new(0, 0), Position::new(1, 1)), None);
    }
}
