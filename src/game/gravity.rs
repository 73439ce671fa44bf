//! Gravity Resolver
//!
//! One call advances every falling piece by exactly one cell and then lets
//! spawners fill empty spawn cells. The orchestrator repeats the call until
//! it returns nothing.

use tracing::error;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::board::state::Board;
use crate::board::topology::CellIndex;
use crate::game::events::ChangeLogEntry;

/// Occupied cells whose gravity child exists and is empty.
///
/// Blocked cells are never a gravity child, so the child is always normal.
pub fn fall_ready_cells(board: &Board) -> Vec<CellIndex> {
    board
        .topology
        .cells()
        .iter()
        .enumerate()
        .filter(|(index, cell)| {
            board.placements.is_occupied(*index)
                && cell
                    .gravity_child
                    .is_some_and(|child| !board.placements.is_occupied(child))
        })
        .map(|(index, _)| index)
        .collect()
}

/// Moves of this step as `(from, to)`, lowest first within each lane.
///
/// Each fall-ready cell drags the unbroken run of occupied ancestors
/// above it. Planning happens before any move, so a piece is never moved
/// twice in one step.
fn plan_moves(board: &Board) -> Vec<(CellIndex, CellIndex)> {
    let mut moves = Vec::new();

    for ready in fall_ready_cells(board) {
        let mut current = Some(ready);
        while let Some(index) = current {
            if !board.placements.is_occupied(index) {
                break;
            }
            let Some(child) = board.topology.cell(index).gravity_child else {
                break;
            };
            moves.push((index, child));
            current = board.topology.cell(index).gravity_parent;
        }
    }

    moves
}

/// Advance falling pieces one step and spawn into empty spawn cells.
pub fn apply_gravity(board: &mut Board) -> Vec<ChangeLogEntry> {
    let mut entries = Vec::new();

    for (from, to) in plan_moves(board) {
        match board.placements.relocate(from, to) {
            Ok(piece) => {
                let (from, to) = (board.topology.position(from), board.topology.position(to));
                #[cfg(feature = "debug-tracing")]
                trace!(piece = ?piece.id, %from, %to, "piece falls");
                entries.push(ChangeLogEntry::PieceMove { from, to, piece });
            }
            Err(err) => {
                error!(%err, "gravity move failed, aborting step");
                if cfg!(debug_assertions) {
                    panic!("gravity plan out of sync with placements: {err}");
                }
                return entries;
            }
        }
    }

    spawn(board, &mut entries);
    entries
}

fn spawn(board: &mut Board, entries: &mut Vec<ChangeLogEntry>) {
    for index in 0..board.topology.len() {
        if board.placements.is_occupied(index) || board.topology.cell(index).is_blocked() {
            continue;
        }
        let kind = match &board.topology.cell(index).spawner {
            Some(spawner) => spawner.generate(&board.kinds, &mut board.rng),
            None => continue,
        };
        let Some(kind) = kind else { continue };

        match board.spawn_into(index, kind) {
            Ok(piece) => entries.push(ChangeLogEntry::PieceCreation {
                to: board.topology.position(index),
                piece,
            }),
            Err(err) => error!(%err, "spawn failed"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::position::{Direction, Position};
    use crate::core::rng::DeterministicRng;
    use crate::rules::catalog::{CatalogConfig, PieceDefinition, PieceKind};
    use crate::rules::pattern::PatternSet;
    use crate::board::config::{BoardConfig, EngineConfig};
    use crate::board::spawner::Spawner;

    const RED: PieceKind = PieceKind(1);
    const BLUE: PieceKind = PieceKind(2);

    fn board(config: BoardConfig) -> Board {
        let catalog = CatalogConfig::new(vec![
            PieceDefinition::basic(RED, "Red"),
            PieceDefinition::basic(BLUE, "Blue"),
        ]);
        Board::new(&config, &catalog, &PatternSet::classic(), EngineConfig::default(), DeterministicRng::new(5)).unwrap()
    }

    fn column(rows: &[&str]) -> BoardConfig {
        BoardConfig::uniform(rows[0].len() as u32, rows.len() as u32, Direction::Down)
            .with_layout(rows, &[('R', RED), ('B', BLUE)])
            .without_auto_fill()
    }

    #[test]
    fn test_settled_board_is_fixed_point() {
        let mut board = board(column(&["..", "R.", "RB"]));
        let before = board.compute_hash();

        assert!(board.apply_gravity().is_empty());
        assert_eq!(board.compute_hash(), before);
    }

    #[test]
    fn test_chain_falls_one_step() {
        let mut board = board(column(&["R", "B", "."]));
        let top = board.piece_at(Position::new(0, 0)).unwrap();
        let mid = board.piece_at(Position::new(0, 1)).unwrap();

        let entries = board.apply_gravity();
        assert_eq!(
            entries,
            vec![
                ChangeLogEntry::PieceMove { from: Position::new(0, 1), to: Position::new(0, 2), piece: mid },
                ChangeLogEntry::PieceMove { from: Position::new(0, 0), to: Position::new(0, 1), piece: top },
            ]
        );
        assert_eq!(board.to_string(), ".\nR\nB\n");
        assert!(board.apply_gravity().is_empty());
    }

    #[test]
    fn test_gap_moves_only_pieces_above_it() {
        let mut board = board(column(&["R", ".", "B", "."]));

        let entries = board.apply_gravity();
        assert_eq!(entries.len(), 2);
        assert_eq!(board.to_string(), ".\nR\n.\nB\n");

        board.apply_gravity();
        assert_eq!(board.to_string(), ".\n.\nR\nB\n");
        assert!(board.apply_gravity().is_empty());
    }

    #[test]
    fn test_blocked_cell_stops_fall() {
        let config = column(&["R", "#", "."]);
        let mut board = board(config);

        assert!(board.apply_gravity().is_empty());
        assert_eq!(board.to_string(), "R\n#\n.\n");
    }

    #[test]
    fn test_sideways_gravity() {
        let config = BoardConfig::uniform(3, 1, Direction::Left)
            .with_layout(&["..R"], &[('R', RED)])
            .without_auto_fill();
        let mut board = board(config);

        board.apply_gravity();
        board.apply_gravity();
        assert_eq!(board.to_string(), "R..\n");
    }

    #[test]
    fn test_spawner_fills_top_cells() {
        let config = column(&["..", ".."]).with_spawner_row(0, Spawner::FixedKind { kind: BLUE });
        let mut board = board(config);

        let first = board.apply_gravity();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|e| matches!(e, ChangeLogEntry::PieceCreation { .. })));
        assert_eq!(board.stats().spawned, 2);

        // spawned pieces fall, the spawners refill
        let second = board.apply_gravity();
        assert_eq!(second.len(), 4);
        assert_eq!(board.to_string(), "BB\nBB\n");
        assert!(board.apply_gravity().is_empty());
        assert!(board.is_consistent());
    }

    #[test]
    fn test_fall_ready_cells() {
        let board = board(column(&["R.", "BR", ".B"]));
        // (0,1) sits above an empty cell; everything else is resting
        assert_eq!(fall_ready_cells(&board), vec![2]);
    }
}
