//! Pattern Matcher
//!
//! Exhaustive search of the board against the prioritized pattern list.
//! Patterns are tried in order (match patterns first, each group by
//! descending score), origins in row-major order and candidate kinds in
//! catalog order. A placement is accepted only if none of its cells was
//! claimed by an earlier one, so every cell belongs to at most one result.

use serde::{Serialize, Deserialize};

use crate::core::position::Position;
use crate::rules::catalog::PieceKind;
use crate::rules::pattern::Pattern;
use crate::board::state::Board;
use crate::board::topology::CellIndex;

/// One accepted pattern placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFound {
    /// Pattern name
    pub pattern: String,
    /// Pattern score
    pub score: u32,
    /// True for hint patterns
    pub is_hint: bool,
    /// Basic kind the pattern matched as
    pub kind: PieceKind,
    /// Origin cell the offsets are relative to
    pub origin: Position,
    /// Covered cells, in pattern offset order
    pub cells: Vec<Position>,
    swap: Option<(Position, Position)>,
}

impl PatternFound {
    /// Suggested swap for a hint, in board coordinates.
    pub fn hint_swap(&self) -> Option<(Position, Position)> {
        self.swap
    }
}

/// Result of one search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSearchResult {
    /// Accepted match patterns, in acceptance order
    pub matches: Vec<PatternFound>,
    /// Accepted hint patterns, in acceptance order
    pub hints: Vec<PatternFound>,
}

impl PatternSearchResult {
    /// True if at least one match pattern was found.
    #[inline]
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// True if the board offers a match or a one-swap hint.
    #[inline]
    pub fn is_playable(&self) -> bool {
        !self.matches.is_empty() || !self.hints.is_empty()
    }
}

/// Search the board.
///
/// Read-only; the same board always yields the same result.
pub fn find_patterns(board: &Board) -> PatternSearchResult {
    let topology = &board.topology;
    let mut result = PatternSearchResult::default();
    let mut claimed = vec![false; topology.len()];
    let mut covered = Vec::new();

    for pattern in &board.patterns {
        for y in 0..topology.height() as i32 {
            for x in 0..topology.width() as i32 {
                let origin = Position::new(x, y);

                for &candidate in board.kinds.basic_kinds() {
                    if !cover(board, pattern, origin, candidate, &mut covered) {
                        continue;
                    }
                    if covered.iter().any(|index| claimed[*index]) {
                        continue;
                    }
                    for index in &covered {
                        claimed[*index] = true;
                    }

                    let found = PatternFound {
                        pattern: pattern.name.clone(),
                        score: pattern.score,
                        is_hint: pattern.is_hint,
                        kind: candidate,
                        origin,
                        cells: covered.iter().map(|index| topology.position(*index)).collect(),
                        swap: pattern
                            .hint_swap
                            .and_then(|[a, b]| Some((origin.checked_add(a)?, origin.checked_add(b)?))),
                    };
                    if pattern.is_hint {
                        result.hints.push(found);
                    } else {
                        result.matches.push(found);
                    }
                    // claimed cells rule out every other candidate here
                    break;
                }
            }
        }
    }

    result
}

/// Fill `out` with the cells `pattern` covers at `origin` and report
/// whether every one holds a piece matching `candidate`.
fn cover(
    board: &Board,
    pattern: &Pattern,
    origin: Position,
    candidate: PieceKind,
    out: &mut Vec<CellIndex>,
) -> bool {
    out.clear();
    if pattern.offsets.is_empty() {
        return false;
    }
    for offset in &pattern.offsets {
        let Some(index) = origin.checked_add(*offset).and_then(|at| board.topology.index_of(at)) else {
            return false;
        };
        // blocked cells never hold a piece, so this also rejects them
        let Some(piece) = board.placements.piece_at(index) else {
            return false;
        };
        if !board.kinds.matches(candidate, piece.kind) {
            return false;
        }
        out.push(index);
    }
    true
}

// =============================================================================
// TESTS
// =============================================================================
