//! Phase Orchestrator
//!
//! Drives the board from an arbitrary state to a stable one and records
//! everything in a single change log:
//!
//! 1. Resolve matches left by the caller, without shuffling.
//! 2. Apply gravity until nothing moves, barrier after each step.
//! 3. Resolve matches again, shuffling a dead board.
//! 4. Repeat 2-3 while matches or shuffles keep changing the board.
//!
//! The first time a resolve reports the shuffle limit the cycle is retried
//! once; a second consecutive report ends the run with
//! `BoardShuffleLimitReached` as the last entry. A run that reaches
//! `max_cascades` stops after a barrier and says so in its `PhasesReport`.

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::board::state::Board;
use crate::game::events::{ChangeLog, ChangeLogEntry};
use crate::game::gravity::apply_gravity;
use crate::game::matcher::find_patterns;
use crate::game::shuffle::{revert, shuffle_round};

/// What a resolve step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// Matched pieces were destroyed
    Matched,
    /// No matches; a shuffle produced a playable board
    Shuffled,
    /// No matches and nothing to do
    Stable,
    /// No playable configuration within the shuffle budget
    ShuffleLimitReached,
}

/// Result of `resolve_matches`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResolution {
    /// Entries produced by this step
    pub entries: Vec<ChangeLogEntry>,
    /// What happened
    pub outcome: ResolveOutcome,
    /// Sum of matched pattern scores
    pub score: u32,
    /// Shuffle rounds performed, rejected ones included
    pub rounds: u32,
}

impl MatchResolution {
    fn stable() -> Self {
        Self {
            entries: Vec::new(),
            outcome: ResolveOutcome::Stable,
            score: 0,
            rounds: 0,
        }
    }
}

/// How a `run_board_phases` run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhasesOutcome {
    /// No matches left and the board is playable
    Stable,
    /// The shuffle limit was reached twice in a row
    ShuffleLimitReached,
    /// `max_cascades` cycles ran; matches or holes may remain
    CascadeLimitReached,
}

/// Result of `run_board_phases_report`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhasesReport {
    /// Full change log of the run
    pub entries: Vec<ChangeLogEntry>,
    /// How the run ended
    pub outcome: PhasesOutcome,
    /// Gravity/resolve cycles performed
    pub cycles: u32,
    /// Sum of matched pattern scores
    pub score: u32,
}

/// Destroy every current match; if there is none and shuffling is
/// allowed, shuffle a board that has neither matches nor hints.
///
/// A shuffle round is accepted once the board is playable: at least one
/// match or one hint, not necessarily a match. A board with hints and no
/// match is left as it is.
pub fn resolve_matches(board: &mut Board, prevent_shuffle: bool) -> MatchResolution {
    let search = find_patterns(board);

    if search.has_matches() {
        let mut entries = Vec::new();
        let mut score = 0;
        let count = search.matches.len();

        for found in search.matches {
            score += found.score;
            entries.push(ChangeLogEntry::PieceMatch {
                pattern: found.pattern,
                score: found.score,
                kind: found.kind,
                cells: found.cells.clone(),
            });
            for cell in found.cells {
                let Some(index) = board.topology.index_of(cell) else {
                    continue;
                };
                if let Some(piece) = board.destroy_at(index) {
                    entries.push(ChangeLogEntry::PieceDestroy { cell, piece });
                }
            }
        }

        debug!(matches = count, score, "matches resolved");
        return MatchResolution {
            entries,
            outcome: ResolveOutcome::Matched,
            score,
            rounds: 0,
        };
    }

    if prevent_shuffle || search.is_playable() {
        return MatchResolution::stable();
    }

    shuffle_until_playable(board)
}

/// Shuffle rounds until the board is playable, at most `max_shuffles + 1`.
///
/// A rejected round is undone and its entries dropped. The last round is
/// kept as is and followed by `BoardShuffleLimitReached`.
fn shuffle_until_playable(board: &mut Board) -> MatchResolution {
    let max_shuffles = board.engine.max_shuffles;
    let mut log = ChangeLog::new();

    for round in 0..=max_shuffles {
        let mark = log.len();
        log.push(ChangeLogEntry::BoardShuffle);
        let moves = shuffle_round(board);
        log.extend(moves.iter().map(|m| m.to_entry(board)));
        log.push(ChangeLogEntry::PhaseTransition);

        if find_patterns(board).is_playable() {
            debug!(round, "shuffle produced a playable board");
            return MatchResolution {
                entries: log.into_entries(),
                outcome: ResolveOutcome::Shuffled,
                score: 0,
                rounds: round + 1,
            };
        }

        if round == max_shuffles {
            break;
        }
        revert(board, &moves);
        log.truncate(mark);
    }

    warn!(max_shuffles, "no playable board within shuffle limit");
    log.push(ChangeLogEntry::BoardShuffleLimitReached);
    MatchResolution {
        entries: log.into_entries(),
        outcome: ResolveOutcome::ShuffleLimitReached,
        score: 0,
        rounds: max_shuffles + 1,
    }
}

/// Apply gravity until a step changes nothing.
fn settle(board: &mut Board, log: &mut ChangeLog) {
    loop {
        let step = apply_gravity(board);
        if step.is_empty() {
            return;
        }
        log.extend(step);
        log.barrier();
    }
}

/// Run the board to a stable state and return the change log.
pub fn run_board_phases(board: &mut Board) -> Vec<ChangeLogEntry> {
    run_board_phases_report(board).entries
}

/// Run the board to a stable state.
///
/// The log of a run stopped by `max_cascades` ends with a
/// `PhaseTransition` and the board may still hold matches; only
/// `PhasesReport::outcome` tells it apart from a settled run.
pub fn run_board_phases_report(board: &mut Board) -> PhasesReport {
    let mut log = ChangeLog::new();

    // 1. Matches the caller's last action left behind
    let first = resolve_matches(board, true);
    let mut score = first.score;
    log.extend(first.entries);
    log.barrier();

    let mut limit_reported = false;
    let mut cycles = 0;
    let outcome;

    loop {
        if cycles == board.engine.max_cascades {
            warn!(cycles, "cascade limit reached, board left unresolved");
            log.barrier();
            outcome = PhasesOutcome::CascadeLimitReached;
            break;
        }
        cycles += 1;

        // 2. Gravity
        settle(board, &mut log);

        // 3. Resolve with shuffling
        let resolution = resolve_matches(board, false);
        score += resolution.score;
        log.extend(resolution.entries);

        match resolution.outcome {
            ResolveOutcome::Matched | ResolveOutcome::Shuffled => {
                limit_reported = false;
                log.barrier();
            }
            ResolveOutcome::Stable => {
                outcome = PhasesOutcome::Stable;
                break;
            }
            ResolveOutcome::ShuffleLimitReached if limit_reported => {
                warn!(cycles, "shuffle limit reached twice, giving up");
                outcome = PhasesOutcome::ShuffleLimitReached;
                break;
            }
            ResolveOutcome::ShuffleLimitReached => {
                limit_reported = true;
                if log.last() == Some(&ChangeLogEntry::BoardShuffleLimitReached) {
                    log.pop();
                }
                debug!(cycles, "shuffle limit reached, retrying once");
            }
        }
    }

    debug!(cycles, entries = log.len(), ?outcome, "board phases complete");
    PhasesReport {
        entries: log.into_entries(),
        outcome,
        cycles,
        score,
    }
}

// =============================================================================
// TESTS
// =============================================================================
