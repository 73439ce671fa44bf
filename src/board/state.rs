//! Board State
//!
//! `Board` owns everything that changes during play: the placement table,
//! the random source and the piece id counter. Topology, kind table and
//! pattern order are captured at construction and never change.

use std::collections::BTreeSet;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::position::{Direction, Position};
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::rules::catalog::{KindTable, PieceCatalog, PieceKind};
use crate::rules::pattern::{Pattern, PatternLibrary, prioritized};
use crate::board::config::{BoardConfig, CellKind, ConfigError, EngineConfig, LevelConfig};
use crate::board::piece::{Piece, PieceId};
use crate::board::placement::{PlacementError, Placements};
use crate::board::spawner::Spawner;
use crate::board::topology::{CellIndex, Topology};
use crate::game::events::ChangeLogEntry;
use crate::game::matcher::{self, PatternSearchResult};
use crate::game::phases::{self, MatchResolution, PhasesReport};
use crate::game::{gravity, shuffle, swap};

// =============================================================================
// VIEWS
// =============================================================================

/// Read-only view of one cell for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Grid position
    pub position: Position,
    /// Normal or blocked
    pub kind: CellKind,
    /// Fall direction
    pub gravity: Direction,
    /// True if the cell spawns pieces
    pub has_spawner: bool,
    /// Current occupant
    pub piece: Option<Piece>,
}

/// Running piece counters.
///
/// Pieces on the board always equal
/// `initial + spawned + injected - destroyed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    /// Pieces placed at construction
    pub initial: u32,
    /// Pieces produced by spawners
    pub spawned: u32,
    /// Floating pieces placed through `move_piece_to`
    pub injected: u32,
    /// Pieces consumed by matches
    pub destroyed: u32,
}

impl BoardStats {
    /// Pieces that should be on the board.
    pub fn expected_live(&self) -> u32 {
        (self.initial + self.spawned + self.injected).saturating_sub(self.destroyed)
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// A match-3 board.
#[derive(Clone, Debug)]
pub struct Board {
    /// Static cell graph
    pub(crate) topology: Topology,
    /// Cell <-> piece table
    pub(crate) placements: Placements,
    /// Catalog snapshot
    pub(crate) kinds: KindTable,
    /// Patterns in search order
    pub(crate) patterns: Vec<Pattern>,
    /// Engine parameters
    pub(crate) engine: EngineConfig,
    /// Random source for fill, spawn and shuffle
    pub(crate) rng: DeterministicRng,
    next_piece_id: u32,
    floating: BTreeSet<PieceId>,
    pub(crate) stats: BoardStats,
}

impl Board {
    /// Build a board from static configuration.
    ///
    /// Configured pieces and spawner kinds are validated against the
    /// catalog; remaining normal cells are filled with random basic kinds when
    /// `config.auto_fill` is set.
    pub fn new(
        config: &BoardConfig,
        catalog: &dyn PieceCatalog,
        library: &dyn PatternLibrary,
        engine: EngineConfig,
        rng: DeterministicRng,
    ) -> Result<Self, ConfigError> {
        let topology = Topology::build(config)?;
        let mut kinds = KindTable::capture(catalog);

        for (index, cell) in config.cells.iter().enumerate() {
            let at = topology.position(index);
            if cell.piece.is_some() && cell.kind == CellKind::Blocked {
                return Err(ConfigError::PieceOnBlockedCell { at });
            }

            // initial piece and every kind a spawner can produce
            let spawned = cell.spawner.as_ref().map(Spawner::kinds).unwrap_or_default();
            for kind in cell.piece.into_iter().chain(spawned) {
                if !catalog.contains(kind) {
                    return Err(ConfigError::UnknownPieceKind { at, kind });
                }
                if let Some(name) = catalog.name(kind) {
                    kinds = kinds.with_symbol(kind, name);
                }
            }
        }

        let mut board = Self {
            placements: Placements::new(topology.len()),
            topology,
            kinds,
            patterns: prioritized(library),
            engine,
            rng,
            next_piece_id: 1,
            floating: BTreeSet::new(),
            stats: BoardStats::default(),
        };

        for (index, cell) in config.cells.iter().enumerate() {
            if cell.kind == CellKind::Blocked {
                continue;
            }
            let kind = match cell.piece {
                Some(kind) => Some(kind),
                None if config.auto_fill => board.kinds.random_basic(&mut board.rng),
                None => None,
            };
            if let Some(kind) = kind {
                let piece = board.issue_piece(kind);
                board.place(piece, index)?;
                board.stats.initial += 1;
            }
        }

        Ok(board)
    }

    /// Build a board from a level bundle.
    pub fn from_level(level: &LevelConfig, rng: DeterministicRng) -> Result<Self, ConfigError> {
        Self::new(&level.board, &level.catalog, &level.patterns, level.engine.clone(), rng)
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Columns.
    #[inline]
    pub fn width(&self) -> u32 {
        self.topology.width()
    }

    /// Rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.topology.height()
    }

    /// Static cell graph.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Catalog snapshot.
    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }

    /// Patterns in search order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Engine parameters.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Piece counters.
    pub fn stats(&self) -> BoardStats {
        self.stats
    }

    /// Cell at `(x, y)`, `None` if out of bounds.
    pub fn get_cell(&self, x: i32, y: i32) -> Option<CellView> {
        let index = self.topology.index_of(Position::new(x, y))?;
        let cell = self.topology.cell(index);
        Some(CellView {
            position: cell.position,
            kind: cell.kind,
            gravity: cell.gravity,
            has_spawner: cell.spawner.is_some(),
            piece: self.placements.piece_at(index),
        })
    }

    /// Piece at a position.
    pub fn piece_at(&self, position: Position) -> Option<Piece> {
        self.topology
            .index_of(position)
            .and_then(|index| self.placements.piece_at(index))
    }

    /// Position of a placed piece.
    pub fn piece_position(&self, id: PieceId) -> Option<Position> {
        self.placements
            .cell_of(id)
            .map(|index| self.topology.position(index))
    }

    /// All placed pieces in row-major order.
    pub fn pieces(&self) -> Vec<(Position, Piece)> {
        self.placements
            .iter()
            .map(|(index, piece)| (self.topology.position(index), piece))
            .collect()
    }

    /// Number of placed pieces.
    pub fn live_piece_count(&self) -> usize {
        self.placements.live_count()
    }

    /// Per-cell copy of the occupants, row-major.
    pub fn snapshot(&self) -> Vec<Option<Piece>> {
        self.placements.snapshot()
    }

    /// Placement table agrees in both directions and no piece sits on a
    /// blocked cell.
    pub fn is_consistent(&self) -> bool {
        self.placements.is_consistent()
            && self
                .placements
                .iter()
                .all(|(index, _)| !self.topology.cell(index).is_blocked())
    }

    /// Hash of every cell's occupant in row-major order.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.width(), self.height(), |hasher| {
            for index in 0..self.topology.len() {
                match self.placements.piece_at(index) {
                    Some(piece) => {
                        hasher.update_bool(true);
                        hasher.update_u32(piece.id.0);
                        hasher.update_u16(piece.kind.0);
                    }
                    None => hasher.update_bool(false),
                }
            }
        })
    }

    // -------------------------------------------------------------------------
    // Presentation-facing mutation
    // -------------------------------------------------------------------------

    /// Issue a new floating piece.
    pub fn create_piece(&mut self, kind: PieceKind) -> Piece {
        let piece = self.issue_piece(kind);
        self.floating.insert(piece.id);
        piece
    }

    /// Place a floating piece on an empty normal cell.
    ///
    /// Returns false, changing nothing, if the piece is not floating or
    /// the cell is out of bounds, blocked or occupied.
    pub fn move_piece_to(&mut self, piece: Piece, position: Position) -> bool {
        if !self.floating.contains(&piece.id) {
            return false;
        }
        let Some(index) = self.topology.index_of(position) else {
            return false;
        };
        if self.place(piece, index).is_err() {
            return false;
        }
        self.floating.remove(&piece.id);
        self.stats.injected += 1;
        true
    }

    /// Run pattern search on the current board.
    pub fn find_patterns(&self) -> PatternSearchResult {
        matcher::find_patterns(self)
    }

    /// One gravity step followed by spawning.
    pub fn apply_gravity(&mut self) -> Vec<ChangeLogEntry> {
        gravity::apply_gravity(self)
    }

    /// Randomly permute pieces among occupied cells.
    pub fn shuffle(&mut self) -> Vec<ChangeLogEntry> {
        shuffle::shuffle(self)
    }

    /// Try to swap two adjacent pieces; kept only if it creates a match.
    ///
    /// An accepted swap adds nothing to any change log. The presentation
    /// layer animates the exchange of `a` and `b` itself when this returns
    /// true, then calls `run_board_phases`.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        swap::swap(self, a, b)
    }

    /// Destroy current matches, or shuffle a dead board.
    pub fn resolve_matches(&mut self, prevent_shuffle: bool) -> MatchResolution {
        phases::resolve_matches(self, prevent_shuffle)
    }

    /// Run the board to a stable state.
    pub fn run_board_phases(&mut self) -> Vec<ChangeLogEntry> {
        phases::run_board_phases(self)
    }

    /// Run the board to a stable state and report how the run ended.
    pub fn run_board_phases_report(&mut self) -> PhasesReport {
        phases::run_board_phases_report(self)
    }

    // -------------------------------------------------------------------------
    // Engine internals
    // -------------------------------------------------------------------------

    fn issue_piece(&mut self, kind: PieceKind) -> Piece {
        let piece = Piece::new(PieceId(self.next_piece_id), kind);
        self.next_piece_id += 1;
        piece
    }

    /// Place into a normal cell.
    pub(crate) fn place(&mut self, piece: Piece, index: CellIndex) -> Result<(), PlacementError> {
        if index >= self.topology.len() {
            return Err(PlacementError::OutOfRange(index));
        }
        if self.topology.cell(index).is_blocked() {
            return Err(PlacementError::Blocked(index));
        }
        self.placements.place(piece, index)
    }

    /// Create a piece of `kind` directly in a cell.
    pub(crate) fn spawn_into(&mut self, index: CellIndex, kind: PieceKind) -> Result<Piece, PlacementError> {
        if let Some(occupant) = self.placements.piece_at(index) {
            return Err(PlacementError::Occupied { index, occupant: occupant.id });
        }
        let piece = self.issue_piece(kind);
        self.place(piece, index)?;
        self.stats.spawned += 1;
        Ok(piece)
    }

    /// Remove a piece for good.
    pub(crate) fn destroy_at(&mut self, index: CellIndex) -> Option<Piece> {
        let piece = self.placements.release(index)?;
        self.stats.destroyed += 1;
        Some(piece)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                let position = Position::new(x, y);
                let c = match self.topology.cell_at(position) {
                    Some(cell) if cell.is_blocked() => '#',
                    _ => match self.piece_at(position) {
                        Some(piece) => self.kinds.symbol(piece.kind),
                        None => '.',
                    },
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
