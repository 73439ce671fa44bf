//! Board and Engine Configuration
//!
//! Static, already-parsed configuration handed to `Board::new`. Everything
//! here is serde-friendly so levels can be authored as JSON; reading files
//! is left to the caller.

use serde::{Serialize, Deserialize};

use crate::core::position::{Direction, Position};
use crate::rules::catalog::{CatalogConfig, PieceKind};
use crate::rules::pattern::PatternSet;
use crate::board::spawner::Spawner;
use crate::board::placement::PlacementError;
use crate::{DEFAULT_MAX_CASCADES, DEFAULT_MAX_SHUFFLES};

/// Whether a cell takes part in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Holds pieces
    #[default]
    Normal,
    /// Never holds a piece; still a neighbor for topology
    Blocked,
}

/// Static configuration of one cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellConfig {
    /// Cell kind
    #[serde(default)]
    pub kind: CellKind,
    /// Direction pieces fall from this cell
    #[serde(default)]
    pub gravity: Direction,
    /// Generator strategy, if this is a spawn cell
    #[serde(default)]
    pub spawner: Option<Spawner>,
    /// Initial piece (`None` is the empty sentinel)
    #[serde(default)]
    pub piece: Option<PieceKind>,
}

impl CellConfig {
    /// Normal cell with the given gravity.
    pub fn normal(gravity: Direction) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Blocked cell.
    pub fn blocked() -> Self {
        Self {
            kind: CellKind::Blocked,
            ..Self::default()
        }
    }
}

fn default_auto_fill() -> bool {
    true
}

/// Static configuration of a board.
///
/// `cells` is row-major: index `y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Per-cell configuration
    pub cells: Vec<CellConfig>,
    /// Fill empty normal cells with random basic pieces at construction
    #[serde(default = "default_auto_fill")]
    pub auto_fill: bool,
}

impl BoardConfig {
    /// All-normal board with one gravity direction and auto fill on.
    pub fn uniform(width: u32, height: u32, gravity: Direction) -> Self {
        Self {
            width,
            height,
            cells: vec![CellConfig::normal(gravity); (width * height) as usize],
            auto_fill: true,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Cell configuration at `(x, y)`.
    pub fn cell(&self, x: i32, y: i32) -> Option<&CellConfig> {
        self.index(x, y).and_then(|i| self.cells.get(i))
    }

    /// Mutable cell configuration at `(x, y)`.
    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut CellConfig> {
        let i = self.index(x, y)?;
        self.cells.get_mut(i)
    }

    /// Put `spawner` on every cell of row `y`.
    pub fn with_spawner_row(mut self, y: i32, spawner: Spawner) -> Self {
        for x in 0..self.width as i32 {
            if let Some(cell) = self.cell_mut(x, y) {
                cell.spawner = Some(spawner.clone());
            }
        }
        self
    }

    /// Mark a cell blocked.
    pub fn with_blocked(mut self, at: Position) -> Self {
        if let Some(cell) = self.cell_mut(at.x, at.y) {
            cell.kind = CellKind::Blocked;
        }
        self
    }

    /// Set the initial piece of a cell.
    pub fn with_piece(mut self, at: Position, kind: PieceKind) -> Self {
        if let Some(cell) = self.cell_mut(at.x, at.y) {
            cell.piece = Some(kind);
        }
        self
    }

    /// Fill rows from strings, one char per cell. `.` leaves the cell
    /// empty, `#` blocks it, any other char is looked up in `legend`.
    pub fn with_layout(mut self, rows: &[&str], legend: &[(char, PieceKind)]) -> Self {
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let Some(cell) = self.cell_mut(x as i32, y as i32) else {
                    continue;
                };
                match c {
                    '.' => cell.piece = None,
                    '#' => cell.kind = CellKind::Blocked,
                    _ => cell.piece = legend.iter().find(|(k, _)| *k == c).map(|(_, kind)| *kind),
                }
            }
        }
        self
    }

    /// Disable random fill of empty cells.
    pub fn without_auto_fill(mut self) -> Self {
        self.auto_fill = false;
        self
    }
}

/// Numeric engine parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shuffle rounds allowed per resolve step beyond the first
    #[serde(default = "default_max_shuffles")]
    pub max_shuffles: u32,
    /// Upper bound on gravity/resolve cycles in one `run_board_phases`.
    /// Only reached by levels whose spawners can match forever.
    #[serde(default = "default_max_cascades")]
    pub max_cascades: u32,
}

fn default_max_shuffles() -> u32 {
    DEFAULT_MAX_SHUFFLES
}

fn default_max_cascades() -> u32 {
    DEFAULT_MAX_CASCADES
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_shuffles: DEFAULT_MAX_SHUFFLES,
            max_cascades: DEFAULT_MAX_CASCADES,
        }
    }
}

/// Everything needed to start one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Level identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Board layout
    pub board: BoardConfig,
    /// Piece catalog
    pub catalog: CatalogConfig,
    /// Pattern library
    pub patterns: PatternSet,
    /// Engine parameters
    #[serde(default)]
    pub engine: EngineConfig,
}

impl LevelConfig {
    /// Parse a level from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Board construction errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("board must have at least one cell, got {width}x{height}")]
    EmptyBoard {
        /// Configured width
        width: u32,
        /// Configured height
        height: u32,
    },

    /// Cell list does not cover the grid.
    #[error("expected {expected} cells, got {actual}")]
    CellCountMismatch {
        /// width * height
        expected: usize,
        /// cells.len()
        actual: usize,
    },

    /// Following gravity from a cell leads back to it.
    #[error("gravity cycle through cell {at}")]
    GravityCycle {
        /// A cell on the cycle
        at: Position,
    },

    /// Two cells fall into the same cell.
    #[error("cells {first} and {second} both fall into {cell}")]
    ConvergingGravity {
        /// Shared target
        cell: Position,
        /// First parent found
        first: Position,
        /// Second parent found
        second: Position,
    },

    /// Initial piece or spawner kind is not in the catalog.
    #[error("unknown piece kind {kind:?} at {at}")]
    UnknownPieceKind {
        /// Cell
        at: Position,
        /// Offending kind
        kind: PieceKind,
    },

    /// Initial piece configured on a blocked cell.
    #[error("blocked cell {at} cannot hold a piece")]
    PieceOnBlockedCell {
        /// Cell
        at: Position,
    },

    /// Initial piece could not be placed.
    #[error("initial placement failed: {0}")]
    Placement(#[from] PlacementError),

    /// Level JSON could not be parsed.
    #[error("invalid level json: {0}")]
    Json(#[from] serde_json::Error),
}
