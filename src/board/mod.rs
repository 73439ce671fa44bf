//! Board Data Model
//!
//! ## Module Structure
//!
//! - `config`: Static board, engine and level configuration
//! - `topology`: Cell arena with neighbor and gravity links
//! - `spawner`: Piece generators for spawn cells
//! - `piece`: Piece identity
//! - `placement`: Cell <-> piece table
//! - `state`: The `Board` itself

pub mod config;
pub mod topology;
pub mod spawner;
pub mod piece;
pub mod placement;
pub mod state;

// Re-export key types
pub use config::{BoardConfig, CellConfig, CellKind, ConfigError, EngineConfig, LevelConfig};
pub use topology::{Cell, CellIndex, Topology};
pub use spawner::{Spawner, WeightedKind};
pub use piece::{Piece, PieceId};
pub use placement::{PlacementError, Placements};
pub use state::{Board, BoardStats, CellView};
