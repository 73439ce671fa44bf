//! # Match-3 Engine
//!
//! Deterministic resolution engine for match-3 boards: pattern search,
//! gravity, spawning, shuffling and swap validation. Every mutation is
//! reported through an ordered change log the presentation layer replays.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MATCH-3 ENGINE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  ├── hash.rs     - Board state hashing                       │
//! │  └── position.rs - Grid positions and directions             │
//! │                                                              │
//! │  rules/          - Externally supplied level rules           │
//! │  ├── catalog.rs  - Piece kinds and match whitelists          │
//! │  └── pattern.rs  - Scored shape patterns                     │
//! │                                                              │
//! │  board/          - Board data model                          │
//! │  ├── config.rs   - Board, engine and level configuration     │
//! │  ├── topology.rs - Cell graph and gravity lanes              │
//! │  ├── placement.rs- Cell <-> piece table                      │
//! │  └── state.rs    - The Board                                 │
//! │                                                              │
//! │  game/           - Resolution (deterministic)                │
//! │  ├── matcher.rs  - Pattern search                            │
//! │  ├── gravity.rs  - Falling and spawning                      │
//! │  ├── shuffle.rs  - Dead board shuffles                       │
//! │  ├── swap.rs     - Swap validation                           │
//! │  └── phases.rs   - Phase orchestration                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same configuration and RNG seed, the engine produces the
//! same change log and the same board hash on every platform:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from the injected Xorshift128+ generator
//!
//! ## Example
//!
//! ```
//! use match3::{Board, BoardConfig, CatalogConfig, DeterministicRng, Direction, EngineConfig, PatternSet};
//! use match3::rules::{PieceDefinition, PieceKind};
//!
//! let catalog = CatalogConfig::new(vec![
//!     PieceDefinition::basic(PieceKind(1), "Red"),
//!     PieceDefinition::basic(PieceKind(2), "Green"),
//!     PieceDefinition::basic(PieceKind(3), "Blue"),
//! ]);
//! let config = BoardConfig::uniform(6, 6, Direction::Down);
//! let mut board = Board::new(
//!     &config,
//!     &catalog,
//!     &PatternSet::classic(),
//!     EngineConfig::default(),
//!     DeterministicRng::new(42),
//! ).unwrap();
//!
//! let log = board.run_board_phases();
//! assert!(board.is_consistent());
//! assert!(!log.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod rules;
pub mod board;
pub mod game;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use core::position::{Direction, Offset, Position};
pub use rules::{CatalogConfig, PatternSet, PieceCatalog, PatternLibrary};
pub use board::{Board, BoardConfig, EngineConfig, LevelConfig, ConfigError};
pub use game::events::ChangeLogEntry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shuffle rounds allowed beyond the first before a resolve gives up
pub const DEFAULT_MAX_SHUFFLES: u32 = 5;

/// Gravity/resolve cycles allowed in one `run_board_phases`
pub const DEFAULT_MAX_CASCADES: u32 = 256;
