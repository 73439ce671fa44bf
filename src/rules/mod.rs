//! Level rules supplied from outside the engine: the piece catalog and
//! the pattern library.

pub mod catalog;
pub mod pattern;

pub use catalog::{CatalogConfig, KindTable, PieceCatalog, PieceCategory, PieceDefinition, PieceKind};
pub use pattern::{Pattern, PatternLibrary, PatternSet};
