//! Piece Catalog
//!
//! The closed set of piece kinds a level may use. Loading the catalog is
//! the job of an external collaborator; the engine only consumes the
//! `PieceCatalog` interface, and `CatalogConfig` is the data-driven
//! implementation used by levels and tests.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;

/// Identifier of a piece kind in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceKind(pub u16);

impl PieceKind {
    /// Create from raw id.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// Broad class of a piece kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceCategory {
    /// Ordinary colored piece: used for random fill and as match candidate
    #[default]
    Basic,
    /// Anything else (obstacles, boosters); placed only by level config
    Special,
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceDefinition {
    /// Kind id
    pub kind: PieceKind,
    /// Display name ("Red", "Blue", ...)
    pub name: String,
    /// Category
    #[serde(default)]
    pub category: PieceCategory,
    /// Other kinds accepted when this kind is the match candidate
    #[serde(default)]
    pub matching_whitelist: Vec<PieceKind>,
}

impl PieceDefinition {
    /// Basic piece with an empty whitelist.
    pub fn basic(kind: PieceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            category: PieceCategory::Basic,
            matching_whitelist: Vec::new(),
        }
    }

    /// Special piece with an empty whitelist.
    pub fn special(kind: PieceKind, name: impl Into<String>) -> Self {
        Self {
            category: PieceCategory::Special,
            ..Self::basic(kind, name)
        }
    }

    /// Add kinds to the matching whitelist.
    pub fn matching(mut self, kinds: &[PieceKind]) -> Self {
        self.matching_whitelist.extend_from_slice(kinds);
        self
    }
}

/// Interface to the externally supplied piece catalog.
pub trait PieceCatalog {
    /// All kinds in the basic category, in catalog order.
    fn basic_kinds(&self) -> Vec<PieceKind>;

    /// Kinds accepted when `kind` is the match candidate.
    fn compatibility_whitelist(&self, kind: PieceKind) -> BTreeSet<PieceKind>;

    /// True if the catalog defines `kind`.
    fn contains(&self, kind: PieceKind) -> bool;

    /// Display name of a kind.
    fn name(&self, kind: PieceKind) -> Option<&str>;

    /// Uniformly random basic kind, `None` if there are none.
    fn random_basic_kind(&self, rng: &mut DeterministicRng) -> Option<PieceKind> {
        let basics = self.basic_kinds();
        rng.choose(&basics).copied()
    }
}

/// Data-driven catalog, typically deserialized from a level file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog entries; kind ids must be unique
    pub pieces: Vec<PieceDefinition>,
}

impl CatalogConfig {
    /// Create a catalog from entries.
    pub fn new(pieces: Vec<PieceDefinition>) -> Self {
        Self { pieces }
    }

    fn get(&self, kind: PieceKind) -> Option<&PieceDefinition> {
        self.pieces.iter().find(|p| p.kind == kind)
    }
}

impl PieceCatalog for CatalogConfig {
    fn basic_kinds(&self) -> Vec<PieceKind> {
        self.pieces
            .iter()
            .filter(|p| p.category == PieceCategory::Basic)
            .map(|p| p.kind)
            .collect()
    }

    fn compatibility_whitelist(&self, kind: PieceKind) -> BTreeSet<PieceKind> {
        self.get(kind)
            .map(|p| p.matching_whitelist.iter().copied().collect())
            .unwrap_or_default()
    }

    fn contains(&self, kind: PieceKind) -> bool {
        self.get(kind).is_some()
    }

    fn name(&self, kind: PieceKind) -> Option<&str> {
        self.get(kind).map(|p| p.name.as_str())
    }
}

// =============================================================================
// KIND TABLE
// =============================================================================

/// Snapshot of the catalog taken at board construction.
///
/// The board keeps this instead of a reference to the catalog so it owns
/// all the data a resolve step needs.
#[derive(Clone, Debug, Default)]
pub struct KindTable {
    basic: Vec<PieceKind>,
    whitelists: BTreeMap<PieceKind, BTreeSet<PieceKind>>,
    symbols: BTreeMap<PieceKind, char>,
}

impl KindTable {
    /// Capture the parts of `catalog` the engine uses.
    pub fn capture(catalog: &dyn PieceCatalog) -> Self {
        let basic = catalog.basic_kinds();
        let whitelists = basic
            .iter()
            .map(|kind| (*kind, catalog.compatibility_whitelist(*kind)))
            .collect();

        let mut table = Self {
            basic: basic.clone(),
            whitelists,
            symbols: BTreeMap::new(),
        };
        for kind in basic {
            if let Some(name) = catalog.name(kind) {
                table = table.with_symbol(kind, name);
            }
        }
        table
    }

    /// Record a display symbol for `kind` (first letter of its name).
    pub fn with_symbol(mut self, kind: PieceKind, name: &str) -> Self {
        if let Some(c) = name.chars().next() {
            self.symbols.insert(kind, c.to_ascii_uppercase());
        }
        self
    }

    /// Basic kinds in catalog order.
    pub fn basic_kinds(&self) -> &[PieceKind] {
        &self.basic
    }

    /// Does a piece of `kind` count as `candidate` for matching?
    ///
    /// A kind always matches itself; other kinds match through the
    /// candidate's whitelist.
    #[inline]
    pub fn matches(&self, candidate: PieceKind, kind: PieceKind) -> bool {
        candidate == kind
            || self
                .whitelists
                .get(&candidate)
                .is_some_and(|list| list.contains(&kind))
    }

    /// Uniformly random basic kind.
    pub fn random_basic(&self, rng: &mut DeterministicRng) -> Option<PieceKind> {
        rng.choose(&self.basic).copied()
    }

    /// Character used by the debug grid.
    pub fn symbol(&self, kind: PieceKind) -> char {
        self.symbols
            .get(&kind)
            .copied()
            .or_else(|| char::from_digit((kind.0 % 36) as u32, 36))
            .unwrap_or('?')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PieceKind = PieceKind(1);
    const BLUE: PieceKind = PieceKind(2);
    const RED_STRIPED: PieceKind = PieceKind(10);

    fn catalog() -> CatalogConfig {
        CatalogConfig::new(vec![
            PieceDefinition::basic(RED, "Red").matching(&[RED_STRIPED]),
            PieceDefinition::basic(BLUE, "Blue"),
            PieceDefinition::special(RED_STRIPED, "Striped"),
        ])
    }

    #[test]
    fn test_basic_kinds_exclude_special() {
        assert_eq!(catalog().basic_kinds(), vec![RED, BLUE]);
    }

    #[test]
    fn test_whitelist_matching() {
        let table = KindTable::capture(&catalog());

        assert!(table.matches(RED, RED));
        assert!(table.matches(RED, RED_STRIPED));
        assert!(!table.matches(BLUE, RED_STRIPED));
        assert!(!table.matches(RED, BLUE));
    }

    #[test]
    fn test_random_basic_kind_empty_catalog() {
        let mut rng = DeterministicRng::new(1);
        let empty = CatalogConfig::default();

        assert_eq!(empty.random_basic_kind(&mut rng), None);
        assert_eq!(KindTable::capture(&empty).random_basic(&mut rng), None);
    }

    #[test]
    fn test_random_basic_kind_is_basic() {
        let mut rng = DeterministicRng::new(9);
        let catalog = catalog();

        for _ in 0..100 {
            let kind = catalog.random_basic_kind(&mut rng).unwrap();
            assert!(kind == RED || kind == BLUE);
        }
    }

    #[test]
    fn test_catalog_json() {
        let json = r#"{
            "pieces": [
                { "kind": 1, "name": "Red", "matching_whitelist": [10] },
                { "kind": 10, "name": "Striped", "category": "special" }
            ]
        }"#;
        let parsed: CatalogConfig = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.basic_kinds(), vec![RED]);
        assert!(parsed.compatibility_whitelist(RED).contains(&RED_STRIPED));
        assert_eq!(parsed.name(RED_STRIPED), Some("Striped"));
    }
}
