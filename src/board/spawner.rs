//! Piece Spawners
//!
//! Generator cells produce a new piece whenever they are empty at the end
//! of a gravity step. The strategy is a closed set of variants.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::rules::catalog::{KindTable, PieceKind};

/// A kind with its relative spawn weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedKind {
    /// Kind to spawn
    pub kind: PieceKind,
    /// Relative weight (0 disables)
    pub weight: u32,
}

/// Spawn strategy of a generator cell.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Spawner {
    /// Uniformly random basic kind from the catalog
    #[default]
    UniformRandomBasic,
    /// Kind drawn proportionally to weights
    Weighted {
        /// Candidate kinds
        kinds: Vec<WeightedKind>,
    },
    /// Always the same kind
    FixedKind {
        /// Kind to spawn
        kind: PieceKind,
    },
}

impl Spawner {
    /// Pick the kind of the next piece.
    ///
    /// `None` when there is nothing to spawn (empty catalog, all weights
    /// zero); that is not an error, the cell just stays empty this step.
    pub fn generate(&self, kinds: &KindTable, rng: &mut DeterministicRng) -> Option<PieceKind> {
        match self {
            Spawner::UniformRandomBasic => kinds.random_basic(rng),
            Spawner::Weighted { kinds: weighted } => {
                let weights: Vec<u32> = weighted.iter().map(|w| w.weight).collect();
                rng.next_weighted(&weights).map(|i| weighted[i].kind)
            }
            Spawner::FixedKind { kind } => Some(*kind),
        }
    }

    /// Kinds named explicitly by this spawner, empty for uniform spawners.
    pub fn kinds(&self) -> Vec<PieceKind> {
        match self {
            Spawner::UniformRandomBasic => Vec::new(),
            Spawner::Weighted { kinds } => kinds.iter().map(|w| w.kind).collect(),
            Spawner::FixedKind { kind } => vec![*kind],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::catalog::{CatalogConfig, PieceDefinition};

    const RED: PieceKind = PieceKind(1);
    const BLUE: PieceKind = PieceKind(2);

    fn table() -> KindTable {
        KindTable::capture(&CatalogConfig::new(vec![
            PieceDefinition::basic(RED, "Red"),
            PieceDefinition::basic(BLUE, "Blue"),
        ]))
    }

    #[test]
    fn test_uniform_spawner() {
        let mut rng = DeterministicRng::new(3);
        let table = table();

        for _ in 0..50 {
            let kind = Spawner::UniformRandomBasic.generate(&table, &mut rng).unwrap();
            assert!(kind == RED || kind == BLUE);
        }

        let empty = KindTable::capture(&CatalogConfig::default());
        assert_eq!(Spawner::UniformRandomBasic.generate(&empty, &mut rng), None);
    }

    #[test]
    fn test_weighted_spawner() {
        let mut rng = DeterministicRng::new(4);
        let spawner = Spawner::Weighted {
            kinds: vec![
                WeightedKind { kind: RED, weight: 0 },
                WeightedKind { kind: BLUE, weight: 7 },
            ],
        };

        for _ in 0..50 {
            assert_eq!(spawner.generate(&table(), &mut rng), Some(BLUE));
        }

        let dead = Spawner::Weighted { kinds: vec![WeightedKind { kind: RED, weight: 0 }] };
        assert_eq!(dead.generate(&table(), &mut rng), None);
    }

    #[test]
    fn test_fixed_spawner_ignores_catalog() {
        let mut rng = DeterministicRng::new(5);
        let empty = KindTable::capture(&CatalogConfig::default());
        let spawner = Spawner::FixedKind { kind: RED };

        assert_eq!(spawner.generate(&empty, &mut rng), Some(RED));
    }

    #[test]
    fn test_spawner_json() {
        let uniform: Spawner = serde_json::from_str(r#"{"strategy":"uniform_random_basic"}"#).unwrap();
        assert_eq!(uniform, Spawner::UniformRandomBasic);

        let fixed: Spawner = serde_json::from_str(r#"{"strategy":"fixed_kind","kind":2}"#).unwrap();
        assert_eq!(fixed, Spawner::FixedKind { kind: BLUE });
    }
}
