//! Shape Patterns
//!
//! A pattern is a set of offsets relative to an origin cell. Match patterns
//! are consumed by the resolver; hint patterns describe configurations one
//! swap away from a match and are only reported.

use serde::{Serialize, Deserialize};

use crate::core::position::Offset;

/// A scored shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Name reported in match entries
    pub name: String,
    /// Cells covered, relative to the origin
    pub offsets: Vec<Offset>,
    /// Score awarded when matched; higher scores are searched first
    pub score: u32,
    /// Hint patterns are reported, never resolved
    #[serde(default)]
    pub is_hint: bool,
    /// Swap that turns a hint into a match, relative to the origin
    #[serde(default)]
    pub hint_swap: Option<[Offset; 2]>,
}

impl Pattern {
    /// Create a match pattern.
    pub fn new(name: impl Into<String>, offsets: Vec<Offset>, score: u32) -> Self {
        Self {
            name: name.into(),
            offsets,
            score,
            is_hint: false,
            hint_swap: None,
        }
    }

    /// Create a hint pattern with its suggested swap.
    pub fn hint(name: impl Into<String>, offsets: Vec<Offset>, score: u32, swap: [Offset; 2]) -> Self {
        Self {
            is_hint: true,
            hint_swap: Some(swap),
            ..Self::new(name, offsets, score)
        }
    }

    /// Build offsets from a mask of rows, `'X'` marking covered cells.
    ///
    /// ```
    /// use match3::rules::pattern::Pattern;
    ///
    /// let t = Pattern::from_mask("t", &["XXX", ".X.", ".X."], 30);
    /// assert_eq!(t.offsets.len(), 5);
    /// ```
    pub fn from_mask(name: impl Into<String>, rows: &[&str], score: u32) -> Self {
        let offsets = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .filter(|(_, c)| *c == 'X' || *c == 'x')
                    .map(move |(x, _)| Offset::new(x as i32, y as i32))
            })
            .collect();
        Self::new(name, offsets, score)
    }

    /// Straight horizontal line of `len` cells.
    pub fn horizontal(len: i32, score: u32) -> Self {
        let offsets = (0..len).map(|x| Offset::new(x, 0)).collect();
        Self::new(format!("horizontal-{}", len), offsets, score)
    }

    /// Straight vertical line of `len` cells.
    pub fn vertical(len: i32, score: u32) -> Self {
        let offsets = (0..len).map(|y| Offset::new(0, y)).collect();
        Self::new(format!("vertical-{}", len), offsets, score)
    }

    /// Number of cells covered.
    pub fn size(&self) -> usize {
        self.offsets.len()
    }
}

/// Interface to the externally supplied pattern library.
pub trait PatternLibrary {
    /// Patterns that resolve (destroy pieces) when found.
    fn match_patterns(&self) -> Vec<Pattern>;

    /// Patterns that only signal a possible move.
    fn hint_patterns(&self) -> Vec<Pattern>;
}

/// Data-driven pattern library.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    /// Match patterns, in registration order
    #[serde(default)]
    pub matches: Vec<Pattern>,
    /// Hint patterns, in registration order
    #[serde(default)]
    pub hints: Vec<Pattern>,
}

impl PatternSet {
    /// Create a library from both lists.
    pub fn new(matches: Vec<Pattern>, hints: Vec<Pattern>) -> Self {
        Self { matches, hints }
    }

    /// Library with match patterns only.
    pub fn matches_only(matches: Vec<Pattern>) -> Self {
        Self::new(matches, Vec::new())
    }

    /// Lines of 3 to 5, L and T shapes, and one-swap-away hints.
    pub fn classic() -> Self {
        let matches = vec![
            Pattern::horizontal(3, 10),
            Pattern::vertical(3, 10),
            Pattern::horizontal(4, 20),
            Pattern::vertical(4, 20),
            Pattern::from_mask("l-down-right", &["X..", "X..", "XXX"], 30),
            Pattern::from_mask("l-down-left", &["..X", "..X", "XXX"], 30),
            Pattern::from_mask("l-up-right", &["XXX", "X..", "X.."], 30),
            Pattern::from_mask("l-up-left", &["XXX", "..X", "..X"], 30),
            Pattern::from_mask("t-down", &["XXX", ".X.", ".X."], 40),
            Pattern::from_mask("t-up", &[".X.", ".X.", "XXX"], 40),
            Pattern::horizontal(5, 50),
            Pattern::vertical(5, 50),
        ];

        let o = Offset::new;
        let hints = vec![
            Pattern::hint("gap-right", vec![o(0, 0), o(1, 0), o(3, 0)], 1, [o(2, 0), o(3, 0)]),
            Pattern::hint("gap-left", vec![o(0, 0), o(2, 0), o(3, 0)], 1, [o(0, 0), o(1, 0)]),
            Pattern::hint("gap-down", vec![o(0, 0), o(0, 1), o(0, 3)], 1, [o(0, 2), o(0, 3)]),
            Pattern::hint("gap-up", vec![o(0, 0), o(0, 2), o(0, 3)], 1, [o(0, 0), o(0, 1)]),
            Pattern::hint("kink-end-down", vec![o(0, 0), o(1, 0), o(2, 1)], 1, [o(2, 0), o(2, 1)]),
            Pattern::hint("kink-end-up", vec![o(0, 1), o(1, 1), o(2, 0)], 1, [o(2, 0), o(2, 1)]),
            Pattern::hint("kink-start-down", vec![o(0, 1), o(1, 0), o(2, 0)], 1, [o(0, 0), o(0, 1)]),
            Pattern::hint("kink-start-up", vec![o(0, 0), o(1, 1), o(2, 1)], 1, [o(0, 0), o(0, 1)]),
            Pattern::hint("kink-middle-down", vec![o(0, 0), o(1, 1), o(2, 0)], 1, [o(1, 0), o(1, 1)]),
            Pattern::hint("kink-middle-up", vec![o(0, 1), o(1, 0), o(2, 1)], 1, [o(1, 0), o(1, 1)]),
            Pattern::hint("kink-end-right", vec![o(0, 0), o(0, 1), o(1, 2)], 1, [o(0, 2), o(1, 2)]),
            Pattern::hint("kink-end-left", vec![o(1, 0), o(1, 1), o(0, 2)], 1, [o(0, 2), o(1, 2)]),
            Pattern::hint("kink-start-right", vec![o(1, 0), o(0, 1), o(0, 2)], 1, [o(0, 0), o(1, 0)]),
            Pattern::hint("kink-start-left", vec![o(0, 0), o(1, 1), o(1, 2)], 1, [o(0, 0), o(1, 0)]),
            Pattern::hint("kink-middle-right", vec![o(0, 0), o(1, 1), o(0, 2)], 1, [o(0, 1), o(1, 1)]),
            Pattern::hint("kink-middle-left", vec![o(1, 0), o(0, 1), o(1, 2)], 1, [o(0, 1), o(1, 1)]),
        ];

        Self::new(matches, hints)
    }
}

impl PatternLibrary for PatternSet {
    fn match_patterns(&self) -> Vec<Pattern> {
        self.matches.clone()
    }

    fn hint_patterns(&self) -> Vec<Pattern> {
        self.hints.clone()
    }
}

/// Merge a library into search order.
///
/// Match patterns come first, then hints; each group is sorted by
/// descending score, ties keeping registration order. The hint flag is
/// taken from the list a pattern came from.
pub fn prioritized(library: &dyn PatternLibrary) -> Vec<Pattern> {
    let mut matches = library.match_patterns();
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    for pattern in &mut matches {
        pattern.is_hint = false;
    }

    let mut hints = library.hint_patterns();
    hints.sort_by(|a, b| b.score.cmp(&a.score));
    for pattern in &mut hints {
        pattern.is_hint = true;
    }

    matches.extend(hints);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mask_offsets() {
        let l = Pattern::from_mask("l", &["X..", "X..", "XXX"], 30);
        assert_eq!(
            l.offsets,
            vec![
                Offset::new(0, 0),
                Offset::new(0, 1),
                Offset::new(0, 2),
                Offset::new(1, 2),
                Offset::new(2, 2),
            ]
        );
        assert!(!l.is_hint);
    }

    #[test]
    fn test_prioritized_order() {
        let library = PatternSet::new(
            vec![
                Pattern::horizontal(3, 10),
                Pattern::horizontal(5, 50),
                Pattern::vertical(3, 10),
            ],
            vec![Pattern::hint("hint", vec![Offset::ZERO], 99, [Offset::ZERO, Offset::ZERO])],
        );

        let names: Vec<_> = prioritized(&library).into_iter().map(|p| p.name).collect();

        // Hints always trail, even with a higher score; ties keep registration order.
        assert_eq!(names, vec!["horizontal-5", "horizontal-3", "vertical-3", "hint"]);
    }

    #[test]
    fn test_prioritized_normalizes_hint_flag() {
        let mut stray = Pattern::horizontal(3, 10);
        stray.is_hint = true;
        let library = PatternSet::matches_only(vec![stray]);

        assert!(!prioritized(&library)[0].is_hint);
    }

    #[test]
    fn test_classic_hints_carry_swaps() {
        let classic = PatternSet::classic();
        assert!(classic.hints.iter().all(|h| h.is_hint && h.hint_swap.is_some()));
        assert!(classic.matches.iter().all(|m| !m.is_hint));
    }

    #[test]
    fn test_pattern_json() {
        let json = r#"{ "name": "pair", "offsets": [{"dx":0,"dy":0},{"dx":1,"dy":0}], "score": 5 }"#;
        let pattern: Pattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.size(), 2);
        assert!(!pattern.is_hint);
        assert_eq!(pattern.hint_swap, None);
    }
}
