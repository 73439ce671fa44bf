//! Grid Coordinates
//!
//! Integer cell positions and offsets. `x` grows to the right, `y` grows
//! downward, so `Direction::Down` is `(0, +1)`.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// Position of a cell on the board.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset from `other` to `self`.
    #[inline]
    pub fn offset_from(self, other: Self) -> Offset {
        Offset::new(self.x - other.x, self.y - other.y)
    }

    /// Manhattan distance to another position.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True if the positions share an edge.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }

    /// `self + offset`, `None` on `i32` overflow.
    #[inline]
    pub fn checked_add(self, offset: Offset) -> Option<Self> {
        Some(Self::new(self.x.checked_add(offset.dx)?, self.y.checked_add(offset.dy)?))
    }
}

impl Add<Offset> for Position {
    type Output = Self;

    #[inline]
    fn add(self, offset: Offset) -> Self {
        Self::new(self.x + offset.dx, self.y + offset.dy)
    }
}

impl Sub for Position {
    type Output = Offset;

    #[inline]
    fn sub(self, other: Self) -> Offset {
        self.offset_from(other)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Relative displacement between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Column delta
    pub dx: i32,
    /// Row delta
    pub dy: i32,
}

impl Offset {
    /// Zero offset (pattern anchor)
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// One of the four cardinal directions.
///
/// Used both for neighbor lookup and as a cell's gravity direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards row 0
    Up = 0,
    /// Towards increasing x
    Right = 1,
    /// Towards increasing y
    #[default]
    Down = 2,
    /// Towards column 0
    Left = 3,
}

impl Direction {
    /// All directions in neighbor-table order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit offset for this direction.
    #[inline]
    pub const fn offset(self) -> Offset {
        match self {
            Direction::Up => Offset::new(0, -1),
            Direction::Right => Offset::new(1, 0),
            Direction::Down => Offset::new(0, 1),
            Direction::Left => Offset::new(-1, 0),
        }
    }

    /// Opposite direction.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Index into a 4-slot neighbor table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}
