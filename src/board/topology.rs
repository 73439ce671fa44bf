//! Grid Topology
//!
//! Static cell graph built once from `BoardConfig`: neighbor tables and
//! gravity lanes. Cells live in a row-major arena and refer to each other
//! by index, so the graph has no ownership cycles.

use crate::core::position::{Direction, Position};
use crate::board::config::{BoardConfig, CellKind, ConfigError};
use crate::board::spawner::Spawner;

/// Index of a cell in the arena.
pub type CellIndex = usize;

/// Static data of one cell.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Grid position
    pub position: Position,
    /// Normal or blocked
    pub kind: CellKind,
    /// Direction pieces fall from this cell
    pub gravity: Direction,
    /// Cell one step along `gravity`; absent at the edge or above a blocked cell
    pub gravity_child: Option<CellIndex>,
    /// The cell whose `gravity_child` is this one
    pub gravity_parent: Option<CellIndex>,
    /// In-bounds neighbors, indexed by `Direction::index()`
    pub neighbors: [Option<CellIndex>; 4],
    /// Generator strategy
    pub spawner: Option<Spawner>,
}

impl Cell {
    /// True for blocked cells.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.kind == CellKind::Blocked
    }

    /// Neighbor in `dir`, if in bounds.
    #[inline]
    pub fn neighbor(&self, dir: Direction) -> Option<CellIndex> {
        self.neighbors[dir.index()]
    }
}

/// The full cell arena.
#[derive(Clone, Debug)]
pub struct Topology {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Topology {
    /// Build the cell graph.
    ///
    /// Fails if the grid is empty, the cell list has the wrong length,
    /// two cells fall into the same cell, or gravity loops.
    pub fn build(config: &BoardConfig) -> Result<Self, ConfigError> {
        let (width, height) = (config.width, config.height);
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyBoard { width, height });
        }

        let expected = width as usize * height as usize;
        if config.cells.len() != expected {
            return Err(ConfigError::CellCountMismatch {
                expected,
                actual: config.cells.len(),
            });
        }

        let mut topology = Self {
            width,
            height,
            cells: Vec::with_capacity(expected),
        };

        for (index, cell_config) in config.cells.iter().enumerate() {
            topology.cells.push(Cell {
                position: topology.position(index),
                kind: cell_config.kind,
                gravity: cell_config.gravity,
                gravity_child: None,
                gravity_parent: None,
                neighbors: [None; 4],
                spawner: cell_config.spawner.clone(),
            });
        }

        for index in 0..expected {
            let position = topology.cells[index].position;

            let mut neighbors = [None; 4];
            for dir in Direction::ALL {
                neighbors[dir.index()] = topology.index_of(position + dir.offset());
            }
            topology.cells[index].neighbors = neighbors;

            if !topology.cells[index].is_blocked() {
                let gravity = topology.cells[index].gravity;
                topology.cells[index].gravity_child = topology
                    .index_of(position + gravity.offset())
                    .filter(|child| !topology.cells[*child].is_blocked());
            }
        }

        topology.link_parents()?;
        topology.check_acyclic()?;

        Ok(topology)
    }

    fn link_parents(&mut self) -> Result<(), ConfigError> {
        for index in 0..self.cells.len() {
            let Some(child) = self.cells[index].gravity_child else {
                continue;
            };
            if let Some(first) = self.cells[child].gravity_parent {
                return Err(ConfigError::ConvergingGravity {
                    cell: self.cells[child].position,
                    first: self.cells[first].position,
                    second: self.cells[index].position,
                });
            }
            self.cells[child].gravity_parent = Some(index);
        }
        Ok(())
    }

    /// With at most one parent and one child per cell, every lane is a
    /// path or a loop. Walking down from each lane head marks all
    /// path cells; anything left unmarked sits on a loop.
    fn check_acyclic(&self) -> Result<(), ConfigError> {
        let mut on_path = vec![false; self.cells.len()];

        for head in 0..self.cells.len() {
            if self.cells[head].gravity_parent.is_some() {
                continue;
            }
            let mut current = Some(head);
            while let Some(index) = current {
                on_path[index] = true;
                current = self.cells[index].gravity_child;
            }
        }

        match on_path.iter().position(|visited| !visited) {
            Some(index) => Err(ConfigError::GravityCycle {
                at: self.cells[index].position,
            }),
            None => Ok(()),
        }
    }

    /// Columns.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; construction rejects empty boards.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Arena index of `position`, `None` if out of bounds.
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<CellIndex> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        let (x, y) = (position.x as u32, position.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Position of an arena index.
    #[inline]
    pub fn position(&self, index: CellIndex) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Cell by index.
    #[inline]
    pub fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[index]
    }

    /// Cell by position.
    #[inline]
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.index_of(position).map(|i| &self.cells[i])
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
