//! Zone descriptors and the zone mask used by the backrooms generator.

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Rect};

/// Generation kind owning a cell. `Maze` is the base layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoneKind {
    #[default]
    Maze,
    WideRoom,
    WidePath,
    Open,
    Pattern,
}

/// How a zone kind is carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCarver {
    /// Lattice maze with the given corridor width
    Maze { width: usize },
    /// Fill with floor, sparse random wall speckling
    Open,
    /// Fill with floor, deterministic wall overlay
    Pattern,
}

impl ZoneKind {
    /// Kinds that can be placed as zones; wide kinds appear twice.
    pub fn placement_pool() -> &'static [ZoneKind] {
        &[
            ZoneKind::WideRoom,
            ZoneKind::WideRoom,
            ZoneKind::WidePath,
            ZoneKind::WidePath,
            ZoneKind::Open,
            ZoneKind::Pattern,
        ]
    }

    pub fn carver(self, base_width: usize, wide_width: usize) -> ZoneCarver {
        match self {
            ZoneKind::Maze => ZoneCarver::Maze { width: base_width },
            ZoneKind::WideRoom | ZoneKind::WidePath => ZoneCarver::Maze { width: wide_width },
            ZoneKind::Open => ZoneCarver::Open,
            ZoneKind::Pattern => ZoneCarver::Pattern,
        }
    }

    /// Breaches opened between a zone of this kind and the base maze.
    /// Rooms get few entrances, paths and open areas get more.
    pub fn base_link_count(self) -> usize {
        match self {
            ZoneKind::Maze => 0,
            ZoneKind::WideRoom => 2,
            ZoneKind::Pattern => 3,
            ZoneKind::WidePath => 4,
            ZoneKind::Open => 5,
        }
    }
}

/// A placed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub rect: Rect,
    pub kind: ZoneKind,
}

/// Per-cell zone kind, same shape as the tile grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMask {
    rows: usize,
    cols: usize,
    cells: Vec<ZoneKind>,
}

impl ZoneMask {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![ZoneKind::Maze; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> ZoneKind {
        assert!(
            row < self.rows && col < self.cols,
            "zone mask access ({row}, {col}) out of bounds for {}x{} mask",
            self.rows,
            self.cols
        );
        self.cells[row * self.cols + col]
    }

    pub fn at(&self, cell: Coord) -> ZoneKind {
        self.get(cell.row, cell.col)
    }

    pub fn mark(&mut self, zone: &Zone) {
        for cell in zone.rect.cells() {
            self.cells[cell.row * self.cols + cell.col] = zone.kind;
        }
    }

    pub fn count(&self, kind: ZoneKind) -> usize {
        self.cells.iter().filter(|k| **k == kind).count()
    }
}
