//! Tile grid data model.
//!
//! A rectangular, row-major table of tile codes. Every generator writes into a
//! fresh `Grid`, the connectivity pass reads it, and the round controller
//! receives it in the wire format (`Vec<Vec<u8>>`, codes 0..=4).

use serde::{Deserialize, Serialize};

/// Tile codes understood by the arena. The numeric value is the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    Empty = 0,
    Wall = 1,
    Mud = 2,
    Ice = 3,
    Hazard = 4,
}

impl Tile {
    /// Numeric ID for the grid wire format
    pub fn to_id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<Self, GridError> {
        match id {
            0 => Ok(Tile::Empty),
            1 => Ok(Tile::Wall),
            2 => Ok(Tile::Mud),
            3 => Ok(Tile::Ice),
            4 => Ok(Tile::Hazard),
            other => Err(GridError::UnknownTile(other)),
        }
    }

    /// Whether a player can stand here. Mud and ice only modify movement.
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Mud | Tile::Ice)
    }

    /// Walls and hazards both count as solid for connectivity and spawning.
    pub fn is_blocking(self) -> bool {
        !self.is_walkable()
    }
}

/// Grid position as (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Axis-aligned rectangle with inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub r1: usize,
    pub c1: usize,
    pub r2: usize,
    pub c2: usize,
}

impl Rect {
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        debug_assert!(r1 <= r2 && c1 <= c2, "inverted rect {r1},{c1}..{r2},{c2}");
        Self { r1, c1, r2, c2 }
    }

    pub fn height(&self) -> usize {
        self.r2 - self.r1 + 1
    }

    pub fn width(&self) -> usize {
        self.c2 - self.c1 + 1
    }

    pub fn center(&self) -> Coord {
        Coord::new((self.r1 + self.r2) / 2, (self.c1 + self.c2) / 2)
    }

    pub fn contains(&self, cell: Coord) -> bool {
        (self.r1..=self.r2).contains(&cell.row) && (self.c1..=self.c2).contains(&cell.col)
    }

    /// Overlap test after growing `self` by `buffer` tiles on every side.
    pub fn overlaps_with_buffer(&self, other: &Rect, buffer: usize) -> bool {
        self.r1 <= other.r2.saturating_add(buffer)
            && other.r1 <= self.r2.saturating_add(buffer)
            && self.c1 <= other.c2.saturating_add(buffer)
            && other.c1 <= self.c2.saturating_add(buffer)
    }

    /// Shrink by `pad` on every side. `None` if nothing would remain.
    pub fn inset(&self, pad: usize) -> Option<Rect> {
        if self.height() <= pad * 2 || self.width() <= pad * 2 {
            return None;
        }
        Some(Rect::new(
            self.r1 + pad,
            self.c1 + pad,
            self.r2 - pad,
            self.c2 - pad,
        ))
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (self.r1..=self.r2).flat_map(move |r| (self.c1..=self.c2).map(move |c| Coord::new(r, c)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    EmptyDimensions { rows: usize, cols: usize },
    #[error("row {row} has {len} cells, expected {expected}")]
    Ragged {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("unknown tile code {0}")]
    UnknownTile(u8),
    #[error("border cell ({row}, {col}) is {tile:?}, expected Wall")]
    BorderBreach { row: usize, col: usize, tile: Tile },
}

/// Rectangular tile table, row-major.
///
/// `get`/`set` panic when the position is outside the grid: every generator is
/// responsible for its own bounds arithmetic, so an out-of-range write is a bug
/// in the caller and never silently clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, fill: Tile) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        })
    }

    /// Solid grid; the usual starting point for carving generators.
    pub fn filled_with_walls(rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::new(rows, cols, Tile::Wall)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "grid access ({row}, {col}) out of bounds for {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, tile: Tile) {
        let idx = self.index(row, col);
        self.cells[idx] = tile;
    }

    pub fn at(&self, cell: Coord) -> Tile {
        self.get(cell.row, cell.col)
    }

    pub fn put(&mut self, cell: Coord, tile: Tile) {
        self.set(cell.row, cell.col, tile);
    }

    /// Signed lookup for neighbourhood scans; `None` off the edge.
    pub fn try_get(&self, row: isize, col: isize) -> Option<Tile> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub fn is_walkable(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_walkable()
    }

    pub fn is_border(&self, row: usize, col: usize) -> bool {
        row == 0 || col == 0 || row + 1 == self.rows || col + 1 == self.cols
    }

    pub fn is_interior(&self, row: usize, col: usize) -> bool {
        row > 0 && col > 0 && row + 1 < self.rows && col + 1 < self.cols
    }

    /// Everything except the outer ring. `None` for grids thinner than 3.
    pub fn interior(&self) -> Option<Rect> {
        if self.rows < 3 || self.cols < 3 {
            return None;
        }
        Some(Rect::new(1, 1, self.rows - 2, self.cols - 2))
    }

    /// In-bounds 4-neighbours of a cell (N, S, W, E order).
    pub fn neighbors4(&self, cell: Coord) -> impl Iterator<Item = Coord> {
        let (rows, cols) = (self.rows, self.cols);
        let Coord { row, col } = cell;
        [
            (row.checked_sub(1), Some(col)),
            (Some(row + 1).filter(|r| *r < rows), Some(col)),
            (Some(row), col.checked_sub(1)),
            (Some(row), Some(col + 1).filter(|c| *c < cols)),
        ]
        .into_iter()
        .filter_map(|(r, c)| Some(Coord::new(r?, c?)))
    }

    /// Count of walls among the 8 surrounding cells. Off-grid counts as wall.
    pub fn wall_count8(&self, row: usize, col: usize) -> usize {
        let mut count = 0;
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                match self.try_get(row as isize + dr, col as isize + dc) {
                    Some(Tile::Wall) | None => count += 1,
                    Some(_) => {}
                }
            }
        }
        count
    }

    pub fn fill_rect(&mut self, rect: Rect, tile: Tile) {
        for cell in rect.cells() {
            self.put(cell, tile);
        }
    }

    /// Force the outer ring to `Wall`.
    pub fn seal_border(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        for c in 0..cols {
            self.set(0, c, Tile::Wall);
            self.set(rows - 1, c, Tile::Wall);
        }
        for r in 0..rows {
            self.set(r, 0, Tile::Wall);
            self.set(r, cols - 1, Tile::Wall);
        }
    }

    /// Check the border-is-wall contract. Reports the first offending cell.
    pub fn check_border(&self) -> Result<(), GridError> {
        for r in 0..self.rows {
            for c in 0..self.cols {
                if !self.is_border(r, c) {
                    continue;
                }
                let tile = self.get(r, c);
                if tile != Tile::Wall {
                    return Err(GridError::BorderBreach { row: r, col: c, tile });
                }
            }
        }
        Ok(())
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|t| **t == tile).count()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_walkable()).count()
    }

    /// Walkable share of all tiles, 0.0..=1.0.
    pub fn fill_ratio(&self) -> f32 {
        self.walkable_count() as f32 / self.cells.len() as f32
    }

    pub fn walkable_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_walkable())
            .map(|(i, _)| Coord::new(i / self.cols, i % self.cols))
    }

    pub fn row_slice(&self, row: usize) -> &[Tile] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.cols]
    }

    /// Wire format: array of rows of tile codes.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows)
            .map(|r| self.row_slice(r).iter().map(|t| t.to_id()).collect())
            .collect()
    }

    /// Parse the wire format. Dimensions come from the array lengths.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridError::EmptyDimensions {
                rows: height,
                cols: width,
            });
        }

        let mut cells = Vec::with_capacity(height * width);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: r,
                    len: row.len(),
                    expected: width,
                });
            }
            for code in row {
                cells.push(Tile::from_id(*code)?);
            }
        }

        Ok(Self {
            rows: height,
            cols: width,
            cells,
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Grid::from_rows(&rows)
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}
