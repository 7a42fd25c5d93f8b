//! Connectivity analysis and region repair.
//!
//! [`analyze`] is read-only: it flood-fills the walkable cells into maximal
//! 4-connected regions, largest first. [`repair`] applies a [`RepairPolicy`]
//! to a region list, sealing small pockets and carving corridors from larger
//! ones to the dominant region.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grid::{Coord, Grid, Tile};

/// Maximal set of mutually reachable walkable cells.
///
/// Cells are stored in flood-fill order from the region's first cell in
/// row-major scan order, which doubles as its representative point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub cells: Vec<Coord>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell reached by the scan; always part of the region.
    pub fn representative(&self) -> Coord {
        self.cells[0]
    }

    pub fn contains(&self, cell: Coord) -> bool {
        self.cells.contains(&cell)
    }
}

/// Flood-fill from `start`, marking `visited`. Cells in BFS order.
fn flood(grid: &Grid, start: Coord, visited: &mut [bool]) -> Vec<Coord> {
    let cols = grid.cols();
    let mut cells = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited[start.row * cols + start.col] = true;
    while let Some(cell) = queue.pop_front() {
        cells.push(cell);
        for next in grid.neighbors4(cell) {
            let idx = next.row * cols + next.col;
            if !visited[idx] && grid.at(next).is_walkable() {
                visited[idx] = true;
                queue.push_back(next);
            }
        }
    }
    cells
}

/// All walkable regions, largest first. Ties keep scan order, so the result
/// depends only on the grid contents.
pub fn analyze(grid: &Grid) -> Vec<Region> {
    let mut visited = vec![false; grid.len()];
    let mut regions = Vec::new();
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            if visited[r * grid.cols() + c] || !grid.is_walkable(r, c) {
                continue;
            }
            regions.push(Region {
                cells: flood(grid, Coord::new(r, c), &mut visited),
            });
        }
    }
    regions.sort_by(|a, b| b.len().cmp(&a.len()));
    regions
}

/// Cells reachable from `start` (empty if `start` is blocked).
pub fn reachable_from(grid: &Grid, start: Coord) -> Vec<Coord> {
    if !grid.at(start).is_walkable() {
        return Vec::new();
    }
    let mut visited = vec![false; grid.len()];
    flood(grid, start, &mut visited)
}

/// What to do with regions other than the dominant one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairPolicy {
    /// Wall off every non-dominant region
    Seal,
    /// Corridor regions of at least `min_size` cells to the dominant region,
    /// seal the rest
    ReconnectOrSeal { min_size: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    pub regions_found: usize,
    pub sealed_regions: usize,
    pub sealed_cells: usize,
    pub reconnected_regions: usize,
    pub corridor_cells: usize,
}

/// Fill a region's cells with wall.
pub fn seal_region(grid: &mut Grid, region: &Region) -> usize {
    for cell in &region.cells {
        grid.put(*cell, Tile::Wall);
    }
    region.len()
}

fn open_cell(grid: &mut Grid, row: usize, col: usize) -> usize {
    if !grid.is_interior(row, col) || grid.is_walkable(row, col) {
        return 0;
    }
    grid.set(row, col, Tile::Empty);
    1
}

/// Straight two-wide corridor from `from` to `to`: rows first, then
/// columns, one cell per step. The second lane sits on the next row/column,
/// or the previous one at the far edge. Never touches the border.
///
/// Returns the number of cells that were opened.
pub fn carve_corridor(grid: &mut Grid, from: Coord, to: Coord) -> usize {
    let (rows, cols) = (grid.rows(), grid.cols());
    let lane_col = if from.col + 2 < cols { from.col + 1 } else { from.col.saturating_sub(1) };
    let lane_row = if to.row + 2 < rows { to.row + 1 } else { to.row.saturating_sub(1) };

    let mut opened = 0;
    let (mut r, mut c) = (from.row, from.col);

    opened += open_cell(grid, r, c);
    while r != to.row {
        r = if r < to.row { r + 1 } else { r - 1 };
        opened += open_cell(grid, r, c);
        opened += open_cell(grid, r, lane_col);
    }
    while c != to.col {
        c = if c < to.col { c + 1 } else { c - 1 };
        opened += open_cell(grid, r, c);
        opened += open_cell(grid, lane_row, c);
    }
    opened
}

/// Apply `policy` to the regions returned by [`analyze`] for this grid.
/// The first region is treated as dominant and is never touched.
pub fn repair(grid: &mut Grid, regions: &[Region], policy: RepairPolicy) -> RepairReport {
    let mut report = RepairReport {
        regions_found: regions.len(),
        ..Default::default()
    };
    let Some((dominant, rest)) = regions.split_first() else {
        return report;
    };
    let floor = match policy {
        RepairPolicy::Seal => usize::MAX,
        RepairPolicy::ReconnectOrSeal { min_size } => min_size,
    };

    // Seal first: a later corridor may run through a sealed pocket, but a
    // seal must never cut a corridor.
    for region in rest.iter().filter(|r| r.len() < floor) {
        report.sealed_cells += seal_region(grid, region);
        report.sealed_regions += 1;
    }

    let target = dominant.representative();
    for region in rest.iter().filter(|r| r.len() >= floor) {
        report.corridor_cells += carve_corridor(grid, region.representative(), target);
        report.reconnected_regions += 1;
    }

    if report.sealed_regions + report.reconnected_regions > 0 {
        info!(
            regions = report.regions_found,
            sealed = report.sealed_regions,
            sealed_cells = report.sealed_cells,
            reconnected = report.reconnected_regions,
            corridor_cells = report.corridor_cells,
            "region repair applied"
        );
    } else {
        debug!(regions = report.regions_found, "grid already connected");
    }
    report
}

/// Analyze and repair in one go; returns the regions after repair.
pub fn analyze_and_repair(grid: &mut Grid, policy: RepairPolicy) -> (RepairReport, Vec<Region>) {
    let before = analyze(grid);
    let report = repair(grid, &before, policy);
    let after = if report.sealed_regions + report.reconnected_regions > 0 {
        analyze(grid)
    } else {
        before
    };
    (report, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Parse '#' as wall, '!' as hazard, '~' as mud, anything else as floor.
    fn grid_from(art: &[&str]) -> Grid {
        let rows: Vec<Vec<u8>> = art
            .iter()
            .map(|line| {
                line.chars()
                    .map(|ch| match ch {
                        '#' => 1,
                        '!' => 4,
                        '~' => 2,
                        _ => 0,
                    })
                    .collect()
            })
            .collect();
        Grid::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_analyze_finds_sorted_regions() {
        let grid = grid_from(&[
            "#######", //
            "#.#...#", //
            "#.#...#", //
            "###...#", //
            "#######",
        ]);
        let regions = analyze(&grid);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].len(), 9);
        assert_eq!(regions[1].len(), 2);
        assert_eq!(regions[0].representative(), Coord::new(1, 3));
        assert_eq!(regions[1].representative(), Coord::new(1, 1));
    }

    #[test]
    fn test_hazard_splits_and_mud_joins() {
        let grid = grid_from(&[
            "#######", //
            "#..!..#", //
            "#######",
        ]);
        assert_eq!(analyze(&grid).len(), 2);

        let grid = grid_from(&[
            "#######", //
            "#..~..#", //
            "#######",
        ]);
        let regions = analyze(&grid);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 5);
    }

    #[test]
    fn test_regions_partition_walkable_cells() {
        let grid = grid_from(&[
            "#########", //
            "#..#..#.#", //
            "#.##.~#.#", //
            "#..#!!#.#", //
            "#########",
        ]);
        let regions = analyze(&grid);
        let mut seen = HashSet::new();
        for region in &regions {
            for cell in &region.cells {
                assert!(seen.insert(*cell), "{cell:?} in two regions");
            }
        }
        let walkable: HashSet<_> = grid.walkable_cells().collect();
        assert_eq!(seen, walkable);
    }

    #[test]
    fn test_all_wall_grid_has_no_regions() {
        let grid = Grid::filled_with_walls(6, 6).unwrap();
        assert!(analyze(&grid).is_empty());
        let mut copy = grid.clone();
        let report = repair(&mut copy, &[], RepairPolicy::Seal);
        assert_eq!(report, RepairReport::default());
        assert_eq!(copy, grid);
    }

    #[test]
    fn test_analyze_does_not_mutate_and_is_stable() {
        let grid = grid_from(&[
            "########", //
            "#..#...#", //
            "#..#.#.#", //
            "####.#.#", //
            "#..#...#", //
            "########",
        ]);
        let snapshot = grid.clone();
        let a = analyze(&grid);
        let b = analyze(&grid);
        assert_eq!(a, b);
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn test_seal_policy_leaves_one_region() {
        let mut grid = grid_from(&[
            "#######", //
            "#.#...#", //
            "#.#...#", //
            "###...#", //
            "#######",
        ]);
        let regions = analyze(&grid);
        let report = repair(&mut grid, &regions, RepairPolicy::Seal);
        assert_eq!(report.sealed_regions, 1);
        assert_eq!(report.sealed_cells, 2);
        assert_eq!(grid.get(1, 1), Tile::Wall);
        assert_eq!(analyze(&grid).len(), 1);
    }

    #[test]
    fn test_reconnect_policy_merges_large_regions() {
        let mut grid = grid_from(&[
            "############", //
            "#....#.....#", //
            "#....#.....#", //
            "######.....#", //
            "#..#########", //
            "############",
        ]);
        let regions = analyze(&grid);
        assert_eq!(regions.len(), 3);
        let report = repair(&mut grid, &regions, RepairPolicy::ReconnectOrSeal { min_size: 8 });
        assert_eq!(report.reconnected_regions, 1);
        assert_eq!(report.sealed_regions, 1);
        assert!(report.corridor_cells > 0);
        assert_eq!(analyze(&grid).len(), 1);
        assert!(grid.check_border().is_ok());
    }

    #[test]
    fn test_corridor_reaches_target_and_spares_border() {
        let mut grid = Grid::filled_with_walls(10, 10).unwrap();
        grid.set(1, 1, Tile::Empty);
        grid.set(8, 8, Tile::Empty);
        let opened = carve_corridor(&mut grid, Coord::new(1, 1), Coord::new(8, 8));
        assert!(opened > 0);
        assert_eq!(analyze(&grid).len(), 1);
        assert!(grid.check_border().is_ok());
        assert!(reachable_from(&grid, Coord::new(1, 1)).contains(&Coord::new(8, 8)));
    }

    #[test]
    fn test_analyze_and_repair_returns_fresh_regions() {
        let mut grid = grid_from(&[
            "#######", //
            "#.#...#", //
            "#.#...#", //
            "#######",
        ]);
        let (report, regions) = analyze_and_repair(&mut grid, RepairPolicy::Seal);
        assert_eq!(report.regions_found, 2);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 6);
    }
}
