//! Partitioned rooms-and-corridors ("office") generator.
//!
//! Binary space partition over the interior, one room per leaf, L-shaped
//! two-wide corridors between sibling subtrees, then extra nearest-neighbour
//! corridors so the layout is not a strict tree.
//!
//! The partition tree lives in an index arena and is built with an explicit
//! work stack.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_min_size, GenerationError};
use crate::constants::*;
use crate::grid::{Coord, Grid, Rect, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeParams {
    pub min_room_size: usize,
    pub max_depth: usize,
    pub pillar_chance: f64,
    /// Share of rooms that get an extra corridor to their nearest neighbour
    pub extra_link_share: f64,
}

impl Default for OfficeParams {
    fn default() -> Self {
        Self {
            min_room_size: OFFICE_MIN_ROOM_SIZE,
            max_depth: OFFICE_MAX_DEPTH,
            pillar_chance: OFFICE_PILLAR_CHANCE,
            extra_link_share: OFFICE_EXTRA_LINK_SHARE,
        }
    }
}

/// Node of the partition tree. Children are arena indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNode {
    pub rect: Rect,
    pub children: Option<(usize, usize)>,
    pub room: Option<Rect>,
    pub depth: usize,
}

/// Arena-backed partition tree; node 0 is the root.
#[derive(Debug, Clone, Default)]
pub struct PartitionTree {
    pub nodes: Vec<PartitionNode>,
}

impl PartitionTree {
    pub fn leaves(&self) -> impl Iterator<Item = &PartitionNode> {
        self.nodes.iter().filter(|n| n.children.is_none())
    }

    /// Internal nodes, deepest first, so sibling stitching runs bottom-up.
    fn internal_bottom_up(&self) -> Vec<usize> {
        let mut internal: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].children.is_some())
            .collect();
        internal.sort_by(|a, b| self.nodes[*b].depth.cmp(&self.nodes[*a].depth));
        internal
    }
}

/// Generated office map plus its rooms.
#[derive(Debug, Clone)]
pub struct OfficeLayout {
    pub grid: Grid,
    pub rooms: Vec<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitAxis {
    /// Cut between rows
    Horizontal,
    /// Cut between columns
    Vertical,
}

fn choose_axis<R: Rng + ?Sized>(rect: &Rect, rng: &mut R) -> SplitAxis {
    let (h, w) = (rect.height() as f64, rect.width() as f64);
    if w > h * 1.25 {
        SplitAxis::Vertical
    } else if h > w * 1.25 {
        SplitAxis::Horizontal
    } else if rng.gen_bool(0.5) {
        SplitAxis::Vertical
    } else {
        SplitAxis::Horizontal
    }
}

/// Split `rect` so both halves keep at least `min` cells along the cut axis.
fn split<R: Rng + ?Sized>(rect: &Rect, min: usize, rng: &mut R) -> Option<(Rect, Rect)> {
    let axis = choose_axis(rect, rng);
    let span = match axis {
        SplitAxis::Horizontal => rect.height(),
        SplitAxis::Vertical => rect.width(),
    };
    if span < min * 2 {
        return None;
    }
    // first half length in [min, span - min]
    let first = rng.gen_range(min..=span - min);
    Some(match axis {
        SplitAxis::Horizontal => (
            Rect::new(rect.r1, rect.c1, rect.r1 + first - 1, rect.c2),
            Rect::new(rect.r1 + first, rect.c1, rect.r2, rect.c2),
        ),
        SplitAxis::Vertical => (
            Rect::new(rect.r1, rect.c1, rect.r2, rect.c1 + first - 1),
            Rect::new(rect.r1, rect.c1 + first, rect.r2, rect.c2),
        ),
    })
}

/// Partition `bounds` until leaves would drop below `min_size`.
pub fn build_partition<R: Rng + ?Sized>(
    bounds: Rect,
    min_size: usize,
    max_depth: usize,
    rng: &mut R,
) -> PartitionTree {
    let mut tree = PartitionTree {
        nodes: vec![PartitionNode {
            rect: bounds,
            children: None,
            room: None,
            depth: 0,
        }],
    };
    let mut work = vec![0usize];
    while let Some(idx) = work.pop() {
        let node = tree.nodes[idx].clone();
        let halves = if node.depth < max_depth {
            split(&node.rect, min_size, rng)
        } else {
            None
        };
        match halves {
            Some((a, b)) => {
                let left = tree.nodes.len();
                for rect in [a, b] {
                    tree.nodes.push(PartitionNode {
                        rect,
                        children: None,
                        room: None,
                        depth: node.depth + 1,
                    });
                }
                tree.nodes[idx].children = Some((left, left + 1));
                work.push(left);
                work.push(left + 1);
            }
            None => {
                tree.nodes[idx].room = node.rect.inset(1);
            }
        }
    }
    tree
}

/// Room centre for a leaf, otherwise a randomly chosen child's
/// representative.
fn representative<R: Rng + ?Sized>(tree: &PartitionTree, mut idx: usize, rng: &mut R) -> Option<Coord> {
    loop {
        let node = &tree.nodes[idx];
        match node.children {
            None => return node.room.map(|room| room.center()),
            Some((a, b)) => idx = if rng.gen_bool(0.5) { a } else { b },
        }
    }
}

fn carve_room<R: Rng + ?Sized>(grid: &mut Grid, room: Rect, pillar_chance: f64, rng: &mut R) {
    grid.fill_rect(room, Tile::Empty);
    if room.height() < OFFICE_PILLAR_ROOM_SIZE || room.width() < OFFICE_PILLAR_ROOM_SIZE {
        return;
    }
    if !rng.gen_bool(pillar_chance) {
        return;
    }
    let center = room.center();
    for r in (room.r1 + OFFICE_PILLAR_MARGIN..=room.r2 - OFFICE_PILLAR_MARGIN).step_by(OFFICE_PILLAR_SPACING) {
        for c in (room.c1 + OFFICE_PILLAR_MARGIN..=room.c2 - OFFICE_PILLAR_MARGIN)
            .step_by(OFFICE_PILLAR_SPACING)
        {
            if Coord::new(r, c) != center {
                grid.set(r, c, Tile::Wall);
            }
        }
    }
}

/// Two-wide horizontal run at `row`, clipped to `interior`.
fn carve_h(grid: &mut Grid, interior: &Rect, row: usize, c1: usize, c2: usize) {
    let (lo, hi) = (c1.min(c2), c1.max(c2));
    for r in [row, row + 1] {
        if !(interior.r1..=interior.r2).contains(&r) {
            continue;
        }
        for c in lo.max(interior.c1)..=hi.min(interior.c2) {
            grid.set(r, c, Tile::Empty);
        }
    }
}

/// Two-wide vertical run at `col`, clipped to `interior`.
fn carve_v(grid: &mut Grid, interior: &Rect, col: usize, r1: usize, r2: usize) {
    let (lo, hi) = (r1.min(r2), r1.max(r2));
    for c in [col, col + 1] {
        if !(interior.c1..=interior.c2).contains(&c) {
            continue;
        }
        for r in lo.max(interior.r1)..=hi.min(interior.r2) {
            grid.set(r, c, Tile::Empty);
        }
    }
}

/// L-shaped two-wide corridor, horizontal-first or vertical-first at random.
pub fn carve_l_corridor<R: Rng + ?Sized>(grid: &mut Grid, from: Coord, to: Coord, rng: &mut R) {
    let Some(interior) = grid.interior() else {
        return;
    };
    if rng.gen_bool(0.5) {
        carve_h(grid, &interior, from.row, from.col, to.col);
        carve_v(grid, &interior, to.col, from.row, to.row);
    } else {
        carve_v(grid, &interior, from.col, from.row, to.row);
        carve_h(grid, &interior, to.row, from.col, to.col);
    }
}

pub fn generate_office_layout<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &OfficeParams,
    rng: &mut R,
) -> Result<OfficeLayout, GenerationError> {
    let min = params.min_room_size.max(3);
    ensure_min_size("office", rows, cols, min + 2, min + 2)?;
    let mut grid = Grid::filled_with_walls(rows, cols)?;
    let interior = Rect::new(1, 1, rows - 2, cols - 2);

    let tree = build_partition(interior, min, params.max_depth, rng);

    let rooms: Vec<Rect> = tree.leaves().filter_map(|leaf| leaf.room).collect();
    for room in &rooms {
        carve_room(&mut grid, *room, params.pillar_chance, rng);
    }

    for idx in tree.internal_bottom_up() {
        let Some((a, b)) = tree.nodes[idx].children else {
            continue;
        };
        if let (Some(pa), Some(pb)) = (representative(&tree, a, rng), representative(&tree, b, rng)) {
            carve_l_corridor(&mut grid, pa, pb, rng);
        }
    }

    let mut order: Vec<usize> = (0..rooms.len()).collect();
    order.shuffle(rng);
    let extra = ((rooms.len() as f64) * params.extra_link_share).round() as usize;
    let mut extra_links = 0;
    for &i in order.iter().take(extra) {
        let here = rooms[i].center();
        let nearest = rooms
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .min_by_key(|(_, room)| here.manhattan(room.center()));
        if let Some((_, other)) = nearest {
            carve_l_corridor(&mut grid, here, other.center(), rng);
            extra_links += 1;
        }
    }

    grid.seal_border();
    debug!(
        rows,
        cols,
        rooms = rooms.len(),
        nodes = tree.nodes.len(),
        extra_links,
        "office generated"
    );
    Ok(OfficeLayout { grid, rooms })
}

pub fn generate_office<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &OfficeParams,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    generate_office_layout(rows, cols, params, rng).map(|layout| layout.grid)
}
