//! Organic tunnel carving with worm agents.
//!
//! Worms wander from the grid centre, preferring to keep their heading. A worm
//! may only enter a wall cell that touches at most one carved cell (rarely
//! two), which keeps passages one tile thick instead of merging into blobs.
//! Every carved cell is adjacent to an earlier one, so the result is a single
//! connected tunnel network.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_min_size, GenerationError};
use crate::constants::*;
use crate::grid::{Coord, Grid, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WormParams {
    pub target_fill: f64,
    pub straight_bias: f64,
    pub thicken_chance: f64,
    pub spawn_chance: f64,
    pub max_agents: usize,
    /// Moves a fresh worm may make; 0 means rows + cols.
    pub lifespan: usize,
}

impl Default for WormParams {
    fn default() -> Self {
        Self {
            target_fill: TUNNEL_TARGET_FILL,
            straight_bias: TUNNEL_STRAIGHT_BIAS,
            thicken_chance: TUNNEL_THICKEN_CHANCE,
            spawn_chance: TUNNEL_SPAWN_CHANCE,
            max_agents: TUNNEL_MAX_AGENTS,
            lifespan: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    North,
    South,
    West,
    East,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::South, Heading::West, Heading::East];

    fn delta(self) -> (isize, isize) {
        match self {
            Heading::North => (-1, 0),
            Heading::South => (1, 0),
            Heading::West => (0, -1),
            Heading::East => (0, 1),
        }
    }

    fn left(self) -> Heading {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    fn right(self) -> Heading {
        self.left().left().left()
    }

    fn reverse(self) -> Heading {
        self.left().left()
    }
}

/// Carving cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Worm {
    pub pos: Coord,
    pub heading: Heading,
    pub life: usize,
}

/// Cell one step away, if it lies inside the border.
fn step(grid: &Grid, from: Coord, heading: Heading) -> Option<Coord> {
    let (dr, dc) = heading.delta();
    let row = from.row.checked_add_signed(dr)?;
    let col = from.col.checked_add_signed(dc)?;
    if row >= grid.rows() || col >= grid.cols() || !grid.is_interior(row, col) {
        return None;
    }
    Some(Coord::new(row, col))
}

fn carved_neighbours(grid: &Grid, cell: Coord) -> usize {
    grid.neighbors4(cell)
        .filter(|n| grid.at(*n).is_walkable())
        .count()
}

/// Strict thin-tunnel check used for revival sites.
fn is_open_frontier(grid: &Grid, cell: Coord) -> bool {
    grid.at(cell) == Tile::Wall && carved_neighbours(grid, cell) <= 1
}

fn can_enter<R: Rng + ?Sized>(grid: &Grid, cell: Coord, thicken_chance: f64, rng: &mut R) -> bool {
    if grid.at(cell) != Tile::Wall {
        return false;
    }
    match carved_neighbours(grid, cell) {
        0 | 1 => true,
        2 => rng.gen_bool(thicken_chance),
        _ => false,
    }
}

/// Straight with `straight_bias`, otherwise mostly a side turn and rarely a
/// reversal.
fn propose_heading<R: Rng + ?Sized>(heading: Heading, straight_bias: f64, rng: &mut R) -> Heading {
    let roll: f64 = rng.gen();
    if roll < straight_bias {
        return heading;
    }
    let turn = (roll - straight_bias) / (1.0 - straight_bias).max(f64::EPSILON);
    if turn < 0.45 {
        heading.left()
    } else if turn < 0.9 {
        heading.right()
    } else {
        heading.reverse()
    }
}

/// Already-carved cell with a wall neighbour a worm could enter.
fn revival_site<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<(Coord, Heading)> {
    let mut sites = Vec::new();
    for cell in grid.walkable_cells() {
        for heading in Heading::ALL {
            if let Some(next) = step(grid, cell, heading) {
                if is_open_frontier(grid, next) {
                    sites.push((cell, heading));
                }
            }
        }
    }
    sites.choose(rng).copied()
}

pub fn generate_tunnels<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &WormParams,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    ensure_min_size("tunnels", rows, cols, TUNNEL_MIN_SIZE, TUNNEL_MIN_SIZE)?;
    let mut grid = Grid::filled_with_walls(rows, cols)?;

    let interior_area = (rows - 2) * (cols - 2);
    let target = ((rows * cols) as f64 * params.target_fill).ceil() as usize;
    let target = target.clamp(1, interior_area);
    let lifespan = if params.lifespan == 0 {
        rows + cols
    } else {
        params.lifespan
    };
    let max_agents = params.max_agents.max(1);

    let start = Coord::new(rows / 2, cols / 2);
    let mut agents = vec![Worm {
        pos: start,
        heading: *Heading::ALL.choose(rng).unwrap_or(&Heading::East),
        life: lifespan,
    }];
    let mut carved = 0usize;
    let mut revivals = 0usize;

    while carved < target {
        if agents.is_empty() {
            if revivals >= rows * cols {
                break;
            }
            let Some((pos, heading)) = revival_site(&grid, rng) else {
                break;
            };
            agents.push(Worm {
                pos,
                heading,
                life: lifespan,
            });
            revivals += 1;
        }

        let live = agents.len();
        let mut spawned: Vec<Worm> = Vec::new();
        agents.retain_mut(|worm| {
            if grid.at(worm.pos) == Tile::Wall {
                grid.put(worm.pos, Tile::Empty);
                carved += 1;
            }

            let heading = propose_heading(worm.heading, params.straight_bias, rng);
            let Some(next) = step(&grid, worm.pos, heading) else {
                return false;
            };
            if !can_enter(&grid, next, params.thicken_chance, rng) {
                return false;
            }

            grid.put(next, Tile::Empty);
            carved += 1;
            worm.pos = next;
            worm.heading = heading;
            worm.life -= 1;
            if worm.life == 0 {
                return false;
            }

            if live + spawned.len() < max_agents && rng.gen_bool(params.spawn_chance) {
                let branch = if rng.gen_bool(0.5) {
                    heading.left()
                } else {
                    heading.right()
                };
                spawned.push(Worm {
                    pos: next,
                    heading: branch,
                    life: (worm.life / 2).max(1),
                });
            }
            true
        });
        agents.extend(spawned);
    }

    grid.seal_border();
    debug!(
        rows,
        cols,
        carved,
        target,
        revivals,
        "tunnels carved"
    );
    Ok(grid)
}
