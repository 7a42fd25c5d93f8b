//! Zone-composite "backrooms" generator.
//!
//! Pipeline:
//! 1. place non-overlapping zones and mark them in a [`ZoneMask`]
//! 2. carve a width-2 base maze over every cell the mask leaves to the base
//! 3. carve each zone according to its kind
//! 4. breach zone rims where they meet the base maze
//! 5. connectivity cleanup (seal small pockets, reconnect the rest)

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::maze::{carve_lattice, Lattice};
use super::zones::{Zone, ZoneCarver, ZoneKind, ZoneMask};
use super::{ensure_min_size, GenerationError};
use crate::connectivity::{analyze_and_repair, RepairPolicy, RepairReport};
use crate::constants::*;
use crate::grid::{Coord, Grid, Rect, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackroomsParams {
    pub zone_buffer: usize,
    pub placement_attempts: usize,
    pub zone_min_side: usize,
    pub zone_max_side: usize,
    /// One zone is requested per this many grid cells
    pub zone_area: usize,
    pub base_width: usize,
    pub wide_width: usize,
    pub open_speckle: f64,
    pub min_region_size: usize,
}

impl Default for BackroomsParams {
    fn default() -> Self {
        Self {
            zone_buffer: ZONE_BUFFER,
            placement_attempts: ZONE_PLACEMENT_ATTEMPTS,
            zone_min_side: ZONE_MIN_SIDE,
            zone_max_side: ZONE_MAX_SIDE,
            zone_area: ZONE_AREA_PER_ZONE,
            base_width: BASE_CORRIDOR_WIDTH,
            wide_width: WIDE_CORRIDOR_WIDTH,
            open_speckle: OPEN_ZONE_SPECKLE,
            min_region_size: MIN_REGION_SIZE,
        }
    }
}

/// Wall overlay for a patterned zone, picked per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternStyle {
    /// Single-cell pillars on a square grid
    Pillars { spacing: usize },
    /// Full-width wall lines, each with one two-cell gap
    Stripes { vertical: bool, spacing: usize },
}

impl PatternStyle {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let spacing = rng.gen_range(3..=4);
        match rng.gen_range(0..3) {
            0 => PatternStyle::Pillars { spacing },
            1 => PatternStyle::Stripes {
                vertical: false,
                spacing,
            },
            _ => PatternStyle::Stripes {
                vertical: true,
                spacing,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackroomsLayout {
    pub grid: Grid,
    pub zones: Vec<Zone>,
    pub mask: ZoneMask,
    pub repair: RepairReport,
}

/// Place zones for a shuffled, wide-biased list of kinds. Zones that find no
/// free spot within the attempt budget are skipped.
pub fn place_zones<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &BackroomsParams,
    rng: &mut R,
) -> Vec<Zone> {
    let max_h = rows.saturating_sub(2).min(params.zone_max_side);
    let max_w = cols.saturating_sub(2).min(params.zone_max_side);
    if max_h < params.zone_min_side || max_w < params.zone_min_side {
        return Vec::new();
    }

    let wanted = (rows * cols / params.zone_area.max(1)).max(1);
    let mut kinds: Vec<ZoneKind> = ZoneKind::placement_pool()
        .iter()
        .cycle()
        .take(wanted)
        .copied()
        .collect();
    kinds.shuffle(rng);

    let mut placed: Vec<Zone> = Vec::new();
    for kind in kinds {
        let mut accepted = None;
        for _ in 0..params.placement_attempts {
            let h = rng.gen_range(params.zone_min_side..=max_h);
            let w = rng.gen_range(params.zone_min_side..=max_w);
            let r1 = rng.gen_range(1..=rows - 1 - h);
            let c1 = rng.gen_range(1..=cols - 1 - w);
            let rect = Rect::new(r1, c1, r1 + h - 1, c1 + w - 1);
            if placed
                .iter()
                .all(|z| !rect.overlaps_with_buffer(&z.rect, params.zone_buffer))
            {
                accepted = Some(rect);
                break;
            }
        }
        match accepted {
            Some(rect) => placed.push(Zone { rect, kind }),
            None => debug!(?kind, attempts = params.placement_attempts, "zone skipped"),
        }
    }
    placed
}

/// Fill `inner` with floor, then knock random cells back to wall.
pub fn carve_open<R: Rng + ?Sized>(grid: &mut Grid, inner: Rect, speckle: f64, rng: &mut R) {
    for cell in inner.cells() {
        let tile = if rng.gen_bool(speckle) {
            Tile::Wall
        } else {
            Tile::Empty
        };
        grid.put(cell, tile);
    }
}

/// Fill `inner` with floor and overlay `style`. Every floor cell stays
/// reachable from every other one inside `inner`.
pub fn carve_pattern<R: Rng + ?Sized>(grid: &mut Grid, inner: Rect, style: PatternStyle, rng: &mut R) {
    grid.fill_rect(inner, Tile::Empty);
    match style {
        PatternStyle::Pillars { spacing } => {
            for cell in inner.cells() {
                let (dr, dc) = (cell.row - inner.r1, cell.col - inner.c1);
                if dr % spacing == spacing - 1 && dc % spacing == spacing - 1 {
                    grid.put(cell, Tile::Wall);
                }
            }
        }
        PatternStyle::Stripes { vertical, spacing } => {
            let (lines, span) = if vertical {
                (inner.width(), inner.height())
            } else {
                (inner.height(), inner.width())
            };
            if span < 2 {
                return;
            }
            // last line stays open so no stripe hugs the far rim
            for offset in (spacing - 1..lines.saturating_sub(1)).step_by(spacing) {
                let gap = rng.gen_range(0..=span - 2);
                for along in 0..span {
                    if along == gap || along == gap + 1 {
                        continue;
                    }
                    let cell = if vertical {
                        Coord::new(inner.r1 + along, inner.c1 + offset)
                    } else {
                        Coord::new(inner.r1 + offset, inner.c1 + along)
                    };
                    grid.put(cell, Tile::Wall);
                }
            }
        }
    }
}

/// Carve the cells of `area` owned by `kind`, using the kind's carver.
fn carve_kind<R: Rng + ?Sized>(
    grid: &mut Grid,
    mask: &ZoneMask,
    kind: ZoneKind,
    area: Rect,
    params: &BackroomsParams,
    rng: &mut R,
) {
    match kind.carver(params.base_width, params.wide_width) {
        ZoneCarver::Maze { width } => {
            let lattice = Lattice {
                bounds: area,
                width,
                mask: Some((mask, kind)),
            };
            carve_lattice(grid, &lattice, rng);
        }
        ZoneCarver::Open => carve_open(grid, area, params.open_speckle, rng),
        ZoneCarver::Pattern => {
            let style = PatternStyle::random(rng);
            carve_pattern(grid, area, style, rng);
        }
    }
}

fn carve_zone<R: Rng + ?Sized>(
    grid: &mut Grid,
    mask: &ZoneMask,
    zone: &Zone,
    params: &BackroomsParams,
    rng: &mut R,
) {
    if let Some(inner) = zone.rect.inset(1) {
        carve_kind(grid, mask, zone.kind, inner, params, rng);
    }
}

/// Rim cell of a zone with its inward and outward neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RimCell {
    rim: Coord,
    inside: Coord,
    outside: Coord,
    /// Next rim cell along the same edge, for the second breach lane
    along: Coord,
}

fn rim_cells(rect: &Rect) -> Vec<RimCell> {
    let mut cells = Vec::new();
    // corners are skipped; `along` always stays on the same edge
    for c in rect.c1 + 1..rect.c2 - 1 {
        cells.push(RimCell {
            rim: Coord::new(rect.r1, c),
            inside: Coord::new(rect.r1 + 1, c),
            outside: Coord::new(rect.r1 - 1, c),
            along: Coord::new(rect.r1, c + 1),
        });
        cells.push(RimCell {
            rim: Coord::new(rect.r2, c),
            inside: Coord::new(rect.r2 - 1, c),
            outside: Coord::new(rect.r2 + 1, c),
            along: Coord::new(rect.r2, c + 1),
        });
    }
    for r in rect.r1 + 1..rect.r2 - 1 {
        cells.push(RimCell {
            rim: Coord::new(r, rect.c1),
            inside: Coord::new(r, rect.c1 + 1),
            outside: Coord::new(r, rect.c1 - 1),
            along: Coord::new(r + 1, rect.c1),
        });
        cells.push(RimCell {
            rim: Coord::new(r, rect.c2),
            inside: Coord::new(r, rect.c2 - 1),
            outside: Coord::new(r, rect.c2 + 1),
            along: Coord::new(r + 1, rect.c2),
        });
    }
    cells
}

/// Open two-wide breaches between a zone and the base maze. Returns the
/// number of breaches.
fn stitch_zone<R: Rng + ?Sized>(grid: &mut Grid, mask: &ZoneMask, zone: &Zone, rng: &mut R) -> usize {
    // zones always sit inside the border, so `outside` never underflows
    let mut eligible: Vec<RimCell> = rim_cells(&zone.rect)
        .into_iter()
        .filter(|cell| grid.at(cell.outside).is_walkable() && mask.at(cell.outside) == ZoneKind::Maze)
        .collect();
    eligible.shuffle(rng);

    let links = (zone.kind.base_link_count() + rng.gen_range(0..=1)).min(eligible.len());
    for cell in &eligible[..links] {
        grid.put(cell.rim, Tile::Empty);
        grid.put(cell.inside, Tile::Empty);
        grid.put(cell.along, Tile::Empty);
        let along_inside = Coord::new(
            cell.inside.row + cell.along.row - cell.rim.row,
            cell.inside.col + cell.along.col - cell.rim.col,
        );
        grid.put(along_inside, Tile::Empty);
    }
    links
}

/// Full zone-composite layout, including the connectivity cleanup.
pub fn generate_backrooms_layout<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &BackroomsParams,
    rng: &mut R,
) -> Result<BackroomsLayout, GenerationError> {
    ensure_min_size("backrooms", rows, cols, BACKROOMS_MIN_SIZE, BACKROOMS_MIN_SIZE)?;
    let mut grid = Grid::filled_with_walls(rows, cols)?;
    let mut mask = ZoneMask::new(rows, cols);

    let zones = place_zones(rows, cols, params, rng);
    for zone in &zones {
        mask.mark(zone);
    }

    if let Some(interior) = grid.interior() {
        carve_kind(&mut grid, &mask, ZoneKind::Maze, interior, params, rng);
    }

    for zone in &zones {
        carve_zone(&mut grid, &mask, zone, params, rng);
    }

    let mut breaches = 0;
    for zone in &zones {
        breaches += stitch_zone(&mut grid, &mask, zone, rng);
    }

    grid.seal_border();
    let (repair, regions) = analyze_and_repair(
        &mut grid,
        RepairPolicy::ReconnectOrSeal {
            min_size: params.min_region_size,
        },
    );
    debug!(
        rows,
        cols,
        zones = zones.len(),
        breaches,
        regions = regions.len(),
        "backrooms generated"
    );

    Ok(BackroomsLayout {
        grid,
        zones,
        mask,
        repair,
    })
}

pub fn generate_backrooms<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    params: &BackroomsParams,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    Ok(generate_backrooms_layout(rows, cols, params, rng)?.grid)
}
