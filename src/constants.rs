//! Centralized tunables for the arena procedural core.
//!
//! These are the defaults behind `EngineConfig`; generators read them through
//! their parameter structs, never directly, so a loaded config can override
//! any of them.

// =====================================================
// Grid / Spawn
// =====================================================

/// Edge length of one tile in pixels (spawn queries answer in pixel space)
pub const TILE_SIZE: f32 = 32.0;

/// Random samples tried by the spawn fallback before giving up
pub const SPAWN_MAX_ATTEMPTS: usize = 100;

/// Returned when no walkable tile was found (row, col)
pub const SPAWN_FALLBACK: (usize, usize) = (1, 1);

// =====================================================
// Maze
// =====================================================

/// Smallest grid the backtracker accepts
pub const MAZE_MIN_SIZE: usize = 3;

/// Chance an interior wall is knocked out by braiding
pub const MAZE_BRAID_PROBABILITY: f64 = 0.15;

// =====================================================
// Cellular-automata cave
// =====================================================

pub const CAVE_MIN_SIZE: usize = 3;

/// Initial chance an interior cell starts as wall
pub const CAVE_WALL_PROBABILITY: f64 = 0.45;

pub const CAVE_SMOOTHING_PASSES: usize = 5;

/// Wall neighbours above this solidify, below it open up, equal stays
pub const CAVE_SOLIDIFY_THRESHOLD: usize = 4;

// =====================================================
// Worm tunnels
// =====================================================

pub const TUNNEL_MIN_SIZE: usize = 5;

/// Fraction of all tiles to carve before stopping
pub const TUNNEL_TARGET_FILL: f64 = 0.45;

/// Chance a worm keeps its heading
pub const TUNNEL_STRAIGHT_BIAS: f64 = 0.8;

/// Chance a worm may enter a cell with two carved neighbours
pub const TUNNEL_THICKEN_CHANCE: f64 = 0.05;

/// Per-tick chance a live worm spawns a child
pub const TUNNEL_SPAWN_CHANCE: f64 = 0.04;

pub const TUNNEL_MAX_AGENTS: usize = 4;

// =====================================================
// Office (partitioned rooms)
// =====================================================

/// Smallest side a partition leaf may have
pub const OFFICE_MIN_ROOM_SIZE: usize = 6;

/// Hard cap on partition tree depth
pub const OFFICE_MAX_DEPTH: usize = 12;

/// Rooms at least this large on both sides may get pillars
pub const OFFICE_PILLAR_ROOM_SIZE: usize = 10;

pub const OFFICE_PILLAR_CHANCE: f64 = 0.5;

pub const OFFICE_PILLAR_SPACING: usize = 3;

/// Pillar-free margin inside a room
pub const OFFICE_PILLAR_MARGIN: usize = 2;

/// Share of rooms that get an extra corridor to their nearest neighbour
pub const OFFICE_EXTRA_LINK_SHARE: f64 = 0.5;

// =====================================================
// Backrooms (zone composite)
// =====================================================

pub const BACKROOMS_MIN_SIZE: usize = 15;

/// Clearance kept between zones
pub const ZONE_BUFFER: usize = 2;

/// Placement attempts per zone before it is skipped
pub const ZONE_PLACEMENT_ATTEMPTS: usize = 30;

pub const ZONE_MIN_SIDE: usize = 9;

pub const ZONE_MAX_SIDE: usize = 17;

/// Grid area per requested zone
pub const ZONE_AREA_PER_ZONE: usize = 500;

/// Corridor width of the base maze layer
pub const BASE_CORRIDOR_WIDTH: usize = 2;

/// Corridor width inside wide zones
pub const WIDE_CORRIDOR_WIDTH: usize = 3;

/// Wall speckle density inside open zones
pub const OPEN_ZONE_SPECKLE: f64 = 0.05;

// =====================================================
// Connectivity
// =====================================================

/// Regions smaller than this are sealed instead of reconnected
pub const MIN_REGION_SIZE: usize = 20;

// =====================================================
// Terrain dressing
// =====================================================

/// One mud/ice patch per this many open cells
pub const TERRAIN_CELLS_PER_PATCH: usize = 150;

pub const TERRAIN_PATCH_RADIUS: usize = 1;

pub const TERRAIN_ICE_SHARE: f64 = 0.5;
