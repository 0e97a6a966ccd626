//! Core engine types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Integer world coordinate of a single block.
///
/// All geometry predicates operate on integer coordinates so boundary tests
/// are exact: a point on a region face is never "flickered" in or out by
/// floating-point rounding.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Grid cells
// ---------------------------------------------------------------------------

/// Horizontal grid cell used by the spatial index.
///
/// Cells partition the (x, z) plane; the vertical axis is not bucketed since
/// region sets are overwhelmingly wider than they are tall.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// Sentinel actor id used for console / automated actions.
///
/// Whether this actor bypasses resolution entirely is controlled by
/// [`EngineConfig::console_bypass`].
pub const CONSOLE_ACTOR: &str = "console";

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub worlds: usize,
    pub total_regions: usize,
    pub index_cells: usize,
    pub total_resolves: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Edge length of one spatial-index cell, in blocks.
    ///
    /// Too small multiplies registration entries per large region; too large
    /// degrades point queries toward a linear scan. The default covers four
    /// 16-block host chunks per cell edge.
    pub index_cell_size: i32,
    /// When true, actions attributed to [`CONSOLE_ACTOR`] skip resolution
    /// and are always allowed.
    pub console_bypass: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_cell_size: 64,
            console_bypass: true,
        }
    }
}
