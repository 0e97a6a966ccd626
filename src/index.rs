//! Spatial index: a uniform grid over the horizontal plane.
//!
//! A region is registered into every cell its bounding box overlaps; a point
//! query scans exactly one cell and a volume query scans the cell range the
//! query box touches. Candidates are coarse (bounding-box level); callers
//! apply the precise geometry test to drop false positives.
//!
//! The index is always mutated while the owning world's write lock is held
//! (see the store), so readers never observe a half-applied re-index.

use crate::geometry::BoundingBox;
use crate::types::{BlockPos, CellCoord};
use std::collections::{HashMap, HashSet};

pub struct SpatialIndex {
    cell_size: i32,
    cells: HashMap<CellCoord, HashSet<String>>,
    /// Reverse map so removal never has to recompute a region's cell span
    /// from possibly-already-updated geometry.
    registered: HashMap<String, Vec<CellCoord>>,
}

impl SpatialIndex {
    pub fn new(cell_size: i32) -> Self {
        debug_assert!(cell_size > 0);
        Self {
            cell_size,
            cells: HashMap::new(),
            registered: HashMap::new(),
        }
    }

    fn cell_of(&self, x: i32, z: i32) -> CellCoord {
        CellCoord::new(x.div_euclid(self.cell_size), z.div_euclid(self.cell_size))
    }

    fn cells_for(&self, bbox: &BoundingBox) -> Vec<CellCoord> {
        let lo = self.cell_of(bbox.min.x, bbox.min.z);
        let hi = self.cell_of(bbox.max.x, bbox.max.z);
        let mut out = Vec::with_capacity(
            ((hi.x - lo.x + 1) as usize).saturating_mul((hi.z - lo.z + 1) as usize),
        );
        for cx in lo.x..=hi.x {
            for cz in lo.z..=hi.z {
                out.push(CellCoord::new(cx, cz));
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Register a region under every cell its bounding box overlaps.
    pub fn insert(&mut self, name: &str, bbox: &BoundingBox) {
        let span = self.cells_for(bbox);
        for cell in &span {
            self.cells
                .entry(*cell)
                .or_default()
                .insert(name.to_string());
        }
        self.registered.insert(name.to_string(), span);
    }

    /// Remove a region from all cells it was registered in.
    pub fn remove(&mut self, name: &str) {
        let Some(span) = self.registered.remove(name) else {
            return;
        };
        for cell in span {
            if let Some(set) = self.cells.get_mut(&cell) {
                set.remove(name);
                if set.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// Re-register a region after its geometry changed.
    pub fn reindex(&mut self, name: &str, bbox: &BoundingBox) {
        self.remove(name);
        self.insert(name, bbox);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Names of regions whose bounding box might contain `pos`.
    pub fn candidates_at(&self, pos: BlockPos) -> Vec<&str> {
        match self.cells.get(&self.cell_of(pos.x, pos.z)) {
            Some(set) => set.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Deduplicated names of regions whose bounding box might overlap `bbox`.
    pub fn candidates_in(&self, bbox: &BoundingBox) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        for cell in self.cells_for(bbox) {
            if let Some(set) = self.cells.get(&cell) {
                for name in set {
                    seen.insert(name.as_str());
                }
            }
        }
        seen.into_iter().collect()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn region_count(&self) -> usize {
        self.registered.len()
    }
}
