//! Region store: owns every region, per world, together with that world's
//! spatial index.
//!
//! Mutation discipline is single-writer / multiple-reader per world. Every
//! mutating call takes the world's write lock and updates the region map and
//! the spatial index inside the same hold, so a concurrent reader never sees
//! a region that exists in one but not the other. Cross-world operations
//! never contend.

use crate::error::{RegionError, Result};
use crate::flag::{FlagKey, FlagRegistry, FlagValue};
use crate::geometry::Volume;
use crate::index::SpatialIndex;
use crate::region::{Region, RegionBounds, GLOBAL_REGION};
use crate::types::{BlockPos, EngineConfig, EngineStats};
use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Per-world state
// ---------------------------------------------------------------------------

/// One world's regions plus the index over them. Guarded by a single lock so
/// the two can only ever be observed in sync.
pub(crate) struct WorldState {
    pub(crate) global: Region,
    pub(crate) regions: HashMap<String, Region>,
    pub(crate) index: SpatialIndex,
}

impl WorldState {
    fn new(world: &str, cell_size: i32) -> Self {
        Self {
            global: Region::global(world),
            regions: HashMap::new(),
            index: SpatialIndex::new(cell_size),
        }
    }

    /// Hierarchy depth of a region (GLOBAL and roots are depth 0).
    ///
    /// The walk is bounded by the region count so a corrupted parent chain
    /// can never spin forever.
    pub(crate) fn depth_of(&self, name: &str) -> usize {
        let mut depth = 0;
        let mut current = self.regions.get(name).and_then(|r| r.parent.as_deref());
        while let Some(parent) = current {
            if depth >= self.regions.len() {
                break;
            }
            depth += 1;
            current = self.regions.get(parent).and_then(|r| r.parent.as_deref());
        }
        depth
    }

    /// Regions containing `pos`, ordered by precedence: priority descending,
    /// then hierarchy depth descending (nested before ancestors), then name
    /// ascending for determinism on exact ties. GLOBAL is always last.
    pub(crate) fn candidates_at(&self, pos: BlockPos) -> Vec<&Region> {
        let mut hits: Vec<&Region> = self
            .index
            .candidates_at(pos)
            .into_iter()
            .filter_map(|name| self.regions.get(name))
            .filter(|r| r.contains(pos))
            .collect();

        hits.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| self.depth_of(&b.name).cmp(&self.depth_of(&a.name)))
                .then_with(|| a.name.cmp(&b.name))
        });
        hits.push(&self.global);
        hits
    }

    /// True if `ancestor` appears on `name`'s parent chain (or is `name`).
    fn is_ancestor_or_self(&self, ancestor: &str, name: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(name);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            if !seen.insert(n.to_string()) {
                break; // parent chains are acyclic; bound the walk regardless
            }
            current = self.regions.get(n).and_then(|r| r.parent.as_deref());
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct RegionStore {
    pub(crate) config: EngineConfig,
    pub(crate) registry: RwLock<FlagRegistry>,
    worlds: RwLock<HashMap<String, Arc<RwLock<WorldState>>>>,
    pub(crate) resolve_count: AtomicU64,
}

impl RegionStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(FlagRegistry::with_builtins()),
            worlds: RwLock::new(HashMap::new()),
            resolve_count: AtomicU64::new(0),
        }
    }

    pub fn with_registry(config: EngineConfig, registry: FlagRegistry) -> Self {
        Self {
            config,
            registry: RwLock::new(registry),
            worlds: RwLock::new(HashMap::new()),
            resolve_count: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register an additional flag descriptor at runtime.
    pub fn register_flag(&self, descriptor: crate::flag::FlagDescriptor) {
        self.registry.write().register(descriptor);
    }

    // -----------------------------------------------------------------------
    // World handles
    // -----------------------------------------------------------------------

    pub(crate) fn world(&self, world: &str) -> Option<Arc<RwLock<WorldState>>> {
        self.worlds.read().get(world).cloned()
    }

    fn world_or_create(&self, world: &str) -> Arc<RwLock<WorldState>> {
        if let Some(state) = self.worlds.read().get(world) {
            return state.clone();
        }
        let mut worlds = self.worlds.write();
        worlds
            .entry(world.to_string())
            .or_insert_with(|| {
                Arc::new(RwLock::new(WorldState::new(
                    world,
                    self.config.index_cell_size,
                )))
            })
            .clone()
    }

    fn not_found(world: &str, name: &str) -> RegionError {
        RegionError::NotFound {
            world: world.to_string(),
            name: name.to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Create / delete
    // -----------------------------------------------------------------------

    pub fn create_region(
        &self,
        world: &str,
        name: &str,
        volume: Volume,
        priority: i32,
        owners: HashSet<String>,
    ) -> Result<()> {
        volume.validate()?;
        let state = self.world_or_create(world);
        let mut state = state.write();

        if name == GLOBAL_REGION || state.regions.contains_key(name) {
            return Err(RegionError::DuplicateName {
                world: world.to_string(),
                name: name.to_string(),
            });
        }

        let bbox = volume.bounding_box();
        let region = Region::new(world, name, volume, priority, owners);
        state.index.insert(name, &bbox);
        state.regions.insert(name.to_string(), region);

        debug!("created region '{name}' in world '{world}' (priority {priority})");
        Ok(())
    }

    /// Delete a region.
    ///
    /// With `cascade=false` the call fails with [`RegionError::HasChildren`]
    /// when any region still names this one as parent. With `cascade=true`
    /// children are reparented to the deleted region's own parent.
    pub fn delete_region(&self, world: &str, name: &str, cascade: bool) -> Result<()> {
        let state = self.world(world).ok_or_else(|| Self::not_found(world, name))?;
        let mut state = state.write();

        if !state.regions.contains_key(name) {
            return Err(Self::not_found(world, name));
        }

        let children: Vec<String> = state
            .regions
            .values()
            .filter(|r| r.parent.as_deref() == Some(name))
            .map(|r| r.name.clone())
            .collect();

        if !children.is_empty() && !cascade {
            return Err(RegionError::HasChildren {
                name: name.to_string(),
            });
        }

        let Some(removed) = state.regions.remove(name) else {
            return Err(Self::not_found(world, name));
        };
        state.index.remove(name);

        for child in &children {
            if let Some(c) = state.regions.get_mut(child) {
                c.parent = removed.parent.clone();
            }
        }

        debug!(
            "deleted region '{name}' from world '{world}' ({} children reparented)",
            children.len()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    pub fn update_volume(&self, world: &str, name: &str, volume: Volume) -> Result<()> {
        volume.validate()?;
        let state = self.world(world).ok_or_else(|| Self::not_found(world, name))?;
        let mut state = state.write();

        if !state.regions.contains_key(name) {
            return Err(Self::not_found(world, name));
        }
        let bbox = volume.bounding_box();
        // Remove + insert under the same write hold: readers either see the
        // old cells or the new ones, never a partially re-indexed region.
        state.index.reindex(name, &bbox);
        if let Some(region) = state.regions.get_mut(name) {
            region.bounds = RegionBounds::Bounded(volume);
        }
        debug!("updated volume of region '{name}' in world '{world}'");
        Ok(())
    }

    pub fn update_priority(&self, world: &str, name: &str, priority: i32) -> Result<()> {
        let state = self.world(world).ok_or_else(|| Self::not_found(world, name))?;
        let mut state = state.write();
        let region = state
            .regions
            .get_mut(name)
            .ok_or_else(|| Self::not_found(world, name))?;
        region.priority = priority;
        Ok(())
    }

    /// Re-parent a region (or clear its parent with `None`).
    ///
    /// Rejected with [`RegionError::CycleDetected`] when the proposed parent
    /// is the region itself or any of its descendants; the hierarchy is left
    /// untouched on failure.
    pub fn set_parent(&self, world: &str, name: &str, parent: Option<&str>) -> Result<()> {
        let state = self.world(world).ok_or_else(|| Self::not_found(world, name))?;
        let mut state = state.write();

        if !state.regions.contains_key(name) {
            return Err(Self::not_found(world, name));
        }
        if let Some(parent) = parent {
            if !state.regions.contains_key(parent) {
                return Err(Self::not_found(world, parent));
            }
            if state.is_ancestor_or_self(name, parent) {
                return Err(RegionError::CycleDetected {
                    name: name.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        if let Some(region) = state.regions.get_mut(name) {
            region.parent = parent.map(str::to_string);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Flags
    // -----------------------------------------------------------------------

    /// Set a flag on a region. The reserved GLOBAL name addresses the
    /// world's implicit fallback region.
    pub fn set_flag(&self, world: &str, name: &str, key: FlagKey, value: FlagValue) -> Result<()> {
        if !self.registry.read().contains(&key) {
            return Err(RegionError::UnknownFlag(key.to_string()));
        }
        let state = self.world_or_create_for(world, name)?;
        let mut state = state.write();
        let region = Self::region_mut(&mut state, world, name)?;
        region.flags.insert(key, value);
        Ok(())
    }

    /// Clear a flag back to UNSET (defer to lower-precedence sources).
    pub fn clear_flag(&self, world: &str, name: &str, key: &FlagKey) -> Result<()> {
        if !self.registry.read().contains(key) {
            return Err(RegionError::UnknownFlag(key.to_string()));
        }
        let state = self.world(world).ok_or_else(|| Self::not_found(world, name))?;
        let mut state = state.write();
        let region = Self::region_mut(&mut state, world, name)?;
        region.flags.remove(key);
        Ok(())
    }

    /// Flag edits on GLOBAL may arrive before any region exists in the
    /// world; materialise the world state in that case.
    fn world_or_create_for(&self, world: &str, name: &str) -> Result<Arc<RwLock<WorldState>>> {
        if name == GLOBAL_REGION {
            Ok(self.world_or_create(world))
        } else {
            self.world(world).ok_or_else(|| Self::not_found(world, name))
        }
    }

    fn region_mut<'a>(
        state: &'a mut WorldState,
        world: &str,
        name: &str,
    ) -> Result<&'a mut Region> {
        if name == GLOBAL_REGION {
            return Ok(&mut state.global);
        }
        state
            .regions
            .get_mut(name)
            .ok_or_else(|| Self::not_found(world, name))
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    pub fn add_owner(&self, world: &str, name: &str, actor: &str) -> Result<bool> {
        self.with_region_mut(world, name, |r| r.owners.insert(actor.to_string()))
    }

    pub fn remove_owner(&self, world: &str, name: &str, actor: &str) -> Result<bool> {
        self.with_region_mut(world, name, |r| r.owners.remove(actor))
    }

    pub fn add_member(&self, world: &str, name: &str, actor: &str) -> Result<bool> {
        self.with_region_mut(world, name, |r| r.members.insert(actor.to_string()))
    }

    pub fn remove_member(&self, world: &str, name: &str, actor: &str) -> Result<bool> {
        self.with_region_mut(world, name, |r| r.members.remove(actor))
    }

    fn with_region_mut<T>(
        &self,
        world: &str,
        name: &str,
        f: impl FnOnce(&mut Region) -> T,
    ) -> Result<T> {
        let state = self.world(world).ok_or_else(|| Self::not_found(world, name))?;
        let mut state = state.write();
        let region = Self::region_mut(&mut state, world, name)?;
        Ok(f(region))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Cloned view of a region (GLOBAL included via the reserved name).
    pub fn get_region(&self, world: &str, name: &str) -> Option<Region> {
        let state = self.world(world)?;
        let state = state.read();
        if name == GLOBAL_REGION {
            return Some(state.global.clone());
        }
        state.regions.get(name).cloned()
    }

    /// Names of all worlds that hold any region state, sorted.
    pub fn list_worlds(&self) -> Vec<String> {
        let mut names: Vec<String> = self.worlds.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of all defined regions in a world, sorted.
    pub fn list_regions(&self, world: &str) -> Vec<String> {
        let Some(state) = self.world(world) else {
            return Vec::new();
        };
        let state = state.read();
        let mut names: Vec<String> = state.regions.keys().cloned().collect();
        names.sort();
        names
    }

    /// All regions containing a point, in resolution order (GLOBAL last).
    ///
    /// Diagnostic companion to `resolve`; this is what an admin "what
    /// protects this block?" query surfaces.
    pub fn regions_at(&self, world: &str, pos: BlockPos) -> Vec<Region> {
        let Some(state) = self.world(world) else {
            return Vec::new();
        };
        let state = state.read();
        state
            .candidates_at(pos)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Regions whose volume intersects the query volume.
    pub fn regions_intersecting(&self, world: &str, volume: &Volume) -> Vec<Region> {
        let Some(state) = self.world(world) else {
            return Vec::new();
        };
        let state = state.read();
        let bbox = volume.bounding_box();
        let mut hits: Vec<Region> = state
            .index
            .candidates_in(&bbox)
            .into_iter()
            .filter_map(|name| state.regions.get(name))
            .filter(|r| match &r.bounds {
                RegionBounds::Global => true,
                RegionBounds::Bounded(v) => v.intersects(volume),
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }

    pub fn stats(&self) -> EngineStats {
        let worlds = self.worlds.read();
        let mut total_regions = 0;
        let mut index_cells = 0;
        for state in worlds.values() {
            let state = state.read();
            total_regions += state.regions.len();
            index_cells += state.index.cell_count();
        }
        EngineStats {
            worlds: worlds.len(),
            total_regions,
            index_cells,
            total_resolves: self.resolve_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for RegionStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
