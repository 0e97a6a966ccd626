//! Persistence boundary: serde-shaped snapshot records.
//!
//! The engine never touches files. A host collaborator deserialises its
//! chosen format (YAML, JSON, a database row…) into [`Snapshot`] and bulk
//! loads it at startup; saving walks the store back into the same shape.
//! Loading is lenient by contract: an invalid record is skipped with a
//! logged warning, never an aborted load.

use crate::flag::{FlagKey, FlagValue};
use crate::geometry::Volume;
use crate::region::GLOBAL_REGION;
use crate::store::RegionStore;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One persisted region. `parent` is a name key resolved after all records
/// of the world have been created, so record order never matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRecord {
    pub name: String,
    pub volume: Volume,
    pub priority: i32,
    #[serde(default)]
    pub owners: HashSet<String>,
    #[serde(default)]
    pub members: HashSet<String>,
    #[serde(default)]
    pub flags: BTreeMap<FlagKey, FlagValue>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// One world's persisted state: the implicit GLOBAL region's flag table
/// plus every defined region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldRecord {
    #[serde(default)]
    pub global_flags: BTreeMap<FlagKey, FlagValue>,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
}

/// Full engine snapshot, keyed by world name.
pub type Snapshot = BTreeMap<String, WorldRecord>;

// ---------------------------------------------------------------------------
// Load / export
// ---------------------------------------------------------------------------

impl RegionStore {
    /// Bulk-load a snapshot, typically at startup.
    ///
    /// Returns the number of regions actually created. Records with invalid
    /// geometry, duplicate names, unknown flags, or unresolvable parents are
    /// skipped (per field where possible) with a warning.
    pub fn load_snapshot(&self, snapshot: &Snapshot) -> usize {
        let mut loaded = 0;

        for (world, record) in snapshot {
            for (key, value) in &record.global_flags {
                if let Err(e) = self.set_flag(world, GLOBAL_REGION, key.clone(), *value) {
                    warn!("snapshot: skipping global flag '{key}' in world '{world}': {e}");
                }
            }

            for region in &record.regions {
                match self.create_region(
                    world,
                    &region.name,
                    region.volume.clone(),
                    region.priority,
                    region.owners.clone(),
                ) {
                    Ok(()) => loaded += 1,
                    Err(e) => {
                        warn!(
                            "snapshot: skipping region '{}' in world '{world}': {e}",
                            region.name
                        );
                        continue;
                    }
                }
                for member in &region.members {
                    let _ = self.add_member(world, &region.name, member);
                }
                for (key, value) in &region.flags {
                    if let Err(e) = self.set_flag(world, &region.name, key.clone(), *value) {
                        warn!(
                            "snapshot: skipping flag '{key}' on region '{}': {e}",
                            region.name
                        );
                    }
                }
            }

            // Second pass: link parents once every sibling exists.
            for region in &record.regions {
                let Some(parent) = &region.parent else {
                    continue;
                };
                if let Err(e) = self.set_parent(world, &region.name, Some(parent)) {
                    warn!(
                        "snapshot: dropping parent '{parent}' of region '{}': {e}",
                        region.name
                    );
                }
            }
        }

        loaded
    }

    /// Produce a snapshot of the current state, suitable for saving.
    pub fn export_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();

        for world in self.list_worlds() {
            let mut record = WorldRecord::default();

            if let Some(global) = self.get_region(&world, GLOBAL_REGION) {
                record.global_flags = global.flags.into_iter().collect();
            }

            for name in self.list_regions(&world) {
                let Some(region) = self.get_region(&world, &name) else {
                    continue;
                };
                let crate::region::RegionBounds::Bounded(volume) = region.bounds else {
                    continue;
                };
                record.regions.push(RegionRecord {
                    name: region.name,
                    volume,
                    priority: region.priority,
                    owners: region.owners,
                    members: region.members,
                    flags: region.flags.into_iter().collect(),
                    parent: region.parent,
                });
            }

            snapshot.insert(world, record);
        }

        snapshot
    }
}
