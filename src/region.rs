//! Region entity: bounds, ownership, membership, flag table, parent key.
//!
//! Regions are owned exclusively by the store; the `parent` field is a
//! lookup key into the same world's region set, never an ownership edge, so
//! hierarchy cycles can never become memory-ownership problems.

use crate::flag::{FlagKey, FlagValue, SubjectGroup};
use crate::geometry::{BoundingBox, Volume};
use crate::types::BlockPos;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Reserved name of the implicit per-world fallback region.
pub const GLOBAL_REGION: &str = "__global__";

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Where a region applies.
///
/// `Global` is used only by the implicit per-world fallback region; it
/// covers everything and is never registered in the spatial index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionBounds {
    Global,
    Bounded(Volume),
}

impl RegionBounds {
    pub fn contains(&self, pos: BlockPos) -> bool {
        match self {
            RegionBounds::Global => true,
            RegionBounds::Bounded(v) => v.contains(pos),
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            RegionBounds::Global => None,
            RegionBounds::Bounded(v) => Some(v.bounding_box()),
        }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub world: String,
    pub bounds: RegionBounds,
    /// Higher priority wins among overlapping regions.
    pub priority: i32,
    pub owners: HashSet<String>,
    pub members: HashSet<String>,
    pub flags: HashMap<FlagKey, FlagValue>,
    /// Name of the parent region in the same world, if any.
    pub parent: Option<String>,
}

impl Region {
    pub fn new(
        world: impl Into<String>,
        name: impl Into<String>,
        volume: Volume,
        priority: i32,
        owners: HashSet<String>,
    ) -> Self {
        Self {
            name: name.into(),
            world: world.into(),
            bounds: RegionBounds::Bounded(volume),
            priority,
            owners,
            members: HashSet::new(),
            flags: HashMap::new(),
            parent: None,
        }
    }

    /// The implicit world-wide fallback region (lowest possible priority).
    pub fn global(world: impl Into<String>) -> Self {
        Self {
            name: GLOBAL_REGION.to_string(),
            world: world.into(),
            bounds: RegionBounds::Global,
            priority: i32::MIN,
            owners: HashSet::new(),
            members: HashSet::new(),
            flags: HashMap::new(),
            parent: None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.bounds, RegionBounds::Global)
    }

    pub fn is_owner(&self, actor: &str) -> bool {
        self.owners.contains(actor)
    }

    /// Owners implicitly hold member rights.
    pub fn is_member(&self, actor: &str) -> bool {
        self.members.contains(actor) || self.owners.contains(actor)
    }

    /// The actor's subject group relative to this region.
    pub fn subject_group(&self, actor: &str) -> SubjectGroup {
        if self.owners.contains(actor) {
            SubjectGroup::Owner
        } else if self.members.contains(actor) {
            SubjectGroup::Member
        } else {
            SubjectGroup::NonMember
        }
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.bounds.contains(pos)
    }
}
