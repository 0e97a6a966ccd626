//! World Protect: region & flag resolution engine
//!
//! Protects spatial regions of a shared virtual world from unauthorized
//! modification: operators define named regions, assign owners and members,
//! attach behavioral flags, and the engine answers, per world-mutating
//! action, whether the acting party is permitted.
//!
//! ## Architecture
//!
//! ```text
//! EventBridge  (bridge.rs)   ← host events in, cancellations out
//!   └── RegionStore  (store.rs + resolve.rs)  ← per-world state, decisions
//!         ├── SpatialIndex  (index.rs)        ← grid cell → candidate regions
//!         ├── Region        (region.rs)       ← ownership, flags, hierarchy
//!         │     └── Volume  (geometry.rs)     ← exact containment tests
//!         └── FlagRegistry  (flag.rs)         ← action kinds & defaults
//! ```
//!
//! Reads (`resolve`, `get_region`, …) take a per-world read lock and never
//! block each other; mutations hold that world's write lock so the region
//! map and the spatial index are always observed in sync. The snapshot
//! module (`snapshot.rs`) is the persistence boundary; the host owns the
//! file format.

pub mod bridge;
pub mod error;
pub mod flag;
pub mod geometry;
pub mod index;
pub mod region;
pub mod resolve;
pub mod snapshot;
pub mod store;
pub mod types;

// Convenience re-exports
pub use bridge::{EventBridge, MutatingAction};
pub use error::RegionError;
pub use flag::{FlagDescriptor, FlagKey, FlagRegistry, FlagValue, Outcome, SubjectGroup};
pub use geometry::{BoundingBox, Volume};
pub use region::{Region, RegionBounds, GLOBAL_REGION};
pub use resolve::Decision;
pub use snapshot::{RegionRecord, Snapshot, WorldRecord};
pub use store::RegionStore;
pub use types::{BlockPos, CellCoord, EngineConfig, EngineStats, CONSOLE_ACTOR};
