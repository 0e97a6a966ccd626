//! Error taxonomy for the region store and admin surface.
//!
//! Every variant is a local, recoverable condition reported back to the
//! caller (typically an admin command layer). The resolution hot path never
//! returns these; `resolve` degrades instead of failing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Degenerate or self-intersecting geometry rejected at construction.
    #[error("invalid volume: {0}")]
    InvalidVolume(String),

    /// A region with this name already exists in the world.
    #[error("region '{name}' already exists in world '{world}'")]
    DuplicateName { world: String, name: String },

    /// No region with this name in the world.
    #[error("region '{name}' not found in world '{world}'")]
    NotFound { world: String, name: String },

    /// Parent assignment would make the hierarchy cyclic.
    #[error("setting parent of '{name}' to '{parent}' would create a cycle")]
    CycleDetected { name: String, parent: String },

    /// Non-cascading delete blocked because children reference this region.
    #[error("region '{name}' has child regions (delete with cascade to reparent them)")]
    HasChildren { name: String },

    /// Flag key is not registered in the flag registry.
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
}

pub type Result<T> = std::result::Result<T, RegionError>;
