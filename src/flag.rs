//! Flag keys, values, and the runtime flag registry.
//!
//! New action kinds are added by registering a [`FlagDescriptor`]; the
//! resolution algorithm never matches on concrete flag names, so no core
//! logic changes when a host introduces a new protected action.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Name of a protected action kind ("block-break", "pvp", …).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagKey(String);

impl FlagKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FlagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlagKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Allow/deny outcome of a resolved query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allow,
    Deny,
}

/// The actor's relationship to a region, ordered from closest to furthest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectGroup {
    Owner,
    Member,
    NonMember,
}

/// An explicit flag setting on a region.
///
/// UNSET ("defer to the next lower-precedence source") is expressed by the
/// flag being absent from the region's table; `clear_flag` restores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagValue {
    Allow,
    Deny,
    /// Allow actors in this group or closer, deny everyone further out
    /// (`Group(Member)` is the classic "members-only").
    Group(SubjectGroup),
}

impl FlagValue {
    /// Collapse to an outcome for a specific actor group.
    pub fn outcome_for(&self, group: SubjectGroup) -> Outcome {
        match self {
            FlagValue::Allow => Outcome::Allow,
            FlagValue::Deny => Outcome::Deny,
            FlagValue::Group(required) => {
                if group <= *required {
                    Outcome::Allow
                } else {
                    Outcome::Deny
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Registered metadata for one flag key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDescriptor {
    pub key: FlagKey,
    pub description: String,
    /// When true, the flag applies even to region owners (no owner bypass).
    pub owner_enforced: bool,
    /// Default when the point is inside at least one defined region but no
    /// region sets the flag explicitly.
    pub default_inside: Outcome,
    /// Default when the point is outside every defined region.
    pub default_outside: Outcome,
}

impl FlagDescriptor {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: FlagKey::new(key),
            description: description.into(),
            owner_enforced: false,
            default_inside: Outcome::Allow,
            default_outside: Outcome::Allow,
        }
    }

    pub fn owner_enforced(mut self) -> Self {
        self.owner_enforced = true;
        self
    }

    pub fn deny_inside(mut self) -> Self {
        self.default_inside = Outcome::Deny;
        self
    }

    pub fn deny_outside(mut self) -> Self {
        self.default_outside = Outcome::Deny;
        self
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Runtime mapping from flag key to descriptor.
///
/// Seeded with the built-in protection flags; hosts register additional
/// descriptors before wiring up their event bridge.
#[derive(Debug, Clone)]
pub struct FlagRegistry {
    descriptors: HashMap<FlagKey, FlagDescriptor>,
}

impl FlagRegistry {
    /// Empty registry with no flags at all (mostly useful in tests).
    pub fn empty() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the built-in flag set.
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        for d in builtin_flags() {
            reg.register(d);
        }
        reg
    }

    /// Register or replace a descriptor.
    pub fn register(&mut self, descriptor: FlagDescriptor) {
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    pub fn get(&self, key: &FlagKey) -> Option<&FlagDescriptor> {
        self.descriptors.get(key)
    }

    pub fn contains(&self, key: &FlagKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// All registered keys, sorted for deterministic listings.
    pub fn keys(&self) -> Vec<FlagKey> {
        let mut keys: Vec<_> = self.descriptors.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for FlagRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Built-in protection flags.
///
/// Destructive actions default to DENY inside defined regions; passive ones
/// default to ALLOW. Everything defaults to ALLOW in unclaimed wilderness.
fn builtin_flags() -> Vec<FlagDescriptor> {
    vec![
        FlagDescriptor::new("block-break", "Controls block breaking").deny_inside(),
        FlagDescriptor::new("block-place", "Controls block placing").deny_inside(),
        FlagDescriptor::new("container-access", "Controls access to containers").deny_inside(),
        FlagDescriptor::new("use", "Controls use of doors, buttons, levers, etc."),
        FlagDescriptor::new("interact", "Controls generic entity interaction"),
        FlagDescriptor::new("pvp", "Controls player vs player combat"),
        FlagDescriptor::new("entity-damage", "Controls damage dealt to entities"),
        FlagDescriptor::new("mob-spawning", "Controls mob spawning"),
        FlagDescriptor::new("fire-spread", "Controls fire spread").deny_inside(),
        FlagDescriptor::new("tnt", "Controls TNT explosions").deny_inside(),
        FlagDescriptor::new("item-drop", "Controls item dropping"),
        FlagDescriptor::new("item-pickup", "Controls item pickup"),
        FlagDescriptor::new("teleport-in", "Controls teleportation into a region"),
        FlagDescriptor::new("teleport-out", "Controls teleportation out of a region"),
        FlagDescriptor::new("entry", "Controls entry into a region"),
        FlagDescriptor::new("leave", "Controls exit from a region"),
        // Applies even to owners: protects region definitions themselves.
        FlagDescriptor::new("region-delete", "Protects a region from deletion")
            .owner_enforced(),
    ]
}
