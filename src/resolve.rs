//! Flag resolution: turn (world, point, actor, action) into a decision.
//!
//! The hot path. Called once per intercepted world-mutating action, so it
//! takes only a read lock on the world and never allocates beyond the
//! candidate list. By contract it cannot fail: anything unexpected degrades
//! to a default outcome rather than propagating an error into the host's
//! event-dispatch loop.

use crate::flag::{FlagKey, Outcome};
use crate::region::Region;
use crate::store::RegionStore;
use crate::types::{BlockPos, CONSOLE_ACTOR};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of one resolution, with the region/flag that decided it for
/// diagnostics and admin feedback. Transient: recomputed per query, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub outcome: Outcome,
    pub deciding_region: Option<String>,
    pub deciding_flag: Option<FlagKey>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            outcome: Outcome::Allow,
            deciding_region: None,
            deciding_flag: None,
        }
    }

    fn decided(outcome: Outcome, region: &Region, flag: &FlagKey) -> Self {
        Self {
            outcome,
            deciding_region: Some(region.name.clone()),
            deciding_flag: Some(flag.clone()),
        }
    }

    fn fallback(outcome: Outcome, flag: &FlagKey) -> Self {
        Self {
            outcome,
            deciding_region: None,
            deciding_flag: Some(flag.clone()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.outcome == Outcome::Allow
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl RegionStore {
    /// Resolve whether `actor` may perform `action` at `pos` in `world`.
    ///
    /// Candidate regions are walked in precedence order (priority desc,
    /// depth desc, name asc, GLOBAL last); the first explicit flag value
    /// wins. Owners of a candidate region see ALLOW for its explicit value
    /// unless the flag is owner-enforced. With no explicit value anywhere,
    /// the flag's per-action default applies: `default_inside` when at least
    /// one defined region contains the point, `default_outside` otherwise.
    pub fn resolve(&self, world: &str, pos: BlockPos, actor: &str, action: &FlagKey) -> Decision {
        self.resolve_count.fetch_add(1, Ordering::Relaxed);

        if self.config.console_bypass && actor == CONSOLE_ACTOR {
            return Decision::allow();
        }

        let registry = self.registry.read();
        let Some(descriptor) = registry.get(action) else {
            // Unregistered action kind: degrade to allow rather than fail
            // inside the event-dispatch path.
            warn!("resolve called with unregistered flag '{action}'; allowing");
            return Decision::allow();
        };

        let Some(state) = self.world(world) else {
            return Decision::fallback(descriptor.default_outside, action);
        };
        let state = state.read();

        let candidates = state.candidates_at(pos);
        // GLOBAL is always appended, so any extra candidate means the point
        // is inside at least one defined region.
        let inside_any = candidates.len() > 1;

        for region in candidates.iter().copied() {
            let Some(value) = region.flags.get(action) else {
                continue; // UNSET: defer to the next candidate
            };
            if !descriptor.owner_enforced && region.is_owner(actor) {
                return Decision::decided(Outcome::Allow, region, action);
            }
            let outcome = value.outcome_for(region.subject_group(actor));
            return Decision::decided(outcome, region, action);
        }

        // No explicit value anywhere: per-action default. A default DENY
        // inside regions is member-scoped: members (and owners) of a
        // containing region are not locked out of it by mere defaults.
        if inside_any && descriptor.default_inside == Outcome::Deny {
            if let Some(home) = candidates
                .iter()
                .copied()
                .find(|r| !r.is_global() && r.is_member(actor))
            {
                return Decision::decided(Outcome::Allow, home, action);
            }
        }

        let outcome = if inside_any {
            descriptor.default_inside
        } else {
            descriptor.default_outside
        };
        Decision::fallback(outcome, action)
    }
}
