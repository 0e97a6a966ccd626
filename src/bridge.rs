//! Event-bridge adapter between a host runtime and the resolution engine.
//!
//! The host's event layer (whatever shape its listener API takes) implements
//! [`MutatingAction`] for each interceptable event, then funnels every event
//! through [`EventBridge::intercept`] *before* mutating world state. The
//! engine stays runtime-agnostic: cancellation is a method on the action,
//! and the bridge never blocks or fails.

use crate::flag::FlagKey;
use crate::resolve::Decision;
use crate::store::RegionStore;
use crate::types::BlockPos;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Action contract
// ---------------------------------------------------------------------------

/// A world-mutating action the host can still cancel.
///
/// `actor_id` must be the true acting party; automated/console actions use
/// [`crate::types::CONSOLE_ACTOR`].
pub trait MutatingAction {
    fn world(&self) -> &str;
    fn position(&self) -> BlockPos;
    fn actor_id(&self) -> &str;
    fn action_kind(&self) -> FlagKey;
    /// Prevent the underlying world mutation from happening.
    fn cancel(&mut self);
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

pub struct EventBridge {
    store: Arc<RegionStore>,
}

impl EventBridge {
    pub fn new(store: Arc<RegionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        &self.store
    }

    /// Resolve the action and cancel it on a deny.
    ///
    /// Returns the decision so the caller can surface feedback to the actor.
    pub fn intercept<A: MutatingAction + ?Sized>(&self, action: &mut A) -> Decision {
        let decision = self.store.resolve(
            action.world(),
            action.position(),
            action.actor_id(),
            &action.action_kind(),
        );
        if !decision.is_allowed() {
            action.cancel();
        }
        decision
    }

    /// Human-readable line for a denied action, naming what decided it.
    /// Returns `None` for allowed decisions.
    pub fn feedback(decision: &Decision) -> Option<String> {
        if decision.is_allowed() {
            return None;
        }
        let flag = decision
            .deciding_flag
            .as_ref()
            .map_or_else(|| "action".to_string(), ToString::to_string);
        Some(match &decision.deciding_region {
            Some(region) => format!("You can't do that here: {flag} is denied by region '{region}'"),
            None => format!("You can't do that here: {flag} is denied"),
        })
    }
}
