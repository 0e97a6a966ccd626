//! Event bridge tests: intercept and cancellation behavior

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use world_protect::bridge::{EventBridge, MutatingAction};
    use world_protect::flag::{FlagKey, FlagValue};
    use world_protect::geometry::Volume;
    use world_protect::store::RegionStore;
    use world_protect::types::{BlockPos, CONSOLE_ACTOR};

    /// Minimal stand-in for a host runtime event.
    struct BreakEvent {
        world: String,
        pos: BlockPos,
        actor: String,
        cancelled: bool,
    }

    impl BreakEvent {
        fn new(world: &str, pos: BlockPos, actor: &str) -> Self {
            Self {
                world: world.to_string(),
                pos,
                actor: actor.to_string(),
                cancelled: false,
            }
        }
    }

    impl MutatingAction for BreakEvent {
        fn world(&self) -> &str {
            &self.world
        }

        fn position(&self) -> BlockPos {
            self.pos
        }

        fn actor_id(&self) -> &str {
            &self.actor
        }

        fn action_kind(&self) -> FlagKey {
            FlagKey::from("block-break")
        }

        fn cancel(&mut self) {
            self.cancelled = true;
        }
    }

    fn protected_store() -> Arc<RegionStore> {
        let store = Arc::new(RegionStore::default());
        let mut owners = HashSet::new();
        owners.insert("alice".to_string());
        store
            .create_region(
                "w",
                "keep",
                Volume::cuboid(BlockPos::new(0, 0, 0), BlockPos::new(50, 128, 50)),
                0,
                owners,
            )
            .unwrap();
        store
            .set_flag("w", "keep", FlagKey::from("block-break"), FlagValue::Deny)
            .unwrap();
        store
    }

    // -----------------------------------------------------------------------
    // Cancellation
    // -----------------------------------------------------------------------

    #[test]
    fn denied_action_is_cancelled() {
        let bridge = EventBridge::new(protected_store());
        let mut event = BreakEvent::new("w", BlockPos::new(25, 64, 25), "mallory");

        let decision = bridge.intercept(&mut event);
        assert!(!decision.is_allowed());
        assert!(event.cancelled);
    }

    #[test]
    fn allowed_action_is_untouched() {
        let bridge = EventBridge::new(protected_store());
        // Owner bypasses the deny; outside point is wilderness.
        let mut owner_event = BreakEvent::new("w", BlockPos::new(25, 64, 25), "alice");
        assert!(bridge.intercept(&mut owner_event).is_allowed());
        assert!(!owner_event.cancelled);

        let mut outside = BreakEvent::new("w", BlockPos::new(500, 64, 500), "mallory");
        assert!(bridge.intercept(&mut outside).is_allowed());
        assert!(!outside.cancelled);
    }

    #[test]
    fn console_actions_pass_through() {
        let bridge = EventBridge::new(protected_store());
        let mut event = BreakEvent::new("w", BlockPos::new(25, 64, 25), CONSOLE_ACTOR);
        assert!(bridge.intercept(&mut event).is_allowed());
        assert!(!event.cancelled);
    }

    // -----------------------------------------------------------------------
    // Feedback
    // -----------------------------------------------------------------------

    #[test]
    fn deny_feedback_names_region_and_flag() {
        let bridge = EventBridge::new(protected_store());
        let mut event = BreakEvent::new("w", BlockPos::new(25, 64, 25), "mallory");
        let decision = bridge.intercept(&mut event);

        let msg = EventBridge::feedback(&decision).unwrap();
        assert!(msg.contains("keep"), "message should name the region: {msg}");
        assert!(msg.contains("block-break"), "message should name the flag: {msg}");
    }

    #[test]
    fn allow_produces_no_feedback() {
        let bridge = EventBridge::new(protected_store());
        let mut event = BreakEvent::new("w", BlockPos::new(500, 64, 500), "mallory");
        let decision = bridge.intercept(&mut event);
        assert_eq!(EventBridge::feedback(&decision), None);
    }
}
