//! Snapshot boundary tests: lenient loading and export shape

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};
    use world_protect::flag::{FlagKey, FlagValue, Outcome};
    use world_protect::geometry::Volume;
    use world_protect::region::GLOBAL_REGION;
    use world_protect::snapshot::{RegionRecord, Snapshot, WorldRecord};
    use world_protect::store::RegionStore;
    use world_protect::types::BlockPos;

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    fn record(name: &str, x1: i32, z1: i32, x2: i32, z2: i32) -> RegionRecord {
        RegionRecord {
            name: name.to_string(),
            volume: Volume::cuboid(p(x1, 0, z1), p(x2, 128, z2)),
            priority: 0,
            owners: HashSet::new(),
            members: HashSet::new(),
            flags: BTreeMap::new(),
            parent: None,
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn load_applies_regions_flags_and_membership() {
        let mut rec = record("town", 0, 0, 100, 100);
        rec.owners.insert("alice".to_string());
        rec.members.insert("bob".to_string());
        rec.flags
            .insert(FlagKey::from("pvp"), FlagValue::Deny);

        let mut world = WorldRecord::default();
        world
            .global_flags
            .insert(FlagKey::from("mob-spawning"), FlagValue::Deny);
        world.regions.push(rec);

        let mut snapshot = Snapshot::new();
        snapshot.insert("overworld".to_string(), world);

        let store = RegionStore::default();
        assert_eq!(store.load_snapshot(&snapshot), 1);

        let town = store.get_region("overworld", "town").unwrap();
        assert!(town.is_owner("alice"));
        assert!(town.is_member("bob"));
        assert_eq!(town.flags.get(&FlagKey::from("pvp")), Some(&FlagValue::Deny));

        let decision = store.resolve(
            "overworld",
            p(5000, 64, 5000),
            "carol",
            &FlagKey::from("mob-spawning"),
        );
        assert_eq!(decision.outcome, Outcome::Deny, "global flag loaded");
    }

    #[test]
    fn load_skips_invalid_records_and_keeps_the_rest() {
        let bad = RegionRecord {
            volume: Volume::Polygon {
                vertices: vec![(0, 0), (10, 0)], // too few vertices
                y_min: 0,
                y_max: 10,
            },
            ..record("broken", 0, 0, 0, 0)
        };

        let mut world = WorldRecord::default();
        world.regions.push(bad);
        world.regions.push(record("fine", 0, 0, 50, 50));

        let mut snapshot = Snapshot::new();
        snapshot.insert("w".to_string(), world);

        let store = RegionStore::default();
        assert_eq!(store.load_snapshot(&snapshot), 1);
        assert!(store.get_region("w", "broken").is_none());
        assert!(store.get_region("w", "fine").is_some());
    }

    #[test]
    fn load_skips_unknown_flags_but_keeps_the_region() {
        let mut rec = record("town", 0, 0, 50, 50);
        rec.flags
            .insert(FlagKey::from("not-a-flag"), FlagValue::Deny);
        rec.flags.insert(FlagKey::from("pvp"), FlagValue::Allow);

        let mut world = WorldRecord::default();
        world.regions.push(rec);
        let mut snapshot = Snapshot::new();
        snapshot.insert("w".to_string(), world);

        let store = RegionStore::default();
        assert_eq!(store.load_snapshot(&snapshot), 1);
        let town = store.get_region("w", "town").unwrap();
        assert!(!town.flags.contains_key(&FlagKey::from("not-a-flag")));
        assert!(town.flags.contains_key(&FlagKey::from("pvp")));
    }

    #[test]
    fn parents_link_regardless_of_record_order() {
        // Child listed before its parent.
        let mut child = record("child", 10, 10, 20, 20);
        child.parent = Some("parent".to_string());

        let mut world = WorldRecord::default();
        world.regions.push(child);
        world.regions.push(record("parent", 0, 0, 100, 100));

        let mut snapshot = Snapshot::new();
        snapshot.insert("w".to_string(), world);

        let store = RegionStore::default();
        store.load_snapshot(&snapshot);
        assert_eq!(
            store.get_region("w", "child").unwrap().parent.as_deref(),
            Some("parent")
        );
    }

    #[test]
    fn dangling_parent_is_dropped_not_fatal() {
        let mut rec = record("orphan", 0, 0, 10, 10);
        rec.parent = Some("ghost".to_string());

        let mut world = WorldRecord::default();
        world.regions.push(rec);
        let mut snapshot = Snapshot::new();
        snapshot.insert("w".to_string(), world);

        let store = RegionStore::default();
        assert_eq!(store.load_snapshot(&snapshot), 1);
        assert_eq!(store.get_region("w", "orphan").unwrap().parent, None);
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    #[test]
    fn export_reflects_live_state() {
        let store = RegionStore::default();
        store
            .create_region(
                "w",
                "town",
                Volume::cuboid(p(0, 0, 0), p(100, 128, 100)),
                5,
                HashSet::new(),
            )
            .unwrap();
        store.add_member("w", "town", "bob").unwrap();
        store
            .set_flag("w", "town", FlagKey::from("pvp"), FlagValue::Deny)
            .unwrap();
        store
            .set_flag("w", GLOBAL_REGION, FlagKey::from("tnt"), FlagValue::Deny)
            .unwrap();

        let snapshot = store.export_snapshot();
        let world = snapshot.get("w").unwrap();
        assert_eq!(world.regions.len(), 1);
        assert_eq!(world.regions[0].name, "town");
        assert_eq!(world.regions[0].priority, 5);
        assert!(world.regions[0].members.contains("bob"));
        assert_eq!(
            world.global_flags.get(&FlagKey::from("tnt")),
            Some(&FlagValue::Deny)
        );
    }

    #[test]
    fn export_then_load_restores_behavior() {
        let store = RegionStore::default();
        store
            .create_region(
                "w",
                "keep",
                Volume::cuboid(p(0, 0, 0), p(50, 128, 50)),
                3,
                HashSet::new(),
            )
            .unwrap();
        store
            .set_flag("w", "keep", FlagKey::from("block-place"), FlagValue::Deny)
            .unwrap();

        // Round-trip through JSON, the way a host persistence layer would.
        let json = serde_json::to_string(&store.export_snapshot()).unwrap();
        let snapshot: Snapshot = serde_json::from_str(&json).unwrap();

        let restored = RegionStore::default();
        restored.load_snapshot(&snapshot);

        let key = FlagKey::from("block-place");
        let decision = restored.resolve("w", p(25, 64, 25), "carol", &key);
        assert_eq!(decision.outcome, Outcome::Deny);
        assert_eq!(decision.deciding_region.as_deref(), Some("keep"));
    }
}
