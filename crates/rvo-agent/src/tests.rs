//! Unit tests for rvo-agent.

#[cfg(test)]
mod params {
    use rvo_core::Vec2;

    use crate::AgentParams;

    #[test]
    fn fluent_setters() {
        let p = AgentParams::default()
            .with_neighbor_dist(3.0)
            .with_max_neighbors(4)
            .with_time_horizon(2.0)
            .with_time_horizon_obst(1.0)
            .with_radius(0.5)
            .with_max_speed(1.5)
            .with_velocity(Vec2::new(1.0, 0.0));
        assert_eq!(p.neighbor_dist, 3.0);
        assert_eq!(p.max_neighbors, 4);
        assert_eq!(p.time_horizon, 2.0);
        assert_eq!(p.time_horizon_obst, 1.0);
        assert_eq!(p.radius, 0.5);
        assert_eq!(p.max_speed, 1.5);
        assert_eq!(p.velocity, Vec2::X);
    }

    #[test]
    fn obstacle_range() {
        let p = AgentParams::default()
            .with_time_horizon_obst(2.0)
            .with_max_speed(3.0)
            .with_radius(0.5);
        assert_eq!(p.obstacle_range(), 6.5);
    }
}

#[cfg(test)]
mod store {
    use rvo_core::{AgentId, RvoError, Vec2};

    use crate::{AgentParams, AgentStore};

    fn store_with(n: usize) -> (AgentStore, Vec<AgentId>) {
        let mut store = AgentStore::new();
        let ids = (0..n)
            .map(|i| store.insert(Vec2::new(i as f32, 0.0), &AgentParams::default()))
            .collect();
        (store, ids)
    }

    #[test]
    fn ids_are_monotonic() {
        let (_, ids) = store_with(3);
        assert_eq!(ids, vec![AgentId(0), AgentId(1), AgentId(2)]);
    }

    #[test]
    fn insert_copies_params() {
        let mut store = AgentStore::new();
        let params = AgentParams::default()
            .with_radius(0.3)
            .with_velocity(Vec2::new(0.0, 1.0));
        let id = store.insert(Vec2::new(4.0, 5.0), &params);
        let i = store.index_of(id).unwrap();
        assert_eq!(store.position[i], Vec2::new(4.0, 5.0));
        assert_eq!(store.pref_velocity[i], Vec2::ZERO);
        assert_eq!(store.params_at(i), params);
    }

    #[test]
    fn obstacle_range_matches_params() {
        let mut store = AgentStore::new();
        let params = AgentParams::default()
            .with_time_horizon_obst(4.0)
            .with_max_speed(1.5)
            .with_radius(0.25);
        store.insert(Vec2::ZERO, &params);
        assert_eq!(store.obstacle_range(0), 6.25);
        assert_eq!(store.obstacle_range(0), params.obstacle_range());
    }

    #[test]
    fn remove_swaps_last_into_slot() {
        let (mut store, ids) = store_with(4);
        assert_eq!(store.remove(ids[1]), Some(1));
        assert_eq!(store.len(), 3);
        // The last agent now occupies index 1 and its id follows it.
        assert_eq!(store.ids[1], ids[3]);
        assert_eq!(store.index_of(ids[3]), Some(1));
        assert_eq!(store.position[1], Vec2::new(3.0, 0.0));
        assert!(!store.contains(ids[1]));
    }

    #[test]
    fn remove_last_needs_no_repoint() {
        let (mut store, ids) = store_with(2);
        assert_eq!(store.remove(ids[1]), Some(1));
        assert_eq!(store.index_of(ids[0]), Some(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_unknown_is_none() {
        let (mut store, ids) = store_with(2);
        assert_eq!(store.remove(AgentId(99)), None);
        assert_eq!(store.remove(ids[0]), Some(0));
        assert_eq!(store.remove(ids[0]), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_not_reused_after_removal() {
        let (mut store, ids) = store_with(2);
        store.remove(ids[1]);
        let fresh = store.insert(Vec2::ZERO, &AgentParams::default());
        assert_eq!(fresh, AgentId(2));
    }

    #[test]
    fn try_index_reports_missing_id() {
        let (store, _) = store_with(1);
        assert_eq!(store.try_index(AgentId(5)), Err(RvoError::AgentNotFound(AgentId(5))));
    }

    #[test]
    fn interleaved_removals_keep_map_consistent() {
        let (mut store, mut live) = store_with(20);
        for k in [3usize, 0, 7, 7, 2, 10] {
            let victim = live.remove(k % live.len());
            assert!(store.remove(victim).is_some());
            live.push(store.insert(Vec2::splat(k as f32), &AgentParams::default()));
        }
        assert_eq!(store.len(), live.len());
        for &id in &live {
            let i = store.index_of(id).expect("live id must resolve");
            assert_eq!(store.ids[i], id);
        }
    }

    #[test]
    fn clear_empties_every_column() {
        let (mut store, ids) = store_with(5);
        store.clear();
        assert!(store.is_empty());
        assert!(store.position.is_empty());
        assert!(store.time_horizon_obst.is_empty());
        assert!(!store.contains(ids[0]));
        store.shrink_to_fit();
        assert!(store.is_empty());
    }
}
