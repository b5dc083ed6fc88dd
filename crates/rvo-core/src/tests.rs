//! Unit tests for rvo-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, IdMap, ObstacleId, VertexId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(VertexId(100) > VertexId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(ObstacleId::INVALID.0, u32::MAX);
        assert_eq!(VertexId::default(), VertexId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(ObstacleId(3).to_string(), "ObstacleId(3)");
    }

    #[test]
    fn id_map_keys() {
        let mut map: IdMap<AgentId, usize> = IdMap::default();
        map.insert(AgentId(5), 0);
        map.insert(AgentId(9), 1);
        assert_eq!(map.get(&AgentId(9)), Some(&1));
        assert!(map.get(&AgentId(6)).is_none());
    }
}

#[cfg(test)]
mod geo {
    use approx::assert_relative_eq;

    use crate::{Vec2, det, dist_sq_point_segment, left_of};

    #[test]
    fn det_is_cross_product() {
        assert_eq!(det(Vec2::X, Vec2::Y), 1.0);
        assert_eq!(det(Vec2::Y, Vec2::X), -1.0);
        assert_eq!(det(Vec2::new(2.0, 4.0), Vec2::new(1.0, 2.0)), 0.0);
    }

    #[test]
    fn left_of_sign() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!(left_of(a, b, Vec2::new(0.5, 1.0)) > 0.0);
        assert!(left_of(a, b, Vec2::new(0.5, -1.0)) < 0.0);
        assert_eq!(left_of(a, b, Vec2::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn segment_distance_regions() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(2.0, 0.0);
        // Before a, beside the segment, past b.
        assert_relative_eq!(dist_sq_point_segment(a, b, Vec2::new(-1.0, 0.0)), 1.0);
        assert_relative_eq!(dist_sq_point_segment(a, b, Vec2::new(1.0, 3.0)), 9.0);
        assert_relative_eq!(dist_sq_point_segment(a, b, Vec2::new(3.0, 1.0)), 2.0);
    }

    #[test]
    fn degenerate_segment_is_point() {
        let p = Vec2::new(1.0, 1.0);
        assert_relative_eq!(dist_sq_point_segment(p, p, Vec2::new(4.0, 5.0)), 25.0);
    }
}

#[cfg(test)]
mod time {
    use approx::assert_relative_eq;

    use crate::SimClock;

    #[test]
    fn advance_accumulates_effective_step() {
        let mut clock = SimClock::new(0.5);
        clock.time_scale = 2.0;
        assert_relative_eq!(clock.advance(), 1.0);
        clock.advance();
        assert_relative_eq!(clock.global_time, 2.0);
        assert_eq!(clock.steps, 2);
    }

    #[test]
    fn zero_scale_pauses() {
        let mut clock = SimClock::new(0.1);
        clock.time_scale = 0.0;
        clock.advance();
        assert_eq!(clock.global_time, 0.0);
        assert_eq!(clock.steps, 1);
    }

    #[test]
    fn reset_keeps_configuration() {
        let mut clock = SimClock::new(0.1);
        clock.time_scale = 3.0;
        clock.advance();
        clock.reset();
        assert_eq!(clock.global_time, 0.0);
        assert_eq!(clock.steps, 0);
        assert_eq!(clock.time_step, 0.1);
        assert_eq!(clock.time_scale, 3.0);
    }

    #[test]
    fn display() {
        let clock = SimClock::new(0.25);
        assert_eq!(clock.to_string(), "step 0 (t = 0.000 s, dt = 0.250 s)");
    }
}
