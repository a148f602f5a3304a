//! Unit tests for lc-graph.
//!
//! Every test runs against a fixed side table in which all lanes meet at
//! node 5.

#[cfg(test)]
mod helpers {
    use std::collections::HashMap;

    use lc_core::{LaneId, LaneSides, NodeId};

    pub const NODE: NodeId = NodeId(5);

    /// `(lane, node) → start_node` lookup.
    #[derive(Default)]
    pub struct Sides(pub HashMap<(LaneId, NodeId), bool>);

    impl Sides {
        pub fn with(mut self, lane: u32, start_node: bool) -> Self {
            self.0.insert((LaneId(lane), NODE), start_node);
            self
        }
    }

    impl LaneSides for Sides {
        fn start_node_at(&self, lane: LaneId, node: NodeId) -> Option<bool> {
            self.0.get(&(lane, node)).copied()
        }
    }

    /// Lanes 10, 30 start at node 5; 20, 40 end there.
    pub fn sides() -> Sides {
        Sides::default()
            .with(10, true)
            .with(20, false)
            .with(30, true)
            .with(40, false)
    }
}

// ── Connect / disconnect ──────────────────────────────────────────────────────

#[cfg(test)]
mod connect {
    use lc_core::{LaneConnectionData, LaneEnd, LaneId, NodeId};

    use super::helpers::{sides, NODE};
    use crate::ConnectionDataBase;

    const A: LaneId = LaneId(10);
    const B: LaneId = LaneId(20);
    const C: LaneId = LaneId(30);

    #[test]
    fn starts_empty() {
        let db = ConnectionDataBase::new();
        assert!(db.is_empty());
        assert_eq!(db.edge_count(), 0);
        assert!(db.connections(A, true).is_empty());
        assert!(!db.is_connected_to(A, B, true));
    }

    #[test]
    fn connect_stores_forward_and_hint() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        assert!(db.connect_to(A, B, NODE, &s));

        assert!(db.is_connected_to(A, B, true));
        assert!(!db.is_connected_to(B, A, false));
        assert_eq!(db.edge(LaneEnd::new(B, false), A), Some(LaneConnectionData::new(A, false)));
        assert_eq!(db.len(), 2);
        assert_eq!(db.edge_count(), 2);
    }

    #[test]
    fn connect_is_idempotent() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        assert!(db.connect_to(A, B, NODE, &s));
        assert!(!db.connect_to(A, B, NODE, &s));
        assert_eq!(db.edge_count(), 2);
    }

    #[test]
    fn wrong_side_query_is_false() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        assert!(!db.is_connected_to(A, B, false));
    }

    #[test]
    fn unknown_node_is_ignored() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        assert!(!db.connect_to(A, B, NodeId(99), &s));
        assert!(!db.connect_to(A, LaneId(77), NODE, &s));
        assert!(db.is_empty());
    }

    #[test]
    fn bidirectional_then_disconnect_leaves_hint() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        assert!(db.connect_to(A, B, NODE, &s));
        assert!(db.is_connected_to(A, B, true));
        assert!(db.connect_to(B, A, NODE, &s));
        assert!(db.is_connected_to(B, A, false));

        assert!(db.disconnect(A, B, NODE, &s));
        assert!(!db.is_connected_to(A, B, true));
        assert!(db.is_connected_to(B, A, false));
        assert_eq!(db.edge(LaneEnd::new(A, true), B), Some(LaneConnectionData::new(B, false)));
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn disconnect_unidirectional_removes_both_entries() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        assert!(db.disconnect(A, B, NODE, &s));
        assert!(db.is_empty());
    }

    #[test]
    fn disconnect_both_directions_empties_graph() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        db.connect_to(B, A, NODE, &s);
        assert!(db.disconnect(A, B, NODE, &s));
        assert!(db.disconnect(B, A, NODE, &s));
        assert!(db.is_empty());
    }

    #[test]
    fn disconnect_missing_edge_is_false() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        assert!(!db.disconnect(A, B, NODE, &s));
        db.connect_to(A, B, NODE, &s);
        // B → A is only a hint.
        assert!(!db.disconnect(B, A, NODE, &s));
    }

    #[test]
    fn reconnect_after_hint_restores_edge() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        db.connect_to(B, A, NODE, &s);
        db.disconnect(A, B, NODE, &s);
        assert!(db.connect_to(A, B, NODE, &s));
        assert!(db.is_connected_to(A, B, true));
        assert_eq!(db.edge_count(), 2);
    }

    #[test]
    fn fan_out_spills_past_inline_capacity() {
        let mut s = sides();
        for lane in 100..110 {
            s = s.with(lane, false);
        }
        let mut db = ConnectionDataBase::new();
        for lane in 100..110 {
            assert!(db.connect_to(A, LaneId(lane), NODE, &s));
        }
        assert_eq!(db.connections(A, true).len(), 10);
        assert_eq!(db.enabled_targets(A, true).count(), 10);
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn enabled_targets_skip_hints() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        db.connect_to(C, A, NODE, &s);
        assert_eq!(db.enabled_targets(A, true).collect::<Vec<_>>(), vec![B]);
        assert!(db.has_outgoing(A, true));
        assert!(!db.has_outgoing(B, false));
    }
}

// ── Dead-ends ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dead_end {
    use lc_core::{LaneConnectionData, LaneEnd, LaneId};

    use super::helpers::{sides, NODE};
    use crate::ConnectionDataBase;

    const A: LaneId = LaneId(10);
    const B: LaneId = LaneId(20);
    const C: LaneId = LaneId(40);

    #[test]
    fn dead_end_replaces_existing_edges() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        db.connect_to(A, C, NODE, &s);
        assert!(db.connect_to(A, A, NODE, &s));

        assert!(db.is_dead_end(A, true));
        assert_eq!(db.connections(A, true), &[LaneConnectionData::new(A, true)]);
        // The hints backing A → B and A → C went with them.
        assert!(db.connections(B, false).is_empty());
        assert!(db.connections(C, false).is_empty());
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn dead_end_keeps_incoming_edges() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(B, A, NODE, &s);
        db.connect_to(A, A, NODE, &s);
        assert!(db.is_dead_end(A, true));
        assert!(db.is_connected_to(B, A, false));
        assert_eq!(db.dead_end_sources(A, true), &[B]);
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn connecting_out_clears_dead_end() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, A, NODE, &s);
        assert!(db.connect_to(A, B, NODE, &s));
        assert!(!db.is_dead_end(A, true));
        assert_eq!(db.connections(A, true), &[LaneConnectionData::new(B, true)]);
    }

    #[test]
    fn connecting_into_dead_end_keeps_it_exclusive() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(B, B, NODE, &s);
        assert!(db.connect_to(A, B, NODE, &s));
        assert!(db.is_connected_to(A, B, true));
        assert!(db.is_dead_end(B, false));
        assert_eq!(db.connections(B, false).len(), 1);
        assert_eq!(db.dead_end_sources(B, false), &[A]);
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn dead_end_lists_existing_incoming_edges() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        db.connect_to(B, A, NODE, &s);
        db.connect_to(C, A, NODE, &s);
        db.connect_to(A, A, NODE, &s);

        let mut sources = db.dead_end_sources(A, true).to_vec();
        sources.sort_unstable();
        assert_eq!(sources, vec![B, C]);
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn clearing_dead_end_restores_hints() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(B, A, NODE, &s);
        db.connect_to(A, A, NODE, &s);
        assert!(db.disconnect(A, A, NODE, &s));

        assert!(db.dead_end_sources(A, true).is_empty());
        assert_eq!(db.connections(A, true), &[LaneConnectionData::new(B, false)]);
        assert!(db.is_connected_to(B, A, false));
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn connecting_out_of_dead_end_with_incoming_makes_pair() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(B, A, NODE, &s);
        db.connect_to(A, A, NODE, &s);
        assert!(db.connect_to(A, B, NODE, &s));

        assert_eq!(db.connections(A, true), &[LaneConnectionData::new(B, true)]);
        assert!(db.is_connected_to(B, A, false));
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn disconnecting_into_dead_end_forgets_source() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, A, NODE, &s);
        db.connect_to(B, A, NODE, &s);
        assert!(db.disconnect(B, A, NODE, &s));

        assert!(db.dead_end_sources(A, true).is_empty());
        assert!(db.is_dead_end(A, true));
        assert!(!db.contains_lane_end(LaneEnd::new(B, false)));
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn removing_dead_end_lane_takes_incoming_edges() {
        // Incoming edge first, dead-end second.
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(B, A, NODE, &s);
        db.connect_to(A, A, NODE, &s);

        let t = db.remove_connections(A);
        assert_eq!(t.partners.as_slice(), &[LaneEnd::new(B, false)]);
        assert!(db.is_empty());
        assert_eq!(db.debug_dump(), "");
    }

    #[test]
    fn removing_dead_end_lane_end_takes_incoming_edges() {
        // Dead-end first, incoming edge second.
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, A, NODE, &s);
        db.connect_to(B, A, NODE, &s);

        let t = db.remove_lane_end(A, true, NODE, &s);
        assert_eq!(t.outgoing, 1);
        assert_eq!(t.partners.as_slice(), &[LaneEnd::new(B, false)]);
        assert!(!db.is_connected_to(B, A, false));
        assert!(db.is_empty());
    }

    #[test]
    fn removing_source_of_dead_end_cleans_side_table() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, A, NODE, &s);
        db.connect_to(B, A, NODE, &s);

        let t = db.remove_connections(B);
        assert!(t.partners.is_empty());
        assert!(db.dead_end_sources(A, true).is_empty());
        assert!(db.is_dead_end(A, true));
        assert!(db.invariant_violations().is_empty());
    }

    #[test]
    fn dead_end_twice_is_noop() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        assert!(db.connect_to(A, A, NODE, &s));
        assert!(!db.connect_to(A, A, NODE, &s));
        assert_eq!(db.edge_count(), 1);
    }

    #[test]
    fn disconnect_dead_end() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, A, NODE, &s);
        assert!(db.disconnect(A, A, NODE, &s));
        assert!(db.is_empty());
        assert!(!db.disconnect(A, A, NODE, &s));
    }
}

// ── Bulk removal ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod teardown {
    use lc_core::{LaneEnd, LaneId};

    use super::helpers::{sides, Sides, NODE};
    use crate::ConnectionDataBase;

    const A: LaneId = LaneId(10);
    const B: LaneId = LaneId(20);
    const C: LaneId = LaneId(30);

    fn star() -> (ConnectionDataBase, Sides) {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        db.connect_to(C, A, NODE, &s);
        (db, s)
    }

    #[test]
    fn remove_connections_reports_partners() {
        let (mut db, _) = star();
        let t = db.remove_connections(A);
        assert_eq!(t.edges, 2);
        assert_eq!(t.outgoing, 1);
        // Only C had an enabled edge into A; B merely held a hint.
        assert_eq!(t.partners.as_slice(), &[LaneEnd::new(C, true)]);
        assert!(db.is_empty());
    }

    #[test]
    fn remove_connections_of_unknown_lane_is_empty() {
        let (mut db, _) = star();
        let before = db.edge_count();
        assert!(db.remove_connections(LaneId(999)).is_empty());
        assert_eq!(db.edge_count(), before);
    }

    #[test]
    fn remove_lane_end_only_touches_that_end() {
        let s = sides().with(50, false);
        let mut db = ConnectionDataBase::new();
        db.connect_to(A, B, NODE, &s);
        // Unrelated dead-end that must survive.
        db.connect_to(LaneId(50), LaneId(50), NODE, &s);

        let t = db.remove_lane_end(A, true, NODE, &s);
        assert_eq!(t.outgoing, 1);
        assert!(t.partners.is_empty());
        assert!(!db.contains_lane_end(LaneEnd::new(A, true)));
        assert!(!db.contains_lane_end(LaneEnd::new(B, false)));
        assert!(db.is_dead_end(LaneId(50), false));
    }

    #[test]
    fn remove_lane_end_with_stale_partner() {
        let (mut db, s) = star();
        // Lane C no longer resolves at the node.
        let mut stale = s;
        stale.0.remove(&(C, NODE));
        let t = db.remove_lane_end(A, true, NODE, &stale);
        assert_eq!(t.partners.as_slice(), &[LaneEnd::new(C, true)]);
        assert!(db.is_empty());
    }

    #[test]
    fn remove_edge_drops_empty_lane_end() {
        let (mut db, _) = star();
        let end = LaneEnd::new(C, true);
        assert!(db.remove_edge(end, A).is_some());
        assert!(!db.contains_lane_end(end));
        assert!(db.remove_edge(end, A).is_none());
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod diagnostics {
    use lc_core::{LaneId, LaneSides};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::helpers::{sides, NODE};
    use crate::ConnectionDataBase;

    #[test]
    fn dump_is_sorted_and_marks_hints() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(LaneId(10), LaneId(20), NODE, &s);
        assert_eq!(
            db.debug_dump(),
            "LaneId(10)@start -> [LaneId(20)]\nLaneId(20)@end -> [LaneId(10) (hint)]\n"
        );
    }

    #[test]
    fn dump_does_not_mutate() {
        let s = sides();
        let mut db = ConnectionDataBase::new();
        db.connect_to(LaneId(10), LaneId(20), NODE, &s);
        db.connect_to(LaneId(30), LaneId(40), NODE, &s);
        let before = db.sorted_lane_ends();
        let first = db.debug_dump();
        db.print_debug_info();
        assert_eq!(db.debug_dump(), first);
        assert_eq!(db.sorted_lane_ends(), before);
    }

    #[test]
    fn empty_dump() {
        assert_eq!(ConnectionDataBase::new().debug_dump(), "");
    }

    /// Seeded op mix over four lanes, dead-ends and teardowns included;
    /// invariants must hold after every step.
    #[test]
    fn invariants_hold_under_op_mix() {
        let s = sides();
        let lanes = [10, 20, 30, 40].map(LaneId);
        let mut db = ConnectionDataBase::new();
        let mut rng = SmallRng::seed_from_u64(0x1a2e);
        for step in 0..2_000 {
            let a = lanes[rng.gen_range(0..lanes.len())];
            let b = lanes[rng.gen_range(0..lanes.len())];
            let op = rng.gen_range(0..10);
            match op {
                0..=3 => {
                    db.connect_to(a, b, NODE, &s);
                }
                4..=5 => {
                    db.disconnect(a, b, NODE, &s);
                }
                6..=7 => {
                    db.connect_to(a, a, NODE, &s);
                }
                8 => {
                    if let Some(start_node) = s.start_node_at(a, NODE) {
                        db.remove_lane_end(a, start_node, NODE, &s);
                    }
                }
                _ => {
                    db.remove_connections(a);
                }
            }
            let broken = db.invariant_violations();
            assert!(broken.is_empty(), "step {step} (op {op}, {a} / {b}): {broken:?}");
        }
    }

    #[test]
    fn teardown_leaves_nothing_pointing_at_lane() {
        let s = sides();
        let lanes = [10, 20, 30, 40].map(LaneId);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut db = ConnectionDataBase::new();
            for _ in 0..12 {
                let a = lanes[rng.gen_range(0..lanes.len())];
                let b = lanes[rng.gen_range(0..lanes.len())];
                db.connect_to(a, b, NODE, &s);
            }
            let gone = lanes[rng.gen_range(0..lanes.len())];
            db.remove_connections(gone);
            for (end, edges) in db.iter() {
                assert_ne!(end.lane, gone);
                assert!(edges.iter().all(|e| e.lane != gone), "{end} still points at {gone}");
            }
        }
    }
}
