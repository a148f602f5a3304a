//! Unit tests for lc-network.
//!
//! All tests use hand-built networks; positions are metres on the ground plane.

#[cfg(test)]
mod helpers {
    use lc_core::{LaneDirection, LaneId, NodeId, Position, SegmentId};

    use crate::{InMemoryNetwork, LaneSpec, NetworkBuilder};

    pub struct Junction {
        pub net:    InMemoryNetwork,
        pub center: NodeId,
        /// West, east, north, south segments.
        pub segs:   [SegmentId; 4],
        /// `[forward, backward]` car lanes per segment, same order as `segs`.
        pub lanes:  [[LaneId; 2]; 4],
    }

    /// Four-way junction at the origin.
    ///
    /// ```text
    ///            N (0,100)
    ///            |
    /// W (-100,0)-C-(100,0) E
    ///            |
    ///            S (0,-100)
    /// ```
    ///
    /// West and south segments end at the centre; east and north start there.
    pub fn junction() -> Junction {
        let mut b = NetworkBuilder::new();
        let c = b.add_node(Position::new(0.0, 0.0)).unwrap();
        let w = b.add_node(Position::new(-100.0, 0.0)).unwrap();
        let e = b.add_node(Position::new(100.0, 0.0)).unwrap();
        let n = b.add_node(Position::new(0.0, 100.0)).unwrap();
        let s = b.add_node(Position::new(0.0, -100.0)).unwrap();

        let seg_w = b.add_segment(w, c).unwrap();
        let seg_e = b.add_segment(c, e).unwrap();
        let seg_n = b.add_segment(c, n).unwrap();
        let seg_s = b.add_segment(s, c).unwrap();

        let segs = [seg_w, seg_e, seg_n, seg_s];
        let lanes = segs.map(|seg| {
            [
                b.add_lane(seg, LaneSpec::car(LaneDirection::FORWARD)).unwrap(),
                b.add_lane(seg, LaneSpec::car(LaneDirection::BACKWARD)).unwrap(),
            ]
        });

        Junction { net: b.build(), center: c, segs, lanes }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use lc_core::{LaneDirection, NodeId, Position, SegmentId};

    use crate::{LaneSpec, NetworkBuilder, NetworkError, NetworkHost, MAX_NODE_SEGMENTS};

    #[test]
    fn empty_build() {
        let net = NetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.segment_count(), 0);
        assert_eq!(net.lane_count(), 0);
    }

    #[test]
    fn degenerate_segment_rejected() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Position::new(0.0, 0.0)).unwrap();
        assert!(matches!(b.add_segment(a, a), Err(NetworkError::DegenerateSegment(_))));
    }

    #[test]
    fn unknown_segment_rejected() {
        let mut b = NetworkBuilder::new();
        let r = b.add_lane(SegmentId(3), LaneSpec::car(LaneDirection::FORWARD));
        assert!(matches!(r, Err(NetworkError::SegmentNotFound(_))));
    }

    #[test]
    fn node_ids_stop_short_of_sentinel() {
        let mut b = NetworkBuilder::new();
        let mut last = None;
        for _ in 0..u16::MAX {
            last = Some(b.add_node(Position::default()).unwrap());
        }
        assert_eq!(last, Some(NodeId(u16::MAX - 1)));
        assert!(matches!(b.add_node(Position::default()), Err(NetworkError::TooMany("nodes"))));
        assert_eq!(b.node_count(), usize::from(u16::MAX));
    }

    #[test]
    fn node_arity_capped() {
        let mut b = NetworkBuilder::new();
        let hub = b.add_node(Position::new(0.0, 0.0)).unwrap();
        for i in 0..MAX_NODE_SEGMENTS {
            let spoke = b.add_node(Position::new(i as f32 + 1.0, 0.0)).unwrap();
            b.add_segment(hub, spoke).unwrap();
        }
        let extra = b.add_node(Position::new(-1.0, 0.0)).unwrap();
        assert!(matches!(b.add_segment(hub, extra), Err(NetworkError::NodeFull(_))));
        assert_eq!(b.build().node_segments(hub).len(), MAX_NODE_SEGMENTS);
    }

    #[test]
    fn lane_list_order() {
        let j = super::helpers::junction();
        let [fwd, bwd] = j.lanes[0];
        assert_eq!(j.net.first_lane(j.segs[0]), Some(fwd));
        assert_eq!(j.net.next_lane(fwd), Some(bwd));
        assert_eq!(j.net.next_lane(bwd), None);
        assert_eq!(j.net.segment_lanes(j.segs[0]), vec![fwd, bwd]);
    }
}

// ── Host queries ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use lc_core::{ArrowDirection, LaneDirection, LaneSides, Position};

    use crate::{LaneSpec, NetworkBuilder, NetworkHost, SegmentSpec};

    #[test]
    fn sides_at_node() {
        let j = super::helpers::junction();
        let west_fwd = j.lanes[0][0];
        let east_fwd = j.lanes[1][0];
        // West segment ends at the centre, east segment starts there.
        assert_eq!(j.net.start_node_at(west_fwd, j.center), Some(false));
        assert_eq!(j.net.start_node_at(east_fwd, j.center), Some(true));
        assert_eq!(j.net.lane_node(west_fwd, false), Some(j.center));
    }

    #[test]
    fn sides_at_unrelated_node() {
        let j = super::helpers::junction();
        let (_, far_east) = j.net.segment_nodes(j.segs[1]).unwrap();
        assert_eq!(j.net.start_node_at(j.lanes[0][0], far_east), None);
    }

    #[test]
    fn relative_directions_from_west() {
        let j = super::helpers::junction();
        let [w, e, n, s] = j.segs;
        assert_eq!(j.net.relative_direction(w, false, e), ArrowDirection::Forward);
        assert_eq!(j.net.relative_direction(w, false, n), ArrowDirection::Left);
        assert_eq!(j.net.relative_direction(w, false, s), ArrowDirection::Right);
        assert_eq!(j.net.relative_direction(w, false, w), ArrowDirection::Turn);
    }

    #[test]
    fn relative_direction_needs_shared_node() {
        let j = super::helpers::junction();
        // The west segment's start node is the far west node, not the centre.
        assert_eq!(j.net.relative_direction(j.segs[0], true, j.segs[1]), ArrowDirection::None);
    }

    #[test]
    fn flow_direction_respects_inversion() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Position::new(0.0, 0.0)).unwrap();
        let c = b.add_node(Position::new(10.0, 0.0)).unwrap();
        let plain = b.add_segment(a, c).unwrap();
        let flipped = b.add_segment_with(c, a, SegmentSpec::default().inverted()).unwrap();
        let l1 = b.add_lane(plain, LaneSpec::car(LaneDirection::FORWARD)).unwrap();
        let l2 = b.add_lane(flipped, LaneSpec::car(LaneDirection::FORWARD)).unwrap();
        let net = b.build();

        let i1 = net.lane_info(l1).unwrap();
        assert!(net.flows_toward(&i1, false));
        assert!(!net.flows_toward(&i1, true));
        assert!(net.flows_away(&i1, true));

        // Inverted: FORWARD now means end → start.
        let i2 = net.lane_info(l2).unwrap();
        assert!(net.flows_toward(&i2, true));
        assert!(net.flows_away(&i2, false));
    }

    #[test]
    fn rail_spec_cosine() {
        let spec = SegmentSpec::rail(90.0);
        assert!(spec.max_turn_angle_cos.abs() < 1e-6);
    }
}

// ── Invalidation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod invalidation {
    use crate::NetworkHost;

    #[test]
    fn release_segment_invalidates_lanes() {
        let mut j = super::helpers::junction();
        let released = j.net.release_segment(j.segs[2]).unwrap();
        assert_eq!(released, j.lanes[2].to_vec());
        for lane in released {
            assert!(!j.net.is_lane_valid(lane));
            // Lane data stays readable for listeners.
            assert!(j.net.lane_info(lane).is_some());
        }
        assert!(!j.net.node_segments(j.center).contains(&j.segs[2]));
        assert_eq!(j.net.node_segments(j.center).len(), 3);
        assert_eq!(j.net.segment_lanes(j.segs[2]).len(), 2);
    }

    #[test]
    fn invalidate_single_lane() {
        let mut j = super::helpers::junction();
        let [fwd, bwd] = j.lanes[0];
        j.net.invalidate_lane(fwd).unwrap();
        assert!(!j.net.is_lane_valid(fwd));
        assert!(j.net.is_lane_valid(bwd));
    }

    #[test]
    fn unknown_lane_is_invalid() {
        let j = super::helpers::junction();
        assert!(!j.net.is_lane_valid(lc_core::LaneId(9_999)));
        assert!(!j.net.is_lane_valid(lc_core::LaneId::INVALID));
    }
}

// ── Notifiers ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod notify {
    use lc_core::{LaneArrows, LaneId, NodeId};

    use crate::{EventLog, HostEvent, HostNotifier};

    #[test]
    fn event_log_records_in_order() {
        let mut log = EventLog::new();
        log.recalculate_node(NodeId(1));
        log.set_lane_arrows(LaneId(2), LaneArrows::FORWARD);
        assert_eq!(
            log.events,
            vec![
                HostEvent::RecalculateNode(NodeId(1)),
                HostEvent::SetLaneArrows(LaneId(2), LaneArrows::FORWARD),
            ]
        );
    }

    #[test]
    fn last_arrows_tracks_latest_decision() {
        let mut log = EventLog::new();
        assert_eq!(log.last_arrows(LaneId(2)), None);
        log.set_lane_arrows(LaneId(2), LaneArrows::LEFT);
        log.reset_lane_arrows(LaneId(2));
        assert_eq!(log.last_arrows(LaneId(2)), Some(None));
        log.set_lane_arrows(LaneId(2), LaneArrows::RIGHT);
        assert_eq!(log.last_arrows(LaneId(2)), Some(Some(LaneArrows::RIGHT)));
    }

    #[test]
    fn forwarding_through_mut_ref() {
        fn poke<N: HostNotifier>(mut n: N) {
            n.segment_changed(lc_core::SegmentId(4));
        }
        let mut log = EventLog::new();
        poke(&mut log);
        assert!(log.contains(HostEvent::SegmentChanged(lc_core::SegmentId(4))));
    }
}
