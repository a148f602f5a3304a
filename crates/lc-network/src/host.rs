//! The read-only query surface the host network exposes to the connector.
//!
//! # Pluggability
//!
//! The managers in `lc-manager` are generic over [`NetworkHost`], so a game
//! integration implements this trait over its own network buffers while
//! tests use [`InMemoryNetwork`](crate::InMemoryNetwork).
//!
//! Every query tolerates stale ids: an id the host no longer knows yields
//! `None`, `false`, or an empty list, never a panic.

use lc_core::{
    ArrowDirection, Direction, LaneDirection, LaneId, LaneSides, LaneTypes, NodeId, SegmentId,
    VehicleTypes,
};

/// Upper bound on segments meeting at one node.
pub const MAX_NODE_SEGMENTS: usize = 8;

/// Upper bound on lanes walked per segment; guards against a cyclic lane
/// list in a corrupted host buffer.
const MAX_SEGMENT_LANES: usize = 256;

/// Static description of a lane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneInfo {
    /// Segment the lane belongs to.
    pub segment:         SegmentId,
    pub lane_types:      LaneTypes,
    pub vehicle_types:   VehicleTypes,
    /// Direction relative to the segment's *uninverted* start → end.
    pub final_direction: LaneDirection,
}

/// Read-only host network queries.
pub trait NetworkHost: LaneSides {
    /// The lane currently belongs to a live, created segment.
    fn is_lane_valid(&self, lane: LaneId) -> bool;

    /// Static lane description, `None` for unknown lanes.
    fn lane_info(&self, lane: LaneId) -> Option<LaneInfo>;

    /// First lane in a segment's lane list.
    fn first_lane(&self, segment: SegmentId) -> Option<LaneId>;

    /// Next lane in the same segment's lane list.
    fn next_lane(&self, lane: LaneId) -> Option<LaneId>;

    /// `(start_node, end_node)` of a segment.
    fn segment_nodes(&self, segment: SegmentId) -> Option<(NodeId, NodeId)>;

    /// The segment's geometry is flipped relative to its asset.
    fn is_segment_inverted(&self, segment: SegmentId) -> bool;

    /// Segments incident to a node (at most [`MAX_NODE_SEGMENTS`]).
    fn node_segments(&self, node: NodeId) -> Vec<SegmentId>;

    /// Relative turn from the `source_start_node` end of `source` into
    /// `target`, which must meet it at the same node.
    fn relative_direction(
        &self,
        source:            SegmentId,
        source_start_node: bool,
        target:            SegmentId,
    ) -> ArrowDirection;

    /// Direction at the given segment end, pointing from the node into the
    /// segment.
    fn segment_end_direction(&self, segment: SegmentId, start_node: bool) -> Direction;

    /// Cosine of the maximum turning angle vehicles on `segment` can take.
    fn max_turn_angle_cos(&self, segment: SegmentId) -> f32;

    // ── Provided helpers ──────────────────────────────────────────────────

    /// All lanes of `segment` in lane-list order.
    fn segment_lanes(&self, segment: SegmentId) -> Vec<LaneId> {
        let mut lanes = Vec::new();
        let mut next = self.first_lane(segment);
        while let Some(lane) = next {
            if lanes.len() >= MAX_SEGMENT_LANES {
                tracing::warn!(%segment, "lane list exceeds {MAX_SEGMENT_LANES} entries; truncating");
                break;
            }
            lanes.push(lane);
            next = self.next_lane(lane);
        }
        lanes
    }

    /// The node at the given end of `lane`'s segment.
    fn lane_node(&self, lane: LaneId, start_node: bool) -> Option<NodeId> {
        let info = self.lane_info(lane)?;
        let (start, end) = self.segment_nodes(info.segment)?;
        Some(if start_node { start } else { end })
    }

    /// Which end of `segment` touches `node`.
    fn segment_start_node_at(&self, segment: SegmentId, node: NodeId) -> Option<bool> {
        let (start, end) = self.segment_nodes(segment)?;
        if start == node {
            Some(true)
        } else if end == node {
            Some(false)
        } else {
            None
        }
    }

    /// The lane's travel direction once segment inversion is applied.
    fn effective_direction(&self, info: &LaneInfo) -> LaneDirection {
        if self.is_segment_inverted(info.segment) {
            info.final_direction.invert()
        } else {
            info.final_direction
        }
    }

    /// Traffic on `lane` arrives at the node at its `start_node` end.
    fn flows_toward(&self, info: &LaneInfo, start_node: bool) -> bool {
        let dir = self.effective_direction(info);
        if start_node {
            dir.intersects(LaneDirection::BACKWARD)
        } else {
            dir.intersects(LaneDirection::FORWARD)
        }
    }

    /// Traffic on `lane` leaves the node at its `start_node` end.
    fn flows_away(&self, info: &LaneInfo, start_node: bool) -> bool {
        self.flows_toward(info, !start_node)
    }
}
