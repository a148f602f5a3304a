//! In-memory reference host network and its builder.
//!
//! # Data layout
//!
//! Nodes, segments and lanes live in three `Vec`s indexed by their ids.  Each
//! segment keeps its lanes in lane-list order; each lane remembers its slot in
//! that list so `next_lane` is O(1).  Segments are straight lines between
//! their node positions, which is all the junction geometry checks need.
//!
//! Released segments and invalidated lanes stay in the arrays (ids are never
//! reused) but report as invalid, which is exactly the kind of stale
//! reference the connector has to cope with.

use lc_core::{
    ArrowDirection, Direction, LaneDirection, LaneId, LaneSides, LaneTypes, NodeId, Position,
    SegmentId, VehicleTypes,
};

use crate::{LaneInfo, NetworkError, NetworkHost, NetworkResult, MAX_NODE_SEGMENTS};

// ── Specs ─────────────────────────────────────────────────────────────────────

/// Per-segment properties.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentSpec {
    pub inverted:           bool,
    /// `-1.0` (180°) places no limit on turns.
    pub max_turn_angle_cos: f32,
}

impl Default for SegmentSpec {
    fn default() -> Self {
        Self { inverted: false, max_turn_angle_cos: -1.0 }
    }
}

impl SegmentSpec {
    /// A rail segment limited to `max_turn_degrees`.
    pub fn rail(max_turn_degrees: f32) -> Self {
        Self { inverted: false, max_turn_angle_cos: max_turn_degrees.to_radians().cos() }
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

/// Per-lane properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaneSpec {
    pub lane_types:    LaneTypes,
    pub vehicle_types: VehicleTypes,
    pub direction:     LaneDirection,
}

impl LaneSpec {
    pub fn car(direction: LaneDirection) -> Self {
        Self { lane_types: LaneTypes::VEHICLE, vehicle_types: VehicleTypes::CAR, direction }
    }

    pub fn tram(direction: LaneDirection) -> Self {
        Self { lane_types: LaneTypes::VEHICLE, vehicle_types: VehicleTypes::TRAM, direction }
    }

    /// A road lane shared by cars and trams.
    pub fn tram_road(direction: LaneDirection) -> Self {
        Self {
            lane_types:    LaneTypes::VEHICLE,
            vehicle_types: VehicleTypes::CAR | VehicleTypes::TRAM,
            direction,
        }
    }

    pub fn train(direction: LaneDirection) -> Self {
        Self { lane_types: LaneTypes::VEHICLE, vehicle_types: VehicleTypes::TRAIN, direction }
    }

    pub fn pedestrian() -> Self {
        Self {
            lane_types:    LaneTypes::PEDESTRIAN,
            vehicle_types: VehicleTypes::NONE,
            direction:     LaneDirection::BOTH,
        }
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct NodeRecord {
    pos:      Position,
    segments: Vec<SegmentId>,
}

#[derive(Clone, Debug)]
struct SegmentRecord {
    start:    NodeId,
    end:      NodeId,
    spec:     SegmentSpec,
    lanes:    Vec<LaneId>,
    released: bool,
}

#[derive(Clone, Debug)]
struct LaneRecord {
    info:  LaneInfo,
    /// Position in the owning segment's lane list.
    slot:  usize,
    valid: bool,
}

// ── InMemoryNetwork ───────────────────────────────────────────────────────────

/// A complete [`NetworkHost`] held in memory.
///
/// Construct with [`NetworkBuilder`].
#[derive(Clone, Debug)]
pub struct InMemoryNetwork {
    nodes:    Vec<NodeRecord>,
    segments: Vec<SegmentRecord>,
    lanes:    Vec<LaneRecord>,
}

impl InMemoryNetwork {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn node_pos(&self, node: NodeId) -> Option<Position> {
        self.nodes.get(node.index()).map(|n| n.pos)
    }

    /// Release a segment: it disappears from its nodes and all its lanes turn
    /// invalid.  Returns the lanes it held.
    ///
    /// Ids are not reused; lane info stays readable so listeners can still
    /// walk the released segment's lanes.
    pub fn release_segment(&mut self, segment: SegmentId) -> NetworkResult<Vec<LaneId>> {
        let seg = self
            .segments
            .get_mut(segment.index())
            .ok_or(NetworkError::SegmentNotFound(segment))?;
        seg.released = true;
        let (start, end) = (seg.start, seg.end);
        let lanes = seg.lanes.clone();

        for node in [start, end] {
            if let Some(n) = self.nodes.get_mut(node.index()) {
                n.segments.retain(|&s| s != segment);
            }
        }
        for lane in &lanes {
            if let Some(l) = self.lanes.get_mut(lane.index()) {
                l.valid = false;
            }
        }
        tracing::debug!(%segment, lanes = lanes.len(), "segment released");
        Ok(lanes)
    }

    /// Mark a single lane invalid without touching its segment.
    pub fn invalidate_lane(&mut self, lane: LaneId) -> NetworkResult<()> {
        let l = self
            .lanes
            .get_mut(lane.index())
            .ok_or(NetworkError::LaneNotFound(lane))?;
        l.valid = false;
        Ok(())
    }

    fn segment(&self, segment: SegmentId) -> Option<&SegmentRecord> {
        self.segments.get(segment.index())
    }
}

impl LaneSides for InMemoryNetwork {
    fn start_node_at(&self, lane: LaneId, node: NodeId) -> Option<bool> {
        let info = self.lanes.get(lane.index())?.info;
        self.segment_start_node_at(info.segment, node)
    }
}

impl NetworkHost for InMemoryNetwork {
    fn is_lane_valid(&self, lane: LaneId) -> bool {
        self.lanes.get(lane.index()).is_some_and(|l| {
            l.valid && self.segment(l.info.segment).is_some_and(|s| !s.released)
        })
    }

    fn lane_info(&self, lane: LaneId) -> Option<LaneInfo> {
        self.lanes.get(lane.index()).map(|l| l.info)
    }

    fn first_lane(&self, segment: SegmentId) -> Option<LaneId> {
        self.segment(segment)?.lanes.first().copied()
    }

    fn next_lane(&self, lane: LaneId) -> Option<LaneId> {
        let l = self.lanes.get(lane.index())?;
        self.segment(l.info.segment)?.lanes.get(l.slot + 1).copied()
    }

    fn segment_nodes(&self, segment: SegmentId) -> Option<(NodeId, NodeId)> {
        self.segment(segment).map(|s| (s.start, s.end))
    }

    fn is_segment_inverted(&self, segment: SegmentId) -> bool {
        self.segment(segment).is_some_and(|s| s.spec.inverted)
    }

    fn node_segments(&self, node: NodeId) -> Vec<SegmentId> {
        self.nodes
            .get(node.index())
            .map(|n| n.segments.clone())
            .unwrap_or_default()
    }

    fn relative_direction(
        &self,
        source:            SegmentId,
        source_start_node: bool,
        target:            SegmentId,
    ) -> ArrowDirection {
        if source == target {
            return ArrowDirection::Turn;
        }
        let Some(node) = self
            .segment_nodes(source)
            .map(|(start, end)| if source_start_node { start } else { end })
        else {
            return ArrowDirection::None;
        };
        let Some(target_start_node) = self.segment_start_node_at(target, node) else {
            return ArrowDirection::None;
        };
        let incoming = -self.segment_end_direction(source, source_start_node);
        let outgoing = self.segment_end_direction(target, target_start_node);
        incoming.classify_turn(outgoing)
    }

    fn segment_end_direction(&self, segment: SegmentId, start_node: bool) -> Direction {
        let Some(seg) = self.segment(segment) else {
            return Direction::default();
        };
        let (Some(a), Some(b)) = (self.node_pos(seg.start), self.node_pos(seg.end)) else {
            return Direction::default();
        };
        if start_node {
            Direction::between(a, b)
        } else {
            Direction::between(b, a)
        }
    }

    fn max_turn_angle_cos(&self, segment: SegmentId) -> f32 {
        self.segment(segment).map_or(-1.0, |s| s.spec.max_turn_angle_cos)
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct an [`InMemoryNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use lc_core::{LaneDirection, Position};
/// use lc_network::{LaneSpec, NetworkBuilder, NetworkHost};
///
/// let mut b = NetworkBuilder::new();
/// let west = b.add_node(Position::new(-100.0, 0.0)).unwrap();
/// let mid  = b.add_node(Position::new(0.0, 0.0)).unwrap();
/// let seg  = b.add_segment(west, mid).unwrap();
/// let lane = b.add_lane(seg, LaneSpec::car(LaneDirection::FORWARD)).unwrap();
/// let net  = b.build();
/// assert!(net.is_lane_valid(lane));
/// assert_eq!(net.lane_node(lane, false), Some(mid));
/// ```
#[derive(Default)]
pub struct NetworkBuilder {
    nodes:    Vec<NodeRecord>,
    segments: Vec<SegmentRecord>,
    lanes:    Vec<LaneRecord>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Position) -> NetworkResult<NodeId> {
        let id = NodeId::try_from(self.nodes.len())
            .ok()
            .filter(|id| !id.is_invalid())
            .ok_or(NetworkError::TooMany("nodes"))?;
        self.nodes.push(NodeRecord { pos, segments: Vec::new() });
        Ok(id)
    }

    /// Add a default segment from `start` to `end`.
    pub fn add_segment(&mut self, start: NodeId, end: NodeId) -> NetworkResult<SegmentId> {
        self.add_segment_with(start, end, SegmentSpec::default())
    }

    pub fn add_segment_with(
        &mut self,
        start: NodeId,
        end:   NodeId,
        spec:  SegmentSpec,
    ) -> NetworkResult<SegmentId> {
        if start == end {
            return Err(NetworkError::DegenerateSegment(start));
        }
        for node in [start, end] {
            let n = self
                .nodes
                .get(node.index())
                .ok_or(NetworkError::NodeNotFound(node))?;
            if n.segments.len() >= MAX_NODE_SEGMENTS {
                return Err(NetworkError::NodeFull(node));
            }
        }
        let id = SegmentId::try_from(self.segments.len())
            .ok()
            .filter(|id| !id.is_invalid())
            .ok_or(NetworkError::TooMany("segments"))?;
        self.segments.push(SegmentRecord {
            start,
            end,
            spec,
            lanes: Vec::new(),
            released: false,
        });
        self.nodes[start.index()].segments.push(id);
        self.nodes[end.index()].segments.push(id);
        Ok(id)
    }

    /// Append a lane to `segment`'s lane list.
    pub fn add_lane(&mut self, segment: SegmentId, spec: LaneSpec) -> NetworkResult<LaneId> {
        let id = LaneId::try_from(self.lanes.len())
            .ok()
            .filter(|id| !id.is_invalid())
            .ok_or(NetworkError::TooMany("lanes"))?;
        let seg = self
            .segments
            .get_mut(segment.index())
            .ok_or(NetworkError::SegmentNotFound(segment))?;
        let slot = seg.lanes.len();
        seg.lanes.push(id);
        self.lanes.push(LaneRecord {
            info: LaneInfo {
                segment,
                lane_types:      spec.lane_types,
                vehicle_types:   spec.vehicle_types,
                final_direction: spec.direction,
            },
            slot,
            valid: true,
        });
        Ok(id)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn segment_count(&self) -> usize { self.segments.len() }
    pub fn lane_count(&self) -> usize { self.lanes.len() }

    pub fn build(self) -> InMemoryNetwork {
        InMemoryNetwork {
            nodes:    self.nodes,
            segments: self.segments,
            lanes:    self.lanes,
        }
    }
}
