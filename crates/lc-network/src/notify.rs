//! Outgoing notifications from the connector to the host.

use lc_core::{LaneArrows, LaneId, NodeId, SegmentId};

/// Callbacks fired as side effects of connection edits.
///
/// All methods have default no-op implementations so integrations only
/// override what they wire up.
pub trait HostNotifier {
    /// Connections override the lane's arrows with `arrows`.
    fn set_lane_arrows(&mut self, _lane: LaneId, _arrows: LaneArrows) {}

    /// The lane has no outgoing connections; fall back to default arrows.
    fn reset_lane_arrows(&mut self, _lane: LaneId) {}

    /// Cached routing through `node` must be recomputed.
    fn recalculate_node(&mut self, _node: NodeId) {}

    /// Cached routing along `segment` must be recomputed.
    fn recalculate_segment(&mut self, _segment: SegmentId) {}

    /// Force the junction restriction "U-turns allowed" on at this segment end.
    fn allow_uturn(&mut self, _segment: SegmentId, _start_node: bool) {}

    /// Derived segment state changed; consistency listeners should refresh.
    fn segment_changed(&mut self, _segment: SegmentId) {}
}

impl<N: HostNotifier + ?Sized> HostNotifier for &mut N {
    fn set_lane_arrows(&mut self, lane: LaneId, arrows: LaneArrows) {
        (**self).set_lane_arrows(lane, arrows)
    }
    fn reset_lane_arrows(&mut self, lane: LaneId) {
        (**self).reset_lane_arrows(lane)
    }
    fn recalculate_node(&mut self, node: NodeId) {
        (**self).recalculate_node(node)
    }
    fn recalculate_segment(&mut self, segment: SegmentId) {
        (**self).recalculate_segment(segment)
    }
    fn allow_uturn(&mut self, segment: SegmentId, start_node: bool) {
        (**self).allow_uturn(segment, start_node)
    }
    fn segment_changed(&mut self, segment: SegmentId) {
        (**self).segment_changed(segment)
    }
}

/// A [`HostNotifier`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl HostNotifier for NoopNotifier {}

// ── EventLog ──────────────────────────────────────────────────────────────────

/// One recorded notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    SetLaneArrows(LaneId, LaneArrows),
    ResetLaneArrows(LaneId),
    RecalculateNode(NodeId),
    RecalculateSegment(SegmentId),
    AllowUturn(SegmentId, bool),
    SegmentChanged(SegmentId),
}

/// A [`HostNotifier`] that records every call in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<HostEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn contains(&self, event: HostEvent) -> bool {
        self.events.contains(&event)
    }

    /// The most recent arrow decision for `lane`: `Some(Some(arrows))` for a
    /// set, `Some(None)` for a reset, `None` if the lane was never touched.
    pub fn last_arrows(&self, lane: LaneId) -> Option<Option<LaneArrows>> {
        self.events.iter().rev().find_map(|e| match *e {
            HostEvent::SetLaneArrows(l, arrows) if l == lane => Some(Some(arrows)),
            HostEvent::ResetLaneArrows(l) if l == lane => Some(None),
            _ => None,
        })
    }
}

impl HostNotifier for EventLog {
    fn set_lane_arrows(&mut self, lane: LaneId, arrows: LaneArrows) {
        self.events.push(HostEvent::SetLaneArrows(lane, arrows));
    }
    fn reset_lane_arrows(&mut self, lane: LaneId) {
        self.events.push(HostEvent::ResetLaneArrows(lane));
    }
    fn recalculate_node(&mut self, node: NodeId) {
        self.events.push(HostEvent::RecalculateNode(node));
    }
    fn recalculate_segment(&mut self, segment: SegmentId) {
        self.events.push(HostEvent::RecalculateSegment(segment));
    }
    fn allow_uturn(&mut self, segment: SegmentId, start_node: bool) {
        self.events.push(HostEvent::AllowUturn(segment, start_node));
    }
    fn segment_changed(&mut self, segment: SegmentId) {
        self.events.push(HostEvent::SegmentChanged(segment));
    }
}
