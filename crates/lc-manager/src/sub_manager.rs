//! `ConnectionSubManager`: one connection group's rules over its graph.
//!
//! # Lazy validation
//!
//! The host can invalidate lanes at any time without telling us.  Every
//! query and edit first checks the lanes it is about to trust; a stale lane
//! has all of its edges (and the partners' edges back to it) purged on the
//! spot, and the operation answers as if the connection never existed.
//!
//! # Side effects
//!
//! Once an add or remove passes validation the sub-manager, in order:
//!
//! 1. recalculates the source lane's arrows (road group only),
//! 2. forces U-turns on at the segment end when source and target share a
//!    segment (add only),
//! 3. asks the host to recalculate the node,
//! 4. publishes a segment change for both segments.

use smallvec::SmallVec;

use lc_core::{ConnectionGroup, GroupConfig, LaneEnd, LaneId, NodeId, SegmentId};
use lc_graph::{ConnectionDataBase, Teardown, INLINE_FAN_OUT};
use lc_network::{HostNotifier, LaneInfo, NetworkHost};

use crate::arrows::{arrows_for_connection, check_segments_turning_angle};
use crate::{ConnectionRecord, ConnectorContext, RecordError};

/// Rules and storage for one [`ConnectionGroup`].
#[derive(Clone, Debug)]
pub struct ConnectionSubManager {
    group:  ConnectionGroup,
    filter: GroupConfig,
    graph:  ConnectionDataBase,
}

impl ConnectionSubManager {
    pub fn new(group: ConnectionGroup, filter: GroupConfig) -> Self {
        Self { group, filter, graph: ConnectionDataBase::new() }
    }

    #[inline]
    pub fn group(&self) -> ConnectionGroup {
        self.group
    }

    #[inline]
    pub fn filter(&self) -> &GroupConfig {
        &self.filter
    }

    /// Read-only view of the underlying graph.
    #[inline]
    pub fn graph(&self) -> &ConnectionDataBase {
        &self.graph
    }

    /// Drop every connection.
    pub fn reset(&mut self) {
        self.graph = ConnectionDataBase::new();
    }

    // ── Support ───────────────────────────────────────────────────────────

    /// The lane's type masks both intersect this group's masks.
    #[inline]
    pub fn supports(&self, info: &LaneInfo) -> bool {
        self.filter.matches(info.lane_types, info.vehicle_types)
    }

    pub fn supports_lane<H: NetworkHost>(&self, host: &H, lane: LaneId) -> bool {
        host.lane_info(lane).is_some_and(|info| self.supports(&info))
    }

    /// This group is responsible for a connection between `a` and `b`.
    pub fn governs<H: NetworkHost>(&self, host: &H, a: LaneId, b: LaneId) -> bool {
        self.supports_lane(host, a) && self.supports_lane(host, b)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` when the connector is disabled (no restriction); otherwise
    /// whether `source → target` is enabled at the given end.
    pub fn are_lanes_connected<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:               &ConnectorContext<'_, H, N>,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
    ) -> bool {
        if !ctx.config.enabled {
            return true;
        }
        self.lanes_connected(ctx.host, source, target, source_start_node)
    }

    /// Like [`are_lanes_connected`](Self::are_lanes_connected) but ignores
    /// the feature switch.
    pub fn lanes_connected<H: NetworkHost>(
        &mut self,
        host:              &H,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
    ) -> bool {
        let source_ok = self.validate_lane(host, source);
        let target_ok = self.validate_lane(host, target);
        if !(source_ok && target_ok) {
            return false;
        }
        self.validate_lane_end(host, source, source_start_node);
        self.graph.is_connected_to(source, target, source_start_node)
    }

    /// The lane end takes part in any connection, in either direction.
    pub fn has_connections<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:        &ConnectorContext<'_, H, N>,
        lane:       LaneId,
        start_node: bool,
    ) -> bool {
        ctx.config.enabled && self.lane_end_has_edges(ctx.host, lane, start_node)
    }

    /// At least one enabled edge leaves the lane end.  A dead-end counts.
    pub fn has_outgoing_connections<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:        &ConnectorContext<'_, H, N>,
        lane:       LaneId,
        start_node: bool,
    ) -> bool {
        if !ctx.config.enabled || !self.validate_lane(ctx.host, lane) {
            return false;
        }
        self.validate_lane_end(ctx.host, lane, start_node);
        self.graph.has_outgoing(lane, start_node)
    }

    /// Any lane meeting at `node` takes part in a connection there.
    pub fn has_node_connections<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:  &ConnectorContext<'_, H, N>,
        node: NodeId,
    ) -> bool {
        if !ctx.config.enabled {
            return false;
        }
        let host = ctx.host;
        for segment in host.node_segments(node) {
            let Some(start_node) = host.segment_start_node_at(segment, node) else {
                continue;
            };
            for lane in host.segment_lanes(segment) {
                if self.lane_end_has_edges(host, lane, start_node) {
                    return true;
                }
            }
        }
        false
    }

    /// Some lane of `segment` is connected back into the same segment at
    /// the given end.  Dead-ends do not count.
    pub fn has_uturn_connections<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:        &ConnectorContext<'_, H, N>,
        segment:    SegmentId,
        start_node: bool,
    ) -> bool {
        if !ctx.config.enabled {
            return false;
        }
        let host = ctx.host;
        let lanes = host.segment_lanes(segment);
        for &lane in &lanes {
            if !self.validate_lane(host, lane) {
                continue;
            }
            self.validate_lane_end(host, lane, start_node);
            if self
                .graph
                .enabled_targets(lane, start_node)
                .any(|t| t != lane && lanes.contains(&t))
            {
                return true;
            }
        }
        false
    }

    /// Validated targets of the enabled edges leaving the lane end, in
    /// storage order.  Not gated by the feature switch.
    pub fn lane_connections<H: NetworkHost>(
        &mut self,
        host:       &H,
        lane:       LaneId,
        start_node: bool,
    ) -> Vec<LaneId> {
        if !self.validate_lane(host, lane) {
            return Vec::new();
        }
        self.validate_lane_end(host, lane, start_node);
        self.graph.enabled_targets(lane, start_node).collect()
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    /// Validate and add `source → target` at the source's given end.
    ///
    /// Returns `true` if the edge was newly established.
    pub fn add_lane_connection<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:               &mut ConnectorContext<'_, H, N>,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
    ) -> bool {
        let host = ctx.host;
        let group = self.group;

        let source_ok = self.validate_lane(host, source);
        let target_ok = self.validate_lane(host, target);
        if !(source_ok && target_ok) {
            tracing::debug!(%group, %source, %target, "add rejected: stale lane");
            return false;
        }
        let (Some(source_info), Some(target_info)) = (host.lane_info(source), host.lane_info(target))
        else {
            return false;
        };
        if !self.supports(&source_info) || !self.supports(&target_info) {
            tracing::debug!(%group, %source, %target, "add rejected: lane type not in group");
            return false;
        }
        let Some(node) = host.lane_node(source, source_start_node) else {
            return false;
        };
        let Some(target_start_node) = host.start_node_at(target, node) else {
            tracing::debug!(%group, %target, %node, "add rejected: target does not touch node");
            return false;
        };

        let dead_end = source == target;
        let directions_ok = host.flows_toward(&source_info, source_start_node)
            && (dead_end || host.flows_away(&target_info, target_start_node));
        if !directions_ok {
            tracing::debug!(%group, %source, %target, %node, "add rejected: lane directions");
            return false;
        }
        if group == ConnectionGroup::Track
            && !dead_end
            && !check_segments_turning_angle(
                host,
                ctx.config.turn_angle_margin,
                source_info.segment,
                source_start_node,
                target_info.segment,
                target_start_node,
            )
        {
            tracing::debug!(%group, %source, %target, %node, "add rejected: turn too sharp");
            return false;
        }

        self.validate_lane_end(host, source, source_start_node);
        let added = self.graph.connect_to(source, target, node, host);
        debug_assert!(self.graph.is_connected_to(source, target, source_start_node));

        if source_info.segment == target_info.segment {
            ctx.notifier.allow_uturn(source_info.segment, source_start_node);
        }
        self.after_edit(ctx, source, source_start_node, node, [source_info.segment, target_info.segment]);
        added
    }

    /// Validate and remove `source → target` at the source's given end.
    ///
    /// Returns `true` if an enabled edge went away.
    pub fn remove_lane_connection<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:               &mut ConnectorContext<'_, H, N>,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
    ) -> bool {
        let host = ctx.host;

        let source_ok = self.validate_lane(host, source);
        let target_ok = self.validate_lane(host, target);
        if !(source_ok && target_ok) {
            return false;
        }
        let (Some(source_info), Some(target_info)) = (host.lane_info(source), host.lane_info(target))
        else {
            return false;
        };
        let Some(node) = host.lane_node(source, source_start_node) else {
            return false;
        };

        self.validate_lane_end(host, source, source_start_node);
        let removed = self.graph.disconnect(source, target, node, host);

        self.after_edit(ctx, source, source_start_node, node, [source_info.segment, target_info.segment]);
        removed
    }

    /// Tear down one lane end.  Returns `true` if anything was stored there.
    pub fn remove_lane_connections<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:        &mut ConnectorContext<'_, H, N>,
        lane:       LaneId,
        start_node: bool,
    ) -> bool {
        let host = ctx.host;
        let Some(node) = host.lane_node(lane, start_node) else {
            return false;
        };
        let teardown = self.graph.remove_lane_end(lane, start_node, node, host);
        if teardown.is_empty() {
            return false;
        }
        self.after_teardown(ctx, lane, &teardown);
        if let Some(info) = host.lane_info(lane) {
            ctx.notifier.recalculate_segment(info.segment);
            ctx.publish_segment_changed(info.segment);
        }
        ctx.notifier.recalculate_node(node);
        true
    }

    /// Tear down every lane end at `node`.  Returns `true` if anything was
    /// removed.
    pub fn remove_lane_connections_from_node<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:  &mut ConnectorContext<'_, H, N>,
        node: NodeId,
    ) -> bool {
        let host = ctx.host;
        let mut any = false;
        for segment in host.node_segments(node) {
            let Some(start_node) = host.segment_start_node_at(segment, node) else {
                continue;
            };
            let mut touched = false;
            for lane in host.segment_lanes(segment) {
                let teardown = self.graph.remove_lane_end(lane, start_node, node, host);
                if teardown.is_empty() {
                    continue;
                }
                touched = true;
                self.after_teardown(ctx, lane, &teardown);
            }
            if touched {
                ctx.notifier.recalculate_segment(segment);
                ctx.publish_segment_changed(segment);
                any = true;
            }
        }
        if any {
            ctx.notifier.recalculate_node(node);
        }
        any
    }

    /// The host released `segment`: purge every edge touching its lanes.
    ///
    /// Lane info of the released segment must still be readable.
    pub fn on_segment_released<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:     &mut ConnectorContext<'_, H, N>,
        segment: SegmentId,
    ) -> bool {
        let host = ctx.host;
        let mut partners: SmallVec<[LaneEnd; INLINE_FAN_OUT]> = SmallVec::new();
        let mut edges = 0;
        for lane in host.segment_lanes(segment) {
            let teardown = self.graph.remove_connections(lane);
            edges += teardown.edges;
            partners.extend(teardown.partners);
        }
        if edges == 0 && partners.is_empty() {
            return false;
        }
        partners.sort_unstable();
        partners.dedup();

        for partner in partners.iter().filter(|p| host.is_lane_valid(p.lane)) {
            self.recalculate_lane_arrows(ctx, partner.lane, partner.start_node);
            if let Some(node) = host.lane_node(partner.lane, partner.start_node) {
                ctx.notifier.recalculate_node(node);
            }
        }
        ctx.notifier.recalculate_segment(segment);
        tracing::debug!(group = %self.group, %segment, edges, "purged released segment");
        true
    }

    // ── Lane arrows ───────────────────────────────────────────────────────

    /// Push the arrows implied by the lane end's connections to the host.
    /// No-op outside the road group.
    pub fn recalculate_lane_arrows<H: NetworkHost, N: HostNotifier>(
        &self,
        ctx:        &mut ConnectorContext<'_, H, N>,
        lane:       LaneId,
        start_node: bool,
    ) {
        if self.group != ConnectionGroup::Road {
            return;
        }
        let arrows = arrows_for_connection(
            ctx.host,
            &self.graph,
            lane,
            start_node,
            ctx.config.left_hand_traffic,
        );
        match arrows {
            Some(arrows) => ctx.notifier.set_lane_arrows(lane, arrows),
            None => ctx.notifier.reset_lane_arrows(lane),
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Replay the records addressed to this group.  A bad record is logged
    /// and skipped.  Returns `true` if none failed.
    pub fn load_data<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:     &mut ConnectorContext<'_, H, N>,
        records: &[ConnectionRecord],
    ) -> bool {
        let group = self.group;
        let mut ok = true;
        let mut loaded = 0usize;
        for record in records.iter().filter(|r| r.applies_to(group)) {
            match self.load_record(ctx, record) {
                Ok(true) => loaded += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(%group, ?record, error = %e, "skipping connection record");
                    ok = false;
                }
            }
        }
        tracing::info!(%group, loaded, "connection records loaded");
        ok
    }

    /// One record per enabled edge between valid lanes, sorted by source
    /// lane end.
    pub fn save_data<H: NetworkHost>(&self, host: &H) -> Vec<ConnectionRecord> {
        let mut records = Vec::new();
        for end in self.graph.sorted_lane_ends() {
            if !host.is_lane_valid(end.lane) {
                continue;
            }
            for target in self.graph.enabled_targets(end.lane, end.start_node) {
                if host.is_lane_valid(target) {
                    records.push(ConnectionRecord::new(end.lane, target, end.start_node, self.group));
                }
            }
        }
        records
    }

    /// `Ok(false)` for a pre-group record whose lanes belong to the other
    /// group.
    fn load_record<H: NetworkHost, N: HostNotifier>(
        &mut self,
        ctx:    &mut ConnectorContext<'_, H, N>,
        record: &ConnectionRecord,
    ) -> Result<bool, RecordError> {
        let host = ctx.host;
        let (source, target) = (record.source_lane, record.target_lane);
        for lane in [source, target] {
            if !host.is_lane_valid(lane) {
                return Err(RecordError::InvalidLane(lane));
            }
        }
        if record.group.is_none() && !self.governs(host, source, target) {
            return Ok(false);
        }
        let node = host
            .lane_node(source, record.source_start_node)
            .ok_or(RecordError::NoNode(source))?;
        let target_start_node = host
            .start_node_at(target, node)
            .ok_or(RecordError::NotAtNode { lane: target, node })?;

        let added = self.add_lane_connection(ctx, source, target, record.source_start_node);
        if !added && !self.graph.is_connected_to(source, target, record.source_start_node) {
            return Err(RecordError::Rejected { source_lane: source, target_lane: target });
        }
        if record.replays_reverse()
            && source != target
            && !self.add_lane_connection(ctx, target, source, target_start_node)
        {
            tracing::debug!(group = %self.group, %source, %target, "legacy reverse direction not restored");
        }
        Ok(true)
    }

    // ── Diagnostics ───────────────────────────────────────────────────────

    pub fn print_debug_info(&self) {
        let _span = tracing::debug_span!("connections", group = %self.group).entered();
        self.graph.print_debug_info();
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// `false` (after purging the lane) if the host no longer knows it.
    fn validate_lane<H: NetworkHost>(&mut self, host: &H, lane: LaneId) -> bool {
        if host.is_lane_valid(lane) {
            return true;
        }
        let teardown = self.graph.remove_connections(lane);
        if !teardown.is_empty() {
            tracing::debug!(group = %self.group, %lane, edges = teardown.edges, "purged stale lane");
        }
        false
    }

    /// Purge edges of one lane end that point at stale lanes.
    fn validate_lane_end<H: NetworkHost>(&mut self, host: &H, lane: LaneId, start_node: bool) {
        let stale: SmallVec<[LaneId; INLINE_FAN_OUT]> = self
            .graph
            .connections(lane, start_node)
            .iter()
            .map(|e| e.lane)
            .filter(|&t| !host.is_lane_valid(t))
            .collect();
        for target in stale {
            self.graph.remove_connections(target);
            self.graph.remove_edge(LaneEnd::new(lane, start_node), target);
            tracing::debug!(group = %self.group, %lane, %target, "purged edge to stale lane");
        }
    }

    fn lane_end_has_edges<H: NetworkHost>(&mut self, host: &H, lane: LaneId, start_node: bool) -> bool {
        if !self.validate_lane(host, lane) {
            return false;
        }
        self.validate_lane_end(host, lane, start_node);
        self.graph.contains_lane_end(LaneEnd::new(lane, start_node))
    }

    fn after_edit<H: NetworkHost, N: HostNotifier>(
        &self,
        ctx:               &mut ConnectorContext<'_, H, N>,
        source:            LaneId,
        source_start_node: bool,
        node:              NodeId,
        segments:          [SegmentId; 2],
    ) {
        self.recalculate_lane_arrows(ctx, source, source_start_node);
        ctx.notifier.recalculate_node(node);
        ctx.publish_segment_changed(segments[0]);
        if segments[1] != segments[0] {
            ctx.publish_segment_changed(segments[1]);
        }
    }

    /// Arrow fallout of a lane-end teardown.
    fn after_teardown<H: NetworkHost, N: HostNotifier>(
        &self,
        ctx:      &mut ConnectorContext<'_, H, N>,
        lane:     LaneId,
        teardown: &Teardown,
    ) {
        if self.group != ConnectionGroup::Road {
            return;
        }
        let host = ctx.host;
        if teardown.outgoing > 0 {
            ctx.notifier.reset_lane_arrows(lane);
        }
        for partner in teardown.partners.iter().filter(|p| host.is_lane_valid(p.lane)) {
            self.recalculate_lane_arrows(ctx, partner.lane, partner.start_node);
        }
    }
}
