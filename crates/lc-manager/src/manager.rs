//! `ConnectionManager`: the public surface over the road and track groups.
//!
//! # Dispatch
//!
//! Every call names a [`GroupSelector`].  A group *governs* a lane pair when
//! the selector includes it and it supports both lanes.  Results combine as:
//!
//! | Operation                        | Combination                                   |
//! |----------------------------------|-----------------------------------------------|
//! | `add_lane_connection`            | some governing group added the edge, and all governing groups now report it |
//! | `remove_lane_connection`         | some governing group removed an enabled edge, and none reports it any more |
//! | `are_lanes_connected`, `has_*`   | any selected group                            |
//! | `remove_lane_connections*`       | any selected group removed something          |
//! | `load_data`                      | every group loaded cleanly                    |
//! | `save_data`                      | road records, then track records              |

use smallvec::SmallVec;

use lc_core::{
    ConnectionGroup, ConnectorConfig, CoreResult, GroupSelector, LaneId, NodeId, SegmentId,
};
use lc_network::{HostNotifier, NetworkHost};

use crate::arrows;
use crate::{ConnectionRecord, ConnectionSubManager, ConnectorContext, SessionState};

type Groups = SmallVec<[ConnectionGroup; 2]>;

/// Both connection groups plus the host they are bound to.
///
/// Owns the host view `H` and the notifier `N` for the lifetime of a
/// session.  Tests and the demo use
/// [`InMemoryNetwork`](lc_network::InMemoryNetwork) and
/// [`EventLog`](lc_network::EventLog).
pub struct ConnectionManager<H: NetworkHost, N: HostNotifier> {
    config:   ConnectorConfig,
    host:     H,
    notifier: N,
    session:  SessionState,
    /// Indexed by `ConnectionGroup as usize`.
    groups:   [ConnectionSubManager; 2],
}

impl<H: NetworkHost, N: HostNotifier> ConnectionManager<H, N> {
    /// Validate `config` and start a session with empty graphs.
    pub fn new(config: ConnectorConfig, host: H, notifier: N) -> CoreResult<Self> {
        config.validate()?;
        let groups = ConnectionGroup::ALL.map(|g| ConnectionSubManager::new(g, *config.group(g)));
        Ok(Self {
            config,
            host,
            notifier,
            session: SessionState::Running,
            groups,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, e.g. to mirror an edit made in the game.  Call
    /// [`on_segment_released`](Self::on_segment_released) after releasing a
    /// segment.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn sub_manager(&self, group: ConnectionGroup) -> &ConnectionSubManager {
        &self.groups[group as usize]
    }

    /// Give the host and notifier back, ending the session.
    pub fn into_parts(self) -> (H, N) {
        (self.host, self.notifier)
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    pub fn add_lane_connection(
        &mut self,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
        selector:          GroupSelector,
    ) -> bool {
        let governing = self.governing(selector, source, target);
        let (mut ctx, subs) = self.split();

        let mut added = false;
        for &g in &governing {
            added |= subs[g as usize].add_lane_connection(&mut ctx, source, target, source_start_node);
        }
        added
            && governing
                .iter()
                .all(|&g| subs[g as usize].lanes_connected(ctx.host, source, target, source_start_node))
    }

    pub fn remove_lane_connection(
        &mut self,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
        selector:          GroupSelector,
    ) -> bool {
        let governing = self.governing(selector, source, target);
        let (mut ctx, subs) = self.split();

        let mut removed = false;
        for &g in &governing {
            removed |= subs[g as usize].remove_lane_connection(&mut ctx, source, target, source_start_node);
        }
        removed
            && !governing
                .iter()
                .any(|&g| subs[g as usize].lanes_connected(ctx.host, source, target, source_start_node))
    }

    /// Tear down one lane end in every selected group.
    pub fn remove_lane_connections(
        &mut self,
        lane:       LaneId,
        start_node: bool,
        selector:   GroupSelector,
    ) -> bool {
        let (mut ctx, subs) = self.split();
        let mut any = false;
        for sub in subs.iter_mut().filter(|s| selector.includes(s.group())) {
            any |= sub.remove_lane_connections(&mut ctx, lane, start_node);
        }
        any
    }

    /// Tear down every lane end at `node` in every selected group.
    pub fn remove_lane_connections_from_node(&mut self, node: NodeId, selector: GroupSelector) -> bool {
        let (mut ctx, subs) = self.split();
        let mut any = false;
        for sub in subs.iter_mut().filter(|s| selector.includes(s.group())) {
            any |= sub.remove_lane_connections_from_node(&mut ctx, node);
        }
        any
    }

    /// The host released `segment`; purge it from both groups.
    pub fn on_segment_released(&mut self, segment: SegmentId) -> bool {
        let (mut ctx, subs) = self.split();
        let mut any = false;
        for sub in subs.iter_mut() {
            any |= sub.on_segment_released(&mut ctx, segment);
        }
        any
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn are_lanes_connected(
        &mut self,
        source:            LaneId,
        target:            LaneId,
        source_start_node: bool,
        selector:          GroupSelector,
    ) -> bool {
        if !self.config.enabled {
            return true;
        }
        self.any_selected(selector, |sub, ctx| {
            sub.are_lanes_connected(ctx, source, target, source_start_node)
        })
    }

    pub fn has_connections(&mut self, lane: LaneId, start_node: bool, selector: GroupSelector) -> bool {
        self.any_selected(selector, |sub, ctx| sub.has_connections(ctx, lane, start_node))
    }

    pub fn has_outgoing_connections(
        &mut self,
        lane:       LaneId,
        start_node: bool,
        selector:   GroupSelector,
    ) -> bool {
        self.any_selected(selector, |sub, ctx| sub.has_outgoing_connections(ctx, lane, start_node))
    }

    pub fn has_node_connections(&mut self, node: NodeId, selector: GroupSelector) -> bool {
        self.any_selected(selector, |sub, ctx| sub.has_node_connections(ctx, node))
    }

    pub fn has_uturn_connections(
        &mut self,
        segment:    SegmentId,
        start_node: bool,
        selector:   GroupSelector,
    ) -> bool {
        self.any_selected(selector, |sub, ctx| sub.has_uturn_connections(ctx, segment, start_node))
    }

    /// Enabled targets of the lane end across the selected groups, sorted and
    /// deduplicated.
    pub fn lane_connections(
        &mut self,
        lane:       LaneId,
        start_node: bool,
        selector:   GroupSelector,
    ) -> Vec<LaneId> {
        let host = &self.host;
        let mut targets = Vec::new();
        for sub in self.groups.iter_mut().filter(|s| selector.includes(s.group())) {
            targets.extend(sub.lane_connections(host, lane, start_node));
        }
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Whether a vehicle can turn from one segment end into another, using
    /// the configured margin.
    pub fn check_segments_turning_angle(
        &self,
        source_segment:    SegmentId,
        source_start_node: bool,
        target_segment:    SegmentId,
        target_start_node: bool,
    ) -> bool {
        arrows::check_segments_turning_angle(
            &self.host,
            self.config.turn_angle_margin,
            source_segment,
            source_start_node,
            target_segment,
            target_start_node,
        )
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Replay persisted records into both groups.  Runs in
    /// [`SessionState::Loading`], so no segment changes are published.
    /// Returns `true` if no record had to be skipped.
    pub fn load_data(&mut self, records: &[ConnectionRecord]) -> bool {
        self.session = SessionState::Loading;
        let (mut ctx, subs) = self.split();
        let mut ok = true;
        for sub in subs.iter_mut() {
            ok &= sub.load_data(&mut ctx, records);
        }
        self.session = SessionState::Running;
        ok
    }

    pub fn save_data(&self) -> Vec<ConnectionRecord> {
        let records: Vec<ConnectionRecord> = self
            .groups
            .iter()
            .flat_map(|sub| sub.save_data(&self.host))
            .collect();
        tracing::info!(records = records.len(), "connection records saved");
        records
    }

    /// End the session: both graphs are replaced by empty ones.
    pub fn reset(&mut self) {
        for sub in &mut self.groups {
            sub.reset();
        }
        self.session = SessionState::Running;
    }

    pub fn print_debug_info(&self) {
        for sub in &self.groups {
            sub.print_debug_info();
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Selected groups that support both lanes.
    fn governing(&self, selector: GroupSelector, a: LaneId, b: LaneId) -> Groups {
        self.groups
            .iter()
            .filter(|s| selector.includes(s.group()) && s.governs(&self.host, a, b))
            .map(|s| s.group())
            .collect()
    }

    /// Borrow the context and the sub-managers side by side.
    fn split(&mut self) -> (ConnectorContext<'_, H, N>, &mut [ConnectionSubManager; 2]) {
        let ctx = ConnectorContext::new(&self.host, &mut self.notifier, &self.config, self.session);
        (ctx, &mut self.groups)
    }

    fn any_selected<F>(&mut self, selector: GroupSelector, mut f: F) -> bool
    where
        F: FnMut(&mut ConnectionSubManager, &ConnectorContext<'_, H, N>) -> bool,
    {
        let (ctx, subs) = self.split();
        let mut any = false;
        for sub in subs.iter_mut().filter(|s| selector.includes(s.group())) {
            // Every selected group runs so each gets to purge stale lanes.
            any |= f(sub, &ctx);
        }
        any
    }
}
