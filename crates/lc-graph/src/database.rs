//! `ConnectionDataBase`: lane-end adjacency with hints and dead-ends.
//!
//! # Data layout
//!
//! ```text
//! LaneEnd(lane, start_node) → [LaneConnectionData(target, enabled); ≤ 8 inline]
//! ```
//!
//! Fan-out per lane end is bounded by the lanes meeting at one junction, so
//! edges sit in a `SmallVec` and are found by linear scan; no per-edit heap
//! traffic until a lane end exceeds [`INLINE_FAN_OUT`] edges.
//!
//! A uni-directional connection A→B stores the enabled edge at A's end and a
//! disabled *hint* B→A at B's end.  The hint lets `disconnect` and
//! `remove_connections` reach the partner without scanning the map.
//!
//! A dead-end lane end holds nothing but its self edge, so the hints for
//! edges coming *into* it are kept in a side table instead.  They move back
//! into the edge list once the lane end stops being a dead-end.

use std::fmt::Write as _;

use smallvec::{smallvec, SmallVec};

use lc_core::{LaneConnectionData, LaneEnd, LaneId, LaneSides, NodeId};

/// Edges stored inline per lane end before spilling to the heap.
pub const INLINE_FAN_OUT: usize = 8;

/// Edge list of one lane end.
pub type Connections = SmallVec<[LaneConnectionData; INLINE_FAN_OUT]>;

type Sources = SmallVec<[LaneId; INLINE_FAN_OUT]>;

#[cfg(feature = "fx-hash")]
type LaneEndMap<V> = rustc_hash::FxHashMap<LaneEnd, V>;
#[cfg(not(feature = "fx-hash"))]
type LaneEndMap<V> = std::collections::HashMap<LaneEnd, V>;

// ── Teardown ──────────────────────────────────────────────────────────────────

/// What a bulk removal took out of the graph.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Teardown {
    /// Edges (enabled or hints) removed from the torn-down lane end(s).
    pub edges:    usize,
    /// How many of those were enabled.
    pub outgoing: usize,
    /// Partner lane ends that lost an enabled edge *to* the torn-down lane.
    pub partners: SmallVec<[LaneEnd; INLINE_FAN_OUT]>,
}

impl Teardown {
    /// Nothing was stored for the lane.
    pub fn is_empty(&self) -> bool {
        self.edges == 0 && self.partners.is_empty()
    }
}

// ── ConnectionDataBase ────────────────────────────────────────────────────────

/// Directed lane-end graph for one connection group.
///
/// Node-addressed operations resolve lane sides through a [`LaneSides`]
/// implementation passed per call; the graph holds no host reference.
#[derive(Default, Clone, Debug)]
pub struct ConnectionDataBase {
    map:              LaneEndMap<Connections>,
    /// Dead-end lane end → lanes with an enabled edge into it.
    dead_end_sources: LaneEndMap<Sources>,
}

impl ConnectionDataBase {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Size ──────────────────────────────────────────────────────────────

    /// Number of lane ends with at least one edge.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total stored edges, hints included.
    pub fn edge_count(&self) -> usize {
        self.map.values().map(|c| c.len()).sum()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.dead_end_sources.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// All edges leaving a lane end; empty if none are stored.
    pub fn connections(&self, lane: LaneId, start_node: bool) -> &[LaneConnectionData] {
        self.map
            .get(&LaneEnd::new(lane, start_node))
            .map_or(&[][..], |c| c.as_slice())
    }

    pub fn contains_lane_end(&self, end: LaneEnd) -> bool {
        self.map.contains_key(&end)
    }

    /// The stored edge `end → target`, enabled or not.
    pub fn edge(&self, end: LaneEnd, target: LaneId) -> Option<LaneConnectionData> {
        self.map
            .get(&end)?
            .iter()
            .find(|e| e.lane == target)
            .copied()
    }

    /// An enabled edge `source → target` leaves the given end of `source`.
    pub fn is_connected_to(&self, source: LaneId, target: LaneId, source_start_node: bool) -> bool {
        self.edge(LaneEnd::new(source, source_start_node), target)
            .is_some_and(|e| e.enabled)
    }

    /// At least one enabled edge leaves this lane end.
    pub fn has_outgoing(&self, lane: LaneId, start_node: bool) -> bool {
        self.connections(lane, start_node).iter().any(|e| e.enabled)
    }

    /// Targets of the enabled edges leaving this lane end.
    pub fn enabled_targets(&self, lane: LaneId, start_node: bool) -> impl Iterator<Item = LaneId> + '_ {
        self.connections(lane, start_node)
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.lane)
    }

    /// The lane end holds exactly its own dead-end edge.
    pub fn is_dead_end(&self, lane: LaneId, start_node: bool) -> bool {
        matches!(self.connections(lane, start_node), [only] if only.lane == lane && only.enabled)
    }

    /// Lanes whose enabled edges end in this dead-end.  Empty for any lane
    /// end that is not a dead-end.
    pub fn dead_end_sources(&self, lane: LaneId, start_node: bool) -> &[LaneId] {
        self.dead_end_sources
            .get(&LaneEnd::new(lane, start_node))
            .map_or(&[][..], |s| s.as_slice())
    }

    /// Every stored lane end with its edges, in map order.
    pub fn iter(&self) -> impl Iterator<Item = (LaneEnd, &[LaneConnectionData])> + '_ {
        self.map.iter().map(|(end, c)| (*end, c.as_slice()))
    }

    /// Stored lane ends sorted by `(lane, start_node)`.
    pub fn sorted_lane_ends(&self) -> Vec<LaneEnd> {
        let mut ends: Vec<LaneEnd> = self.map.keys().copied().collect();
        ends.sort_unstable();
        ends
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Enable `source → target` at `node` and record the backward hint.
    ///
    /// `source == target` makes a dead-end, which first clears every other
    /// edge of that lane end.  Connecting out of a dead-end clears the
    /// dead-end.  If the target end is itself a dead-end the hint goes to the
    /// dead-end side table, keeping the dead-end exclusive.
    ///
    /// Returns `true` if the forward edge was not enabled before.
    pub fn connect_to<S: LaneSides + ?Sized>(
        &mut self,
        source: LaneId,
        target: LaneId,
        node:   NodeId,
        sides:  &S,
    ) -> bool {
        let Some(source_start) = sides.start_node_at(source, node) else {
            tracing::debug!(%source, %node, "connect: source lane does not touch node");
            return false;
        };
        let src = LaneEnd::new(source, source_start);

        if source == target {
            if self.is_dead_end(source, source_start) {
                return false;
            }
            self.clear_outgoing(src, node, sides);
            self.map.insert(src, smallvec![LaneConnectionData::new(source, true)]);
            return true;
        }

        let Some(target_start) = sides.start_node_at(target, node) else {
            tracing::debug!(%target, %node, "connect: target lane does not touch node");
            return false;
        };
        let tgt = LaneEnd::new(target, target_start);

        if self.is_dead_end(source, source_start) {
            self.map.remove(&src);
            self.restore_dead_end_sources(src);
        }
        let added = self.add_edge(src, target, true);
        if self.is_dead_end(target, target_start) {
            let sources = self.dead_end_sources.entry(tgt).or_default();
            if !sources.contains(&source) {
                sources.push(source);
            }
        } else {
            self.add_edge(tgt, source, false);
        }

        debug_assert!(self.lane_end_is_consistent(src), "inconsistent edges at {src}");
        added
    }

    /// Remove the `source → target` relationship at `node`.
    ///
    /// * `source == target` removes a dead-end.
    /// * If `target → source` is enabled (the pair was bidirectional), the
    ///   forward edge is only disabled and stays as that connection's hint.
    /// * Otherwise both directions are deleted.
    ///
    /// Returns `true` if an enabled `source → target` edge went away.
    pub fn disconnect<S: LaneSides + ?Sized>(
        &mut self,
        source: LaneId,
        target: LaneId,
        node:   NodeId,
        sides:  &S,
    ) -> bool {
        let Some(source_start) = sides.start_node_at(source, node) else {
            return false;
        };
        let src = LaneEnd::new(source, source_start);

        if source == target {
            return self.remove_edge(src, source).is_some_and(|e| e.enabled);
        }

        let Some(target_start) = sides.start_node_at(target, node) else {
            // Target no longer resolvable; drop what we can reach.
            return self.remove_edge(src, target).is_some_and(|e| e.enabled);
        };
        let tgt = LaneEnd::new(target, target_start);

        if self.edge(tgt, source).is_some_and(|e| e.enabled) {
            self.disable_edge(src, target)
        } else {
            let forward = self.remove_edge(src, target);
            self.remove_edge(tgt, source);
            forward.is_some_and(|e| e.enabled)
        }
    }

    /// Tear down one lane end at `node`: its edges and the partners' edges
    /// back to it.
    pub fn remove_lane_end<S: LaneSides + ?Sized>(
        &mut self,
        lane:       LaneId,
        start_node: bool,
        node:       NodeId,
        sides:      &S,
    ) -> Teardown {
        let mut teardown = Teardown::default();
        let end = LaneEnd::new(lane, start_node);
        let sources = self.dead_end_sources.remove(&end).unwrap_or_default();
        let Some(removed) = self.map.remove(&end) else {
            return teardown;
        };
        teardown.edges = removed.len() + sources.len();
        teardown.outgoing = removed.iter().filter(|e| e.enabled).count();

        let partners = removed.iter().filter(|e| e.lane != lane).map(|e| e.lane);
        for partner in partners.chain(sources) {
            match sides.start_node_at(partner, node) {
                Some(partner_start) => {
                    self.remove_partner_edge(LaneEnd::new(partner, partner_start), lane, &mut teardown);
                }
                None => {
                    // Partner is stale; clear both its ends.
                    for partner_start in [true, false] {
                        self.remove_partner_edge(LaneEnd::new(partner, partner_start), lane, &mut teardown);
                    }
                }
            }
        }
        teardown
    }

    /// Remove every edge leaving either end of `lane`, plus the partners'
    /// edges back to it.  Used when a lane is destroyed.
    pub fn remove_connections(&mut self, lane: LaneId) -> Teardown {
        let mut teardown = Teardown::default();
        for start_node in [true, false] {
            let end = LaneEnd::new(lane, start_node);
            let sources = self.dead_end_sources.remove(&end).unwrap_or_default();
            let Some(removed) = self.map.remove(&end) else {
                continue;
            };
            teardown.edges += removed.len() + sources.len();
            teardown.outgoing += removed.iter().filter(|e| e.enabled).count();

            let partners = removed.iter().filter(|e| e.lane != lane).map(|e| e.lane);
            for partner in partners.chain(sources) {
                for partner_start in [true, false] {
                    self.remove_partner_edge(LaneEnd::new(partner, partner_start), lane, &mut teardown);
                }
            }
        }
        teardown
    }

    /// Remove the single edge `end → target`, dropping the lane end if it
    /// becomes empty.  A dead-end side-table entry for `target` at `end` goes
    /// too.
    pub fn remove_edge(&mut self, end: LaneEnd, target: LaneId) -> Option<LaneConnectionData> {
        self.forget_dead_end_source(end, target);
        let entries = self.map.get_mut(&end)?;
        let pos = entries.iter().position(|e| e.lane == target)?;
        let removed = entries.remove(pos);
        if entries.is_empty() {
            self.map.remove(&end);
            self.restore_dead_end_sources(end);
        }
        Some(removed)
    }

    // ── Diagnostics ───────────────────────────────────────────────────────

    /// Human-readable dump, one lane end per line in sorted order.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        for end in self.sorted_lane_ends() {
            let _ = write!(out, "{end} ->");
            for e in self.connections(end.lane, end.start_node) {
                let _ = write!(out, " [{e}]");
            }
            out.push('\n');
        }
        out
    }

    /// Emit [`debug_dump`](Self::debug_dump) at debug level.
    pub fn print_debug_info(&self) {
        tracing::debug!(
            lane_ends = self.len(),
            edges = self.edge_count(),
            "lane connection graph:\n{}",
            self.debug_dump()
        );
    }

    /// Every invariant breach in the graph, as readable messages.  Empty
    /// when the graph is consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut found = Vec::new();
        for end in self.sorted_lane_ends() {
            let edges = self.connections(end.lane, end.start_node);
            if edges.is_empty() {
                found.push(format!("{end} is stored with no edges"));
            }
            if !self.lane_end_is_consistent(end) {
                found.push(format!("{end} mixes a dead-end with other edges or repeats a target"));
            }
            for e in edges.iter().filter(|e| !e.enabled) {
                let backed = [true, false]
                    .into_iter()
                    .any(|s| self.is_connected_to(e.lane, end.lane, s));
                if !backed {
                    found.push(format!("{end} holds hint to {} without an enabled reverse edge", e.lane));
                }
            }
            for e in edges.iter().filter(|e| e.enabled && e.lane != end.lane) {
                let reverse = [true, false].into_iter().any(|s| {
                    let back = LaneEnd::new(e.lane, s);
                    self.edge(back, end.lane).is_some()
                        || self.dead_end_sources(back.lane, back.start_node).contains(&end.lane)
                });
                if !reverse {
                    found.push(format!("{end} -> {} has no reverse entry", e.lane));
                }
            }
        }
        for (end, sources) in &self.dead_end_sources {
            if !self.is_dead_end(end.lane, end.start_node) {
                found.push(format!("{end} keeps dead-end sources without being a dead-end"));
            }
            for &source in sources {
                let backed = [true, false]
                    .into_iter()
                    .any(|s| self.is_connected_to(source, end.lane, s));
                if !backed {
                    found.push(format!("{end} lists {source} as a source without an enabled edge"));
                }
            }
        }
        found
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Add or enable `key → target`.  A disabled add never downgrades an
    /// enabled edge.  Returns `true` if the edge turned enabled.
    fn add_edge(&mut self, key: LaneEnd, target: LaneId, enable: bool) -> bool {
        let entries = self.map.entry(key).or_default();
        if let Some(e) = entries.iter_mut().find(|e| e.lane == target) {
            let newly = enable && !e.enabled;
            e.enabled |= enable;
            return newly;
        }
        entries.push(LaneConnectionData::new(target, enable));
        enable
    }

    /// Turn `end → target` into a hint.  Returns `true` if it was enabled.
    fn disable_edge(&mut self, end: LaneEnd, target: LaneId) -> bool {
        let Some(entries) = self.map.get_mut(&end) else {
            return false;
        };
        match entries.iter_mut().find(|e| e.lane == target) {
            Some(e) => std::mem::replace(&mut e.enabled, false),
            None => false,
        }
    }

    /// Drop every edge of `end` and the hints that backed its enabled edges,
    /// ahead of turning it into a dead-end.  Partners' enabled edges into
    /// `end.lane` survive and are listed in the dead-end side table.
    fn clear_outgoing<S: LaneSides + ?Sized>(&mut self, end: LaneEnd, node: NodeId, sides: &S) {
        let Some(removed) = self.map.remove(&end) else {
            return;
        };
        for e in removed.iter().filter(|e| e.lane != end.lane) {
            let Some(partner_start) = sides.start_node_at(e.lane, node) else {
                continue;
            };
            let partner = LaneEnd::new(e.lane, partner_start);
            match self.edge(partner, end.lane) {
                Some(back) if back.enabled => {
                    let sources = self.dead_end_sources.entry(end).or_default();
                    if !sources.contains(&e.lane) {
                        sources.push(e.lane);
                    }
                }
                Some(_) => {
                    self.remove_edge(partner, end.lane);
                }
                None => self.forget_dead_end_source(partner, end.lane),
            }
        }
    }

    /// Turn the side-table entries of a former dead-end back into hints.
    fn restore_dead_end_sources(&mut self, end: LaneEnd) {
        let Some(sources) = self.dead_end_sources.remove(&end) else {
            return;
        };
        for source in sources {
            self.add_edge(end, source, false);
        }
    }

    fn forget_dead_end_source(&mut self, end: LaneEnd, source: LaneId) {
        let Some(sources) = self.dead_end_sources.get_mut(&end) else {
            return;
        };
        sources.retain(|s| *s != source);
        if sources.is_empty() {
            self.dead_end_sources.remove(&end);
        }
    }

    fn remove_partner_edge(&mut self, partner: LaneEnd, lane: LaneId, teardown: &mut Teardown) {
        if self.remove_edge(partner, lane).is_some_and(|e| e.enabled) {
            teardown.partners.push(partner);
        }
    }

    /// Local check of invariant 3 and target uniqueness for one lane end.
    fn lane_end_is_consistent(&self, end: LaneEnd) -> bool {
        let edges = self.connections(end.lane, end.start_node);
        let has_self = edges.iter().any(|e| e.lane == end.lane);
        if has_self && !(edges.len() == 1 && edges[0].enabled) {
            return false;
        }
        edges
            .iter()
            .enumerate()
            .all(|(i, a)| edges[i + 1..].iter().all(|b| b.lane != a.lane))
    }
}
