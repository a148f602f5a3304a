//! Graph vertex and edge records.
//!
//! A [`LaneEnd`] names one end of a lane (the side touching either the start
//! node or the end node of its segment).  A [`LaneConnectionData`] is one
//! directed edge leaving a lane end.

use std::fmt;

use crate::{LaneId, NodeId};

// ── LaneEnd ───────────────────────────────────────────────────────────────────

/// One endpoint of a lane: `(lane, start_node)`.
///
/// Two `LaneEnd`s are equal iff both the lane and the side match.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneEnd {
    pub lane:       LaneId,
    /// `true` for the end touching the segment's start node.
    pub start_node: bool,
}

impl LaneEnd {
    #[inline]
    pub const fn new(lane: LaneId, start_node: bool) -> Self {
        Self { lane, start_node }
    }

    /// The other end of the same lane.
    #[inline]
    pub const fn opposite(self) -> Self {
        Self { lane: self.lane, start_node: !self.start_node }
    }
}

impl fmt::Display for LaneEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.start_node { "start" } else { "end" };
        write!(f, "{}@{}", self.lane, side)
    }
}

// ── LaneConnectionData ────────────────────────────────────────────────────────

/// A directed edge to `lane`.
///
/// `enabled == false` marks a hint: the reverse direction of a uni-directional
/// connection, kept so disconnects and queries find the partner without a
/// scan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneConnectionData {
    pub lane:    LaneId,
    pub enabled: bool,
}

impl LaneConnectionData {
    #[inline]
    pub const fn new(lane: LaneId, enabled: bool) -> Self {
        Self { lane, enabled }
    }
}

impl fmt::Display for LaneConnectionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "{}", self.lane)
        } else {
            write!(f, "{} (hint)", self.lane)
        }
    }
}

// ── LaneSides ─────────────────────────────────────────────────────────────────

/// Resolves which end of a lane touches a node.
///
/// The graph stores lane ends, but callers address connections by node; this
/// trait is the only host knowledge the graph needs.
pub trait LaneSides {
    /// `Some(true)` if `lane`'s segment starts at `node`, `Some(false)` if it
    /// ends there, `None` if the lane is unknown or not incident to `node`.
    fn start_node_at(&self, lane: LaneId, node: NodeId) -> Option<bool>;
}

impl<T: LaneSides + ?Sized> LaneSides for &T {
    fn start_node_at(&self, lane: LaneId, node: NodeId) -> Option<bool> {
        (**self).start_node_at(lane, node)
    }
}
