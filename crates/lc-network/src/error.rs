//! Network-builder error type.

use thiserror::Error;

use lc_core::{LaneId, NodeId, SegmentId};

/// Errors produced when building or editing an [`InMemoryNetwork`](crate::InMemoryNetwork).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("segment {0} not found in network")]
    SegmentNotFound(SegmentId),

    #[error("lane {0} not found in network")]
    LaneNotFound(LaneId),

    #[error("node {0} already has the maximum number of segments")]
    NodeFull(NodeId),

    #[error("segment would start and end at node {0}")]
    DegenerateSegment(NodeId),

    #[error("id space exhausted for {0}")]
    TooMany(&'static str),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
