//! Error types for lc-manager.
//!
//! Connection edits never error; they report `false`.  Errors here cover
//! record files and the per-record failures logged while loading.

use thiserror::Error;

use lc_core::{LaneId, NodeId};

/// Failure reading or writing a record file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Alias for `Result<T, PersistError>`.
pub type PersistResult<T> = Result<T, PersistError>;

/// Why a single persisted connection could not be restored.
///
/// Never returned to callers of `load_data`; each one is logged and the
/// record skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("lane {0} is no longer valid")]
    InvalidLane(LaneId),

    #[error("lane {0} has no node at the recorded end")]
    NoNode(LaneId),

    #[error("lane {lane} does not touch node {node}")]
    NotAtNode { lane: LaneId, node: NodeId },

    #[error("connection {source_lane} -> {target_lane} was rejected")]
    Rejected { source_lane: LaneId, target_lane: LaneId },
}
