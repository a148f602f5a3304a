//! `lc-graph`: the raw lane connection graph.
//!
//! Vertices are [`LaneEnd`](lc_core::LaneEnd)s; each one maps to a short
//! inline array of [`LaneConnectionData`](lc_core::LaneConnectionData) edges.
//! The graph knows nothing about lane types, geometry or groups; those rules
//! live in `lc-manager`.  The only host knowledge it needs is which end of a
//! lane touches a node, supplied per call through
//! [`LaneSides`](lc_core::LaneSides).
//!
//! # Invariants (hold after every mutation)
//!
//! 1. Lanes A and B are connected at a node iff an enabled edge A→B or B→A
//!    exists there.
//! 2. A stored pair is either both-enabled (bidirectional) or one enabled plus
//!    one disabled hint (uni-directional).
//! 3. A dead-end (A→A) is the only edge of its lane end.
//! 4. Lane ends with no edges are removed from the map.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                               |
//! |-----------|------------------------------------------------------|
//! | `fx-hash` | *(default)* FxHash instead of SipHash for the map.   |

pub mod database;

#[cfg(test)]
mod tests;

pub use database::{ConnectionDataBase, Connections, Teardown, INLINE_FAN_OUT};
