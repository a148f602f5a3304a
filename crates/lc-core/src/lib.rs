//! `lc-core`: foundational types for the lane connector.
//!
//! This crate is a dependency of every other `lc-*` crate.  It has no `lc-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `LaneId`, `SegmentId`, `NodeId`                           |
//! | [`lane`]      | `LaneEnd`, `LaneConnectionData`, `LaneSides`              |
//! | [`flags`]     | `LaneTypes`, `VehicleTypes`, `LaneDirection`, `LaneArrows`, `ArrowDirection` |
//! | [`group`]     | `ConnectionGroup`, `GroupSelector`                        |
//! | [`geo`]       | `Position`, `Direction`, turn classification              |
//! | [`config`]    | `ConnectorConfig`, `GroupConfig`                          |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod flags;
pub mod geo;
pub mod group;
pub mod ids;
pub mod lane;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ConnectorConfig, GroupConfig};
pub use error::{CoreError, CoreResult};
pub use flags::{ArrowDirection, LaneArrows, LaneDirection, LaneTypes, VehicleTypes};
pub use geo::{Direction, Position};
pub use group::{ConnectionGroup, GroupSelector};
pub use ids::{LaneId, NodeId, SegmentId};
pub use lane::{LaneConnectionData, LaneEnd, LaneSides};
