//! `lc-network`: the host collaborator seen from the lane connector.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`host`]    | `NetworkHost` query trait, `LaneInfo`                       |
//! | [`notify`]  | `HostNotifier` trait, `NoopNotifier`, `EventLog`            |
//! | [`network`] | `InMemoryNetwork`, `NetworkBuilder`                         |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! The connector never mutates the host.  It reads through [`NetworkHost`]
//! and reports derived changes through [`HostNotifier`].  `InMemoryNetwork`
//! is a complete host used by tests, the demo, and integrations that keep
//! their own mirror of the game network.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod host;
pub mod network;
pub mod notify;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use host::{LaneInfo, NetworkHost, MAX_NODE_SEGMENTS};
pub use network::{InMemoryNetwork, LaneSpec, NetworkBuilder, SegmentSpec};
pub use notify::{EventLog, HostEvent, HostNotifier, NoopNotifier};
