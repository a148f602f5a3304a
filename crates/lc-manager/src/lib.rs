//! `lc-manager`: the lane connector's public surface.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`manager`]     | `ConnectionManager`: dispatch over the road/track groups   |
//! | [`sub_manager`] | `ConnectionSubManager`: one group's rules and graph        |
//! | [`context`]     | `ConnectorContext`, `SessionState`                         |
//! | [`arrows`]      | lane arrows from connections, junction turning check       |
//! | [`records`]     | `ConnectionRecord` and its CSV reader/writer               |
//! | [`error`]       | `PersistError`, `RecordError`                              |
//!
//! # Example
//!
//! ```
//! use lc_core::{ConnectorConfig, GroupSelector, LaneDirection, Position};
//! use lc_manager::ConnectionManager;
//! use lc_network::{LaneSpec, NetworkBuilder, NoopNotifier};
//!
//! let mut b = NetworkBuilder::new();
//! let w = b.add_node(Position::new(-100.0, 0.0)).unwrap();
//! let c = b.add_node(Position::new(0.0, 0.0)).unwrap();
//! let e = b.add_node(Position::new(100.0, 0.0)).unwrap();
//! let into = b.add_segment(w, c).unwrap();
//! let out  = b.add_segment(c, e).unwrap();
//! let l1 = b.add_lane(into, LaneSpec::car(LaneDirection::FORWARD)).unwrap();
//! let l2 = b.add_lane(out, LaneSpec::car(LaneDirection::FORWARD)).unwrap();
//!
//! let mut mgr = ConnectionManager::new(ConnectorConfig::default(), b.build(), NoopNotifier).unwrap();
//! assert!(mgr.add_lane_connection(l1, l2, false, GroupSelector::All));
//! assert!(mgr.are_lanes_connected(l1, l2, false, GroupSelector::Road));
//! ```

pub mod arrows;
pub mod context;
pub mod error;
pub mod manager;
pub mod records;
pub mod sub_manager;


pub use arrows::{arrows_for_connection, check_segments_turning_angle};
pub use context::{ConnectorContext, SessionState};
pub use error::{PersistError, PersistResult, RecordError};
pub use manager::ConnectionManager;
pub use records::{read_records, read_records_path, write_records, write_records_path, ConnectionRecord};
pub use sub_manager::ConnectionSubManager;
