//! Connector configuration.

use crate::geo::TURN_ANGLE_MARGIN;
use crate::{ConnectionGroup, CoreError, CoreResult, LaneTypes, VehicleTypes};

/// The lane/vehicle masks a connection group governs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupConfig {
    pub lane_types:    LaneTypes,
    pub vehicle_types: VehicleTypes,
}

impl GroupConfig {
    pub fn road() -> Self {
        Self {
            lane_types:    LaneTypes::VEHICLE | LaneTypes::TRANSPORT_VEHICLE,
            vehicle_types: VehicleTypes::CAR | VehicleTypes::BICYCLE | VehicleTypes::TROLLEYBUS,
        }
    }

    pub fn track() -> Self {
        Self {
            lane_types:    LaneTypes::VEHICLE | LaneTypes::TRANSPORT_VEHICLE,
            vehicle_types: VehicleTypes::TRAIN
                | VehicleTypes::TRAM
                | VehicleTypes::METRO
                | VehicleTypes::MONORAIL
                | VehicleTypes::CABLE_CAR,
        }
    }

    /// A lane matches when both of its masks intersect the group's masks.
    #[inline]
    pub fn matches(&self, lane_types: LaneTypes, vehicle_types: VehicleTypes) -> bool {
        self.lane_types.intersects(lane_types) && self.vehicle_types.intersects(vehicle_types)
    }
}

/// Top-level connector configuration.
///
/// Typically loaded from the mod's options file by the host integration and
/// handed to `lc_manager::ConnectionManager::new`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectorConfig {
    /// Global feature switch.  When off, lanes count as connected to
    /// everything and the `has_*` predicates report nothing.
    pub enabled: bool,

    /// Vehicles drive on the left; flips which arrow marks a U-turn.
    pub left_hand_traffic: bool,

    /// Added to the track turning-angle limit.  Default: 0.01.
    pub turn_angle_margin: f32,

    pub road:  GroupConfig,
    pub track: GroupConfig,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            enabled:           true,
            left_hand_traffic: false,
            turn_angle_margin: TURN_ANGLE_MARGIN,
            road:              GroupConfig::road(),
            track:             GroupConfig::track(),
        }
    }
}

impl ConnectorConfig {
    pub fn group(&self, group: ConnectionGroup) -> &GroupConfig {
        match group {
            ConnectionGroup::Road  => &self.road,
            ConnectionGroup::Track => &self.track,
        }
    }

    /// Reject configurations under which a group could never match a lane.
    pub fn validate(&self) -> CoreResult<()> {
        for group in ConnectionGroup::ALL {
            let cfg = self.group(group);
            if cfg.lane_types.is_empty() {
                return Err(CoreError::Config(format!("{group} group has an empty lane type mask")));
            }
            if cfg.vehicle_types.is_empty() {
                return Err(CoreError::Config(format!("{group} group has an empty vehicle type mask")));
            }
        }
        if !self.turn_angle_margin.is_finite() {
            return Err(CoreError::Config(format!(
                "turn_angle_margin must be finite, got {}",
                self.turn_angle_margin
            )));
        }
        Ok(())
    }
}
