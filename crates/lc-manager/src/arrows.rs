//! Lane arrows derived from connections, and the junction turning check.

use lc_core::{geo, ArrowDirection, LaneArrows, LaneId, SegmentId};
use lc_graph::ConnectionDataBase;
use lc_network::NetworkHost;

/// Arrows implied by the enabled edges leaving one lane end.
///
/// `None` means the lane end has no outgoing connection and the host should
/// fall back to its default arrows.  A dead-end yields `Some(NONE)`: the
/// lane is connected but leads nowhere.
pub fn arrows_for_connection<H: NetworkHost>(
    host:              &H,
    graph:             &ConnectionDataBase,
    lane:              LaneId,
    start_node:        bool,
    left_hand_traffic: bool,
) -> Option<LaneArrows> {
    if !graph.has_outgoing(lane, start_node) {
        return None;
    }
    let source_segment = host.lane_info(lane)?.segment;

    let mut arrows = LaneArrows::NONE;
    for target in graph.enabled_targets(lane, start_node).filter(|&t| t != lane) {
        let Some(target_info) = host.lane_info(target) else {
            continue;
        };
        let dir = if target_info.segment == source_segment {
            ArrowDirection::Turn
        } else {
            host.relative_direction(source_segment, start_node, target_info.segment)
        };
        arrows |= dir.arrow(left_hand_traffic);
    }
    Some(arrows)
}

/// Whether a vehicle can physically turn from one segment end into another
/// at the node they share.
///
/// The limit comes from the tighter of the two segments' maximum turn
/// angles plus `margin`.
pub fn check_segments_turning_angle<H: NetworkHost>(
    host:              &H,
    margin:            f32,
    source_segment:    SegmentId,
    source_start_node: bool,
    target_segment:    SegmentId,
    target_start_node: bool,
) -> bool {
    geo::turning_angle_ok(
        host.segment_end_direction(source_segment, source_start_node),
        host.max_turn_angle_cos(source_segment),
        host.segment_end_direction(target_segment, target_start_node),
        host.max_turn_angle_cos(target_segment),
        margin,
    )
}
