//! Four-way junction with a tram line running straight through.
//!
//! ```text
//!               N (0,120)
//!               |
//!  W (-120,0) ==C== (120,0) E      == tram track on W and E
//!               |
//!               S (0,-120)
//! ```
//!
//! West and south segments end at the centre; east and north start there.
//! Every arm carries one car lane each way; the west and east arms also
//! carry a tram lane running west → east, limited to 35° turns.

use lc_core::{LaneDirection, LaneId, NodeId, Position, SegmentId};
use lc_network::{InMemoryNetwork, LaneSpec, NetworkBuilder, NetworkResult, SegmentSpec};

const ARM_LENGTH_M: f32 = 120.0;
const TRAM_MAX_TURN_DEG: f32 = 35.0;

pub struct Junction {
    pub net:      InMemoryNetwork,
    pub center:   NodeId,
    pub seg_w:    SegmentId,
    pub seg_n:    SegmentId,
    /// Car lanes arriving at the centre: west, east, north, south.
    pub inbound:  [LaneId; 4],
    /// Car lanes leaving the centre: west, east, north, south.
    pub outbound: [LaneId; 4],
    /// Tram lanes: west (arriving), east (leaving).
    pub tram:     [LaneId; 2],
}

pub fn build_junction() -> NetworkResult<Junction> {
    let mut b = NetworkBuilder::new();
    let c = b.add_node(Position::new(0.0, 0.0))?;
    let w = b.add_node(Position::new(-ARM_LENGTH_M, 0.0))?;
    let e = b.add_node(Position::new(ARM_LENGTH_M, 0.0))?;
    let n = b.add_node(Position::new(0.0, ARM_LENGTH_M))?;
    let s = b.add_node(Position::new(0.0, -ARM_LENGTH_M))?;

    let rail = SegmentSpec::rail(TRAM_MAX_TURN_DEG);
    let seg_w = b.add_segment_with(w, c, rail)?;
    let seg_e = b.add_segment_with(c, e, rail)?;
    let seg_n = b.add_segment(c, n)?;
    let seg_s = b.add_segment(s, c)?;

    let fwd = LaneSpec::car(LaneDirection::FORWARD);
    let bwd = LaneSpec::car(LaneDirection::BACKWARD);
    // Forward runs start → end: inbound on W/S, outbound on E/N.
    let w_in = b.add_lane(seg_w, fwd)?;
    let w_out = b.add_lane(seg_w, bwd)?;
    let e_out = b.add_lane(seg_e, fwd)?;
    let e_in = b.add_lane(seg_e, bwd)?;
    let n_out = b.add_lane(seg_n, fwd)?;
    let n_in = b.add_lane(seg_n, bwd)?;
    let s_in = b.add_lane(seg_s, fwd)?;
    let s_out = b.add_lane(seg_s, bwd)?;

    let tram_w = b.add_lane(seg_w, LaneSpec::tram(LaneDirection::FORWARD))?;
    let tram_e = b.add_lane(seg_e, LaneSpec::tram(LaneDirection::FORWARD))?;

    Ok(Junction {
        net: b.build(),
        center: c,
        seg_w,
        seg_n,
        inbound: [w_in, e_in, n_in, s_in],
        outbound: [w_out, e_out, n_out, s_out],
        tram: [tram_w, tram_e],
    })
}
