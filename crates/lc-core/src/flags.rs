//! Small bit-set types describing lanes and lane arrows.
//!
//! The host reports lane and vehicle types as bit masks; a connection group
//! accepts a lane when both masks intersect the group's configured masks.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Generate a bit-set newtype with named single-bit constants.
macro_rules! flag_set {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($inner:ty) {
            $( $(#[$fattr:meta])* const $flag:ident = $bits:expr; )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            pub const NONE: $name = $name(0);
            $( $(#[$fattr])* pub const $flag: $name = $name($bits); )*

            const NAMES: &'static [(&'static str, $name)] = &[
                $( (stringify!($flag), $name($bits)), )*
            ];

            #[inline]
            pub const fn bits(self) -> $inner {
                self.0
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// All bits of `other` are set in `self`.
            #[inline]
            pub const fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            /// At least one bit is shared.
            #[inline]
            pub const fn intersects(self, other: $name) -> bool {
                self.0 & other.0 != 0
            }
        }

        impl BitOr for $name {
            type Output = $name;
            #[inline]
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            #[inline]
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = $name;
            #[inline]
            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }

        impl Not for $name {
            type Output = $name;
            #[inline]
            fn not(self) -> $name {
                $name(!self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_empty() {
                    return f.write_str("NONE");
                }
                let mut first = true;
                for (name, flag) in Self::NAMES {
                    if self.contains(*flag) {
                        if !first {
                            f.write_str("|")?;
                        }
                        f.write_str(name)?;
                        first = false;
                    }
                }
                Ok(())
            }
        }
    };
}

flag_set! {
    /// Kind of strand a lane is.
    pub struct LaneTypes(u8) {
        const VEHICLE           = 1 << 0;
        const PEDESTRIAN        = 1 << 1;
        const PARKING           = 1 << 2;
        const TRANSPORT_VEHICLE = 1 << 3;
        const CARGO_VEHICLE     = 1 << 4;
    }
}

flag_set! {
    /// Vehicles allowed on a lane.
    pub struct VehicleTypes(u16) {
        const CAR        = 1 << 0;
        const METRO      = 1 << 1;
        const TRAIN      = 1 << 2;
        const TRAM       = 1 << 3;
        const MONORAIL   = 1 << 4;
        const BICYCLE    = 1 << 5;
        const TROLLEYBUS = 1 << 6;
        const CABLE_CAR  = 1 << 7;
    }
}

flag_set! {
    /// Travel direction of a lane relative to its segment (start → end is
    /// `FORWARD`).
    pub struct LaneDirection(u8) {
        const FORWARD  = 1 << 0;
        const BACKWARD = 1 << 1;
    }
}

impl LaneDirection {
    pub const BOTH: LaneDirection = LaneDirection(Self::FORWARD.0 | Self::BACKWARD.0);

    /// Swap forward and backward, as for a segment flagged inverted.
    #[inline]
    pub const fn invert(self) -> LaneDirection {
        let fwd = self.0 & Self::FORWARD.0;
        let bwd = self.0 & Self::BACKWARD.0;
        LaneDirection((fwd << 1) | (bwd >> 1))
    }
}

flag_set! {
    /// Turn arrows painted on a lane.
    pub struct LaneArrows(u8) {
        const LEFT    = 1 << 0;
        const FORWARD = 1 << 1;
        const RIGHT   = 1 << 2;
    }
}

/// Relative direction from one segment end into another segment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArrowDirection {
    /// The segments do not meet.
    #[default]
    None,
    Left,
    Forward,
    Right,
    /// Back into the same segment, or a near-reversal.
    Turn,
}

impl ArrowDirection {
    /// Arrow bit for this direction; U-turns use the left arrow in
    /// right-hand traffic and the right arrow in left-hand traffic.
    pub fn arrow(self, left_hand_traffic: bool) -> LaneArrows {
        match self {
            ArrowDirection::None    => LaneArrows::NONE,
            ArrowDirection::Left    => LaneArrows::LEFT,
            ArrowDirection::Forward => LaneArrows::FORWARD,
            ArrowDirection::Right   => LaneArrows::RIGHT,
            ArrowDirection::Turn if left_hand_traffic => LaneArrows::RIGHT,
            ArrowDirection::Turn    => LaneArrows::LEFT,
        }
    }
}
