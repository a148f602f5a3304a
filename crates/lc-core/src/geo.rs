//! Planar geometry for junction checks.
//!
//! Everything lives on the ground plane: `x` grows east, `z` grows north.
//! Segment-end directions point from the node *into* the segment, so two
//! collinear segments meeting at a node have opposite directions.

use std::ops::Neg;

use crate::ArrowDirection;

/// Default margin added to the turning-angle limit.
pub const TURN_ANGLE_MARGIN: f32 = 0.01;

/// Cosine above which a transition counts as going straight on (~60°).
const FORWARD_COS: f32 = 0.5;

/// Cosine below which a transition counts as a reversal (~154°).
const TURN_COS: f32 = -0.9;

/// A ground-plane position.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub z: f32,
}

impl Position {
    #[inline]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

/// A ground-plane direction.  Not necessarily unit length unless built via
/// [`Direction::between`] or [`Direction::normalized`].
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    pub x: f32,
    pub z: f32,
}

impl Direction {
    #[inline]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit direction from `from` towards `to`; zero if the points coincide.
    pub fn between(from: Position, to: Position) -> Self {
        Direction::new(to.x - from.x, to.z - from.z).normalized()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Direction::default();
        }
        Direction::new(self.x / len, self.z / len)
    }

    #[inline]
    pub fn dot(self, other: Direction) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// 2-D cross product; positive when `other` lies counter-clockwise
    /// (to the left) of `self`.
    #[inline]
    pub fn cross(self, other: Direction) -> f32 {
        self.x * other.z - self.z * other.x
    }

    /// Classify the move from travelling along `self` into travelling along
    /// `outgoing`.  Both should be unit length.
    pub fn classify_turn(self, outgoing: Direction) -> ArrowDirection {
        let dot = self.dot(outgoing);
        if dot >= FORWARD_COS {
            ArrowDirection::Forward
        } else if dot <= TURN_COS {
            ArrowDirection::Turn
        } else if self.cross(outgoing) > 0.0 {
            ArrowDirection::Left
        } else {
            ArrowDirection::Right
        }
    }
}

impl Neg for Direction {
    type Output = Direction;
    #[inline]
    fn neg(self) -> Direction {
        Direction::new(-self.x, -self.z)
    }
}

/// Whether a vehicle can physically turn from one segment end into another.
///
/// `source_dir`/`target_dir` are the segment-end directions at the shared
/// node; `*_max_turn_cos` are the segments' maximum-turn-angle cosines.  The
/// limit is `margin - min(cos_a, cos_b)`; a limit of 1 or more lets anything
/// through.
pub fn turning_angle_ok(
    source_dir:          Direction,
    source_max_turn_cos: f32,
    target_dir:          Direction,
    target_max_turn_cos: f32,
    margin:              f32,
) -> bool {
    let limit = margin - source_max_turn_cos.min(target_max_turn_cos);
    if limit < 1.0 {
        source_dir.dot(target_dir) < limit
    } else {
        true
    }
}
