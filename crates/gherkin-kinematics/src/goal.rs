//! Target descriptors handed to a robot.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Angle;

/// A target pose in the robot-local frame: integer offsets from the base
/// origin plus the heading the base should face.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Goal {
    /// Signed x offset from the robot origin.
    pub x: i32,
    /// Signed y offset from the robot origin.
    pub y: i32,
    /// Heading of the base.
    pub angle: Angle,
}

/// A cheap proximity key between two goals, ordered lexicographically as
/// `(|dx|, |dy|, angle_diff)`.
///
/// The angular term is the wrapped difference `self.angle - other.angle`, not
/// an absolute distance, so it is not symmetric in its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalDifference(pub u32, pub u32, pub Angle);

impl Goal {
    /// Construct a new goal.
    pub const fn new(x: i32, y: i32, angle: Angle) -> Self {
        Goal { x, y, angle }
    }

    /// Proximity key from `other` to `self`.
    pub fn difference(&self, other: &Goal) -> GoalDifference {
        GoalDifference(
            self.x.abs_diff(other.x),
            self.y.abs_diff(other.y),
            self.angle - other.angle,
        )
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {}, y: {}, heading: {})", self.x, self.y, self.angle)
    }
}
