//! The single-axis rotating base carrying the arm.

use core::fmt;
use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Angle;

/// Rotation direction of the base.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Increasing heading.
    Clockwise,
    /// Decreasing heading.
    CounterClockwise,
}

/// Rotation rate class of the base.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speed {
    /// Large steps, used while far from the target heading.
    Fast,
    /// Single-degree steps, used to zero in on the target heading.
    Fine,
}

/// A one-cycle rotation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation {
    /// Which way to turn.
    pub direction: Direction,
    /// How far to turn this cycle.
    pub speed: Speed,
}

impl Rotation {
    /// Construct a rotation command.
    pub const fn new(direction: Direction, speed: Speed) -> Self {
        Rotation { direction, speed }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.direction, self.speed)
    }
}

/// Physical limits of the base.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationLimits {
    /// Degrees moved per cycle at [`Speed::Fast`]. Also the angular distance
    /// above which the fast rate is used.
    pub fast_rate: i32,
    /// Degrees moved per cycle at [`Speed::Fine`].
    pub fine_rate: i32,
    /// Actuation time of one rotation cycle.
    pub step_duration: Duration,
}

impl Default for RotationLimits {
    fn default() -> Self {
        RotationLimits {
            fast_rate: 5,
            fine_rate: 1,
            step_duration: Duration::from_millis(66),
        }
    }
}

impl RotationLimits {
    /// Angular distance (degrees) above which [`Speed::Fast`] is selected.
    pub const fn fast_threshold(&self) -> i32 {
        self.fast_rate
    }
}

/// Rotating base state: the current heading of the base's "front".
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotatingBase {
    angle: Angle,
    limits: RotationLimits,
}

impl RotatingBase {
    /// Construct a base facing `angle`.
    pub const fn new(angle: Angle, limits: RotationLimits) -> Self {
        RotatingBase { angle, limits }
    }

    /// Current heading.
    pub fn angle(&self) -> Angle {
        self.angle
    }

    /// Physical limits of this base.
    pub fn limits(&self) -> &RotationLimits {
        &self.limits
    }

    /// Advance the heading by one cycle.
    ///
    /// Actuation pacing is left to the caller; see
    /// [`RotationLimits::step_duration`].
    pub fn rotate(&mut self, direction: Direction, speed: Speed) {
        let rate = match speed {
            Speed::Fast => self.limits.fast_rate,
            Speed::Fine => self.limits.fine_rate,
        };
        self.angle = match direction {
            Direction::Clockwise => self.angle + rate,
            Direction::CounterClockwise => self.angle - rate,
        };
    }

    /// Apply a [`Rotation`] command.
    pub fn apply(&mut self, rotation: Rotation) {
        self.rotate(rotation.direction, rotation.speed);
    }
}
