//! Two-link planar arm geometry.

use alloc::vec::Vec;
use core::fmt;
use libm::{acos, atan2, cos, hypot, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::KinematicsError;

/// A point in the robot-local plane.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// x coordinate.
    pub x: f64,
    /// y coordinate.
    pub y: f64,
}

impl Position {
    /// Construct a new position.
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Position) -> f64 {
        hypot(self.x - other.x, self.y - other.y)
    }

    /// Distance from the robot origin.
    pub fn norm(&self) -> f64 {
        hypot(self.x, self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2})", self.x, self.y)
    }
}

/// Shoulder and elbow angles of the arm, in radians.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointAngles {
    /// Shoulder joint angle (rad), measured from the local x-axis.
    pub theta0: f64,
    /// Elbow joint angle (rad), relative to the first link.
    pub theta1: f64,
}

impl JointAngles {
    /// Construct joint angles.
    pub const fn new(theta0: f64, theta1: f64) -> Self {
        JointAngles { theta0, theta1 }
    }
}

impl fmt::Display for JointAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(θ0: {:.3} rad, θ1: {:.3} rad)", self.theta0, self.theta1)
    }
}

/// Two-link planar arm.
///
/// Holds the link lengths and the current joint state. Every joint write is
/// appended to a per-attempt history which the owner clears between goals.
/// The arm has no step function of its own: the controller moves the joints.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    link1: f64,
    link2: f64,
    joints: JointAngles,
    history: Vec<JointAngles>,
}

impl Default for Arm {
    fn default() -> Self {
        Arm {
            link1: 75.0,
            link2: 50.0,
            joints: JointAngles::default(),
            history: Vec::new(),
        }
    }
}

impl Arm {
    /// Construct an arm with both joints at zero.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidLinkLength)` if either link is not
    /// positive (or not finite).
    pub fn new(link1: f64, link2: f64) -> Result<Self, KinematicsError> {
        if !(link1 > 0.0 && link1.is_finite()) {
            return Err(KinematicsError::InvalidLinkLength("link1 must be positive"));
        }
        if !(link2 > 0.0 && link2.is_finite()) {
            return Err(KinematicsError::InvalidLinkLength("link2 must be positive"));
        }
        Ok(Arm {
            link1,
            link2,
            ..Arm::default()
        })
    }

    /// Length of the first (shoulder) link.
    pub fn link1(&self) -> f64 {
        self.link1
    }

    /// Length of the second (elbow) link.
    pub fn link2(&self) -> f64 {
        self.link2
    }

    /// Inner radius of the reachable annulus.
    pub fn min_reachable_radius(&self) -> f64 {
        (self.link1 - self.link2).max(0.0)
    }

    /// Outer radius of the reachable annulus.
    pub fn max_reachable_radius(&self) -> f64 {
        self.link1 + self.link2
    }

    /// Current joint angles.
    pub fn joints(&self) -> JointAngles {
        self.joints
    }

    /// Write both joints, recording the new state in the history.
    pub fn set_joints(&mut self, joints: JointAngles) {
        self.history.push(joints);
        self.joints = joints;
    }

    /// Joint states written since the history was last cleared.
    pub fn history(&self) -> &[JointAngles] {
        &self.history
    }

    /// Forget the joint history of the current attempt.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Tip position for the given joint angles.
    pub fn forward(&self, theta0: f64, theta1: f64) -> Position {
        Position {
            x: self.link1 * cos(theta0) + self.link2 * cos(theta0 + theta1),
            y: self.link1 * sin(theta0) + self.link2 * sin(theta0 + theta1),
        }
    }

    /// Tip position for the given joint angles, rejecting non-finite results.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonFinitePosition)` if the joints or the
    /// resulting position are NaN or infinite.
    pub fn try_forward(&self, theta0: f64, theta1: f64) -> Result<Position, KinematicsError> {
        let position = self.forward(theta0, theta1);
        if position.x.is_finite() && position.y.is_finite() {
            Ok(position)
        } else {
            Err(KinematicsError::NonFinitePosition { theta0, theta1 })
        }
    }

    /// Elbow-solution joint angles placing the tip at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::UnreachableGoal)` when the target lies
    /// outside the reachable annulus.
    pub fn inverse(&self, x: f64, y: f64) -> Result<JointAngles, KinematicsError> {
        let (l1, l2) = (self.link1, self.link2);
        let cos_theta1 = (x * x + y * y - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
        if !(-1.0..=1.0).contains(&cos_theta1) {
            return Err(KinematicsError::UnreachableGoal { x, y });
        }
        let theta1 = acos(cos_theta1);
        let theta0 = atan2(y, x) - atan2(l2 * sin(theta1), l1 + l2 * cos(theta1));
        Ok(JointAngles { theta0, theta1 })
    }

    /// Position of the elbow (joint 1) in the current state.
    pub fn elbow(&self) -> Position {
        Position {
            x: self.link1 * cos(self.joints.theta0),
            y: self.link1 * sin(self.joints.theta0),
        }
    }

    /// Position of the tip (joint 2) in the current state.
    pub fn tip(&self) -> Position {
        self.forward(self.joints.theta0, self.joints.theta1)
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arm (l1: {:.1}, l2: {:.1}) at {}", self.link1, self.link2, self.joints)
    }
}
