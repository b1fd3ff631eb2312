//! Tunable parameters of a robot.

use std::time::Duration;

use gherkin_kinematics::{Arm, JointLimits, KinematicsError, RotationLimits};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the arm convergence loop.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Euclidean distance from the goal at which the tip counts as arrived.
    pub tolerance: f64,
    /// Each cycle removes `1 / gain` of the remaining joint error.
    pub gain: f64,
    /// Actuation time of one arm cycle.
    pub arm_step: Duration,
    /// Joint limits to enforce on every arm cycle. Off unless set.
    pub joint_limits: Option<JointLimits>,
}

impl Default for ControlParams {
    fn default() -> Self {
        ControlParams {
            tolerance: 0.25,
            gain: 10.0,
            arm_step: Duration::from_millis(33),
            joint_limits: None,
        }
    }
}

/// Everything needed to build one robot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotConfig {
    pub link1: f64,
    pub link2: f64,
    pub rotation: RotationLimits,
    pub control: ControlParams,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            link1: 75.0,
            link2: 50.0,
            rotation: RotationLimits::default(),
            control: ControlParams::default(),
        }
    }
}

impl RobotConfig {
    /// Same configuration with every actuation pause removed. Useful for
    /// tests and batch runs where real-time pacing is irrelevant.
    pub fn unpaced(mut self) -> Self {
        self.rotation.step_duration = Duration::ZERO;
        self.control.arm_step = Duration::ZERO;
        self
    }

    pub fn arm(&self) -> Result<Arm, KinematicsError> {
        Arm::new(self.link1, self.link2)
    }
}
