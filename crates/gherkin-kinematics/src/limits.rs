//! Optional joint range, velocity and acceleration limits.
//!
//! These limits are not enforced by default. A controller may opt in by
//! checking the arm's joint history after every step.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{JointAngles, KinematicsError, LimitKind};

/// Physical limits of the arm joints.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    /// Exclusive `(min, max)` joint angle range (rad).
    pub range: (f64, f64),
    /// Maximum absolute joint velocity (rad/s).
    pub max_velocity: f64,
    /// Maximum absolute joint acceleration (rad/s²).
    pub max_acceleration: f64,
    /// Sample period of the joint history (s).
    pub dt: f64,
}

impl Default for JointLimits {
    fn default() -> Self {
        JointLimits {
            range: (-6.28, 6.28),
            max_velocity: 15.0,
            max_acceleration: 50.0,
            dt: 0.033,
        }
    }
}

impl JointLimits {
    /// Whether `theta` lies strictly inside the joint range.
    pub fn check_range(&self, theta: f64) -> bool {
        self.range.0 < theta && theta < self.range.1
    }

    /// Largest absolute first difference of `samples` divided by `dt`,
    /// or `0.0` for fewer than two samples.
    pub fn max_velocity(&self, samples: impl IntoIterator<Item = f64>) -> f64 {
        let mut prev: Option<f64> = None;
        let mut max = 0.0_f64;
        for s in samples {
            if let Some(p) = prev {
                max = max.max(((s - p) / self.dt).abs());
            }
            prev = Some(s);
        }
        max
    }

    /// Largest absolute second difference of `samples` divided by `dt²`,
    /// or `0.0` for fewer than three samples.
    pub fn max_acceleration(&self, samples: impl IntoIterator<Item = f64>) -> f64 {
        let mut window: [Option<f64>; 2] = [None, None];
        let mut max = 0.0_f64;
        for s in samples {
            if let [Some(a), Some(b)] = window {
                let second_diff = (s - b) - (b - a);
                max = max.max((second_diff / self.dt / self.dt).abs());
            }
            window = [window[1], Some(s)];
        }
        max
    }

    /// Check the latest joint state and the whole history against the limits.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::JointLimitExceeded)` for the first
    /// violation found, checking joint 0 before joint 1.
    pub fn check(&self, history: &[JointAngles]) -> Result<(), KinematicsError> {
        let Some(latest) = history.last() else {
            return Ok(());
        };
        let joints: [(usize, f64, fn(&JointAngles) -> f64); 2] = [
            (0, latest.theta0, |j: &JointAngles| j.theta0),
            (1, latest.theta1, |j: &JointAngles| j.theta1),
        ];
        for (joint, value, pick) in joints {
            if !self.check_range(value) {
                return Err(KinematicsError::JointLimitExceeded {
                    joint,
                    kind: LimitKind::Range,
                    value,
                });
            }
            let velocity = self.max_velocity(history.iter().map(pick));
            if velocity >= self.max_velocity {
                return Err(KinematicsError::JointLimitExceeded {
                    joint,
                    kind: LimitKind::Velocity,
                    value: velocity,
                });
            }
            let acceleration = self.max_acceleration(history.iter().map(pick));
            if acceleration >= self.max_acceleration {
                return Err(KinematicsError::JointLimitExceeded {
                    joint,
                    kind: LimitKind::Acceleration,
                    value: acceleration,
                });
            }
        }
        Ok(())
    }
}
