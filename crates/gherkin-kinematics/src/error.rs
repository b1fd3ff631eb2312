#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while solving or evaluating
//! the arm kinematics.

use core::fmt;

/// Which finite-difference quantity of a joint exceeded its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// The joint angle left the allowed range.
    Range,
    /// The joint velocity exceeded the allowed maximum.
    Velocity,
    /// The joint acceleration exceeded the allowed maximum.
    Acceleration,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Range => f.write_str("range"),
            LimitKind::Velocity => f.write_str("velocity"),
            LimitKind::Acceleration => f.write_str("acceleration"),
        }
    }
}

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid link length.
    /// This variant is returned when a link length is provided that is not positive.
    InvalidLinkLength(&'static str),
    /// The target lies outside the reachable annulus of the arm, so the
    /// inverse kinematics has no real solution.
    UnreachableGoal {
        /// Target x in the robot-local frame.
        x: f64,
        /// Target y in the robot-local frame.
        y: f64,
    },
    /// Forward kinematics produced (or was fed) a non-finite value.
    NonFinitePosition {
        /// Shoulder joint angle (rad).
        theta0: f64,
        /// Elbow joint angle (rad).
        theta1: f64,
    },
    /// A joint violated one of the optional joint limits.
    JointLimitExceeded {
        /// Joint index, `0` for the shoulder and `1` for the elbow.
        joint: usize,
        /// The quantity that was exceeded.
        kind: LimitKind,
        /// The offending value.
        value: f64,
    },
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidLinkLength(msg) => write!(f, "Invalid link length: {}", msg),
            KinematicsError::UnreachableGoal { x, y } => {
                write!(f, "Unreachable goal: ({:.2}, {:.2}) lies outside the reachable annulus", x, y)
            }
            KinematicsError::NonFinitePosition { theta0, theta1 } => write!(
                f,
                "Forward kinematics failed for joints (θ0: {}, θ1: {})",
                theta0, theta1
            ),
            KinematicsError::JointLimitExceeded { joint, kind, value } => {
                write!(f, "Joint {} {} limit exceeded: {:.3}", joint, kind, value)
            }
        }
    }
}

impl core::error::Error for KinematicsError {}
