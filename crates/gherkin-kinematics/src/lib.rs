#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for the kinematics of a rotating-base, two-link planar manipulator."]
#![doc = ""]
#![doc = "This crate provides integer heading arithmetic, goal descriptors, the rotating base"]
#![doc = "actuator state and forward/inverse kinematics for the arm."]

extern crate alloc;

pub mod angle;
pub mod arm;
pub mod base;
pub mod error;
pub mod goal;
pub mod limits;

pub use angle::Angle;
pub use arm::{Arm, JointAngles, Position};
pub use base::{Direction, RotatingBase, Rotation, RotationLimits, Speed};
pub use error::{KinematicsError, LimitKind};
pub use goal::{Goal, GoalDifference};
pub use limits::JointLimits;
