//! Passive observation of robots while they work.
//!
//! An observer is handed a read-only snapshot after every control cycle and
//! answers with a liveness signal. It never influences the kinematics: a robot
//! without an observer behaves identically.

use gherkin_kinematics::{Angle, Goal, JointAngles, Position};

/// Control phase a snapshot was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The base is turning toward the goal heading.
    Rotating,
    /// The arm is converging on the goal position.
    Translating,
}

/// Read-only view of one robot after a control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotSnapshot {
    pub robot_id: String,
    pub base_angle: Angle,
    pub joints: JointAngles,
    pub elbow: Position,
    pub tip: Position,
    pub goal: Goal,
    pub phase: Phase,
    pub success: bool,
}

/// Reply of an observer to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Continue,
    /// The observer has gone away; the robot carries on without it.
    Stop,
}

/// Receives snapshots from every robot of a fleet, possibly concurrently.
pub trait Observer: Send + Sync {
    fn observe(&self, snapshot: &RobotSnapshot) -> Liveness;

    /// Called once when the fleet run is over.
    fn release(&self) {}
}
