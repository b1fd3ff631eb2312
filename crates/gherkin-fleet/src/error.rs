//! This module defines the error types used by the `gherkin-fleet` crate.

use std::fmt;
use std::io;

use crate::report::FleetReport;

/// Error type for fleet-level operations.
///
/// Per-goal failures never show up here: they are recovered by the robot and
/// reported as failed [`crate::ReachResult`]s.
#[derive(Debug)]
pub enum FleetError {
    /// A fleet was built without any robots.
    EmptyFleet,
    /// Two robots were registered under the same id.
    DuplicateRobot(String),
    /// The robot's mailbox was closed when a goal was dispatched to it.
    RobotUnavailable(String),
    /// The OS refused to start a robot thread.
    Spawn(io::Error),
    /// A robot unit died before replying. The remaining wait was aborted;
    /// `completed` holds the results gathered until then.
    Dispatch {
        /// The robot whose reply was lost.
        robot_id: String,
        /// Results that had already been received.
        completed: FleetReport,
    },
    /// A robot thread panicked and could not be joined cleanly.
    Shutdown(String),
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::EmptyFleet => write!(f, "Fleet has no robots"),
            FleetError::DuplicateRobot(id) => write!(f, "Robot id registered twice: {}", id),
            FleetError::RobotUnavailable(id) => write!(f, "Robot {} is no longer accepting goals", id),
            FleetError::Spawn(e) => write!(f, "Failed to spawn robot thread: {}", e),
            FleetError::Dispatch { robot_id, completed } => write!(
                f,
                "Robot {} stopped before reporting a result ({} results completed)",
                robot_id,
                completed.total()
            ),
            FleetError::Shutdown(id) => write!(f, "Robot {} did not shut down cleanly", id),
        }
    }
}

impl std::error::Error for FleetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FleetError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FleetError {
    fn from(e: io::Error) -> Self {
        FleetError::Spawn(e)
    }
}
