//! Control and coordination of a fleet of rotating-base manipulators.
//!
//! Every robot runs a [`RobotController`] on its own thread behind a
//! [`RobotHandle`]. A [`FleetManager`] assigns goals to robots with the
//! [`GoalLedger`] heuristic and gathers their [`ReachResult`]s into a
//! [`FleetReport`].

pub mod controller;
pub mod error;
pub mod fleet;
pub mod goal_source;
pub mod ledger;
pub mod observer;
pub mod params;
pub mod report;
pub mod robot;

pub use controller::RobotController;
pub use error::FleetError;
pub use fleet::FleetManager;
pub use goal_source::GoalGenerator;
pub use ledger::GoalLedger;
pub use observer::{Liveness, Observer, Phase, RobotSnapshot};
pub use params::{ControlParams, RobotConfig};
pub use report::{FleetReport, ReachResult};
pub use robot::{PendingReach, RobotHandle};
