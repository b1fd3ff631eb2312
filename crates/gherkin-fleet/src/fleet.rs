//! Goal distribution over a fleet of robot units.

use std::sync::Arc;

use tracing::{debug, info, warn};

use gherkin_kinematics::Goal;

use crate::error::FleetError;
use crate::ledger::GoalLedger;
use crate::observer::Observer;
use crate::report::FleetReport;
use crate::robot::{PendingReach, RobotHandle};

/// Owns the robots of one fleet run and hands goals out to them.
pub struct FleetManager {
    robots: Vec<RobotHandle>,
    ledger: GoalLedger,
    pending: Vec<PendingReach>,
    observer: Option<Arc<dyn Observer>>,
}

impl FleetManager {
    /// Take ownership of `robots`, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::EmptyFleet)` for an empty list and
    /// `Err(FleetError::DuplicateRobot)` if two robots share an id.
    pub fn new(
        robots: Vec<RobotHandle>,
        observer: Option<Arc<dyn Observer>>,
    ) -> Result<Self, FleetError> {
        if robots.is_empty() {
            return Err(FleetError::EmptyFleet);
        }
        let ledger = GoalLedger::new(robots.iter().map(RobotHandle::id))?;
        info!(robots = robots.len(), observed = observer.is_some(), "Fleet ready");
        Ok(FleetManager {
            robots,
            ledger,
            pending: Vec::new(),
            observer,
        })
    }

    pub fn ledger(&self) -> &GoalLedger {
        &self.ledger
    }

    /// Robot that would get `goal` if it were dispatched now.
    pub fn select_robot(&self, goal: &Goal) -> Option<&str> {
        self.ledger.select(goal)
    }

    /// Assign `goal` to a robot and queue it there without waiting.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::RobotUnavailable)` if the chosen robot no
    /// longer accepts goals.
    pub fn receive_goal(&mut self, goal: Goal) -> Result<(), FleetError> {
        let robot_id = self
            .ledger
            .select(&goal)
            .ok_or(FleetError::EmptyFleet)?
            .to_owned();
        let robot = self
            .robots
            .iter()
            .find(|r| r.id() == robot_id)
            .ok_or_else(|| FleetError::RobotUnavailable(robot_id.clone()))?;

        let pending = robot.reach(goal, self.observer.clone())?;
        self.ledger.record(&robot_id, goal);
        debug!(robot = %robot_id, %goal, "Goal dispatched");
        self.pending.push(pending);
        Ok(())
    }

    /// Run a batch of goals to completion and shut the fleet down.
    ///
    /// Every goal is dispatched first, then replies are collected in
    /// submission order. The robots and the observer are released whether or
    /// not the run succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::Dispatch)` carrying every result received so
    /// far if a robot dies mid-run or is gone before a goal reaches it. No
    /// further goals are dispatched after that. Returns
    /// `Err(FleetError::Shutdown)` if a robot thread cannot be joined.
    pub async fn receive_goals<I>(mut self, goals: I) -> Result<FleetReport, FleetError>
    where
        I: IntoIterator<Item = Goal>,
    {
        let outcome = self.run(goals).await;
        let finalized = self.finalize().await;
        let report = outcome?;
        finalized?;
        info!(
            total = report.total(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Fleet run complete"
        );
        Ok(report)
    }

    async fn run<I>(&mut self, goals: I) -> Result<FleetReport, FleetError>
    where
        I: IntoIterator<Item = Goal>,
    {
        let mut lost = None;
        for goal in goals {
            match self.receive_goal(goal) {
                Ok(()) => {}
                Err(FleetError::RobotUnavailable(robot_id)) => {
                    warn!(robot = %robot_id, %goal, "Robot gone before dispatch, no more goals sent");
                    lost = Some(robot_id);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        info!(goals = self.pending.len(), "Goals dispatched");

        let mut report = FleetReport::new();
        let mut pending = std::mem::take(&mut self.pending).into_iter();
        while let Some(reach) = pending.next() {
            match reach.wait().await {
                Ok(result) => report.push(result),
                Err(FleetError::Dispatch { robot_id, .. }) => {
                    warn!(robot = %robot_id, "Robot died before replying, aborting run");
                    // Replies already delivered further down the line still count.
                    for rest in pending.by_ref() {
                        if let Some(result) = rest.try_take() {
                            report.push(result);
                        }
                    }
                    lost.get_or_insert(robot_id);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        match lost {
            Some(robot_id) => Err(FleetError::Dispatch {
                robot_id,
                completed: report,
            }),
            None => Ok(report),
        }
    }

    async fn finalize(&mut self) -> Result<(), FleetError> {
        // Dropping the receivers lets robots skip goals nobody waits for.
        self.pending.clear();

        let mut failure = None;
        for robot in self.robots.drain(..) {
            if let Err(e) = robot.shutdown().await {
                warn!(error = %e, "Robot shutdown failed");
                failure.get_or_insert(e);
            }
        }
        if let Some(observer) = self.observer.take() {
            observer.release();
        }
        debug!("Fleet finalized");
        failure.map_or(Ok(()), Err)
    }
}
