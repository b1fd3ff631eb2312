//! A robot as an isolated unit of execution.
//!
//! Each robot runs on its own OS thread which exclusively owns the
//! [`RobotController`]. The only way in is the robot's mailbox; the only way
//! out is a one-shot reply per goal.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, info_span};

use gherkin_kinematics::Goal;

use crate::controller::RobotController;
use crate::error::FleetError;
use crate::observer::Observer;
use crate::report::ReachResult;

enum Command {
    Reach {
        goal: Goal,
        observer: Option<Arc<dyn Observer>>,
        reply: oneshot::Sender<ReachResult>,
    },
}

/// Opaque handle to a running robot.
pub struct RobotHandle {
    id: String,
    mailbox: mpsc::UnboundedSender<Command>,
    thread: JoinHandle<()>,
}

/// A goal in flight on some robot.
pub struct PendingReach {
    robot_id: String,
    reply: oneshot::Receiver<ReachResult>,
}

impl RobotHandle {
    /// Start a robot thread around `controller`.
    pub fn spawn(controller: RobotController) -> Result<Self, FleetError> {
        let id = controller.id().to_owned();
        let (mailbox, inbox) = mpsc::unbounded_channel();
        let thread = thread::Builder::new()
            .name(format!("robot-{}", id))
            .spawn(move || run(controller, inbox))?;
        Ok(RobotHandle { id, mailbox, thread })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue a goal without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::RobotUnavailable)` if the robot thread has
    /// already exited.
    pub fn reach(
        &self,
        goal: Goal,
        observer: Option<Arc<dyn Observer>>,
    ) -> Result<PendingReach, FleetError> {
        let (reply, rx) = oneshot::channel();
        self.mailbox
            .send(Command::Reach { goal, observer, reply })
            .map_err(|_| FleetError::RobotUnavailable(self.id.clone()))?;
        Ok(PendingReach {
            robot_id: self.id.clone(),
            reply: rx,
        })
    }

    /// Close the mailbox and wait for the thread to finish the goals it has
    /// already accepted.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::Shutdown)` if the robot thread panicked.
    pub async fn shutdown(self) -> Result<(), FleetError> {
        let RobotHandle { id, mailbox, thread } = self;
        drop(mailbox);
        let joined = tokio::task::spawn_blocking(move || thread.join()).await;
        match joined {
            Ok(Ok(())) => {
                debug!(robot = %id, "Robot stopped");
                Ok(())
            }
            _ => Err(FleetError::Shutdown(id)),
        }
    }
}

impl PendingReach {
    pub fn robot_id(&self) -> &str {
        &self.robot_id
    }

    /// The result, if the robot has already delivered it.
    pub fn try_take(mut self) -> Option<ReachResult> {
        self.reply.try_recv().ok()
    }

    /// Wait for the robot to finish this goal.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::Dispatch)` if the robot died before replying.
    /// The error's `completed` report is empty; the caller fills it in.
    pub async fn wait(self) -> Result<ReachResult, FleetError> {
        let PendingReach { robot_id, reply } = self;
        reply.await.map_err(|_| FleetError::Dispatch {
            robot_id,
            completed: Default::default(),
        })
    }
}

fn run(mut controller: RobotController, mut inbox: mpsc::UnboundedReceiver<Command>) {
    let span = info_span!("robot", id = %controller.id());
    let _guard = span.enter();
    info!("Robot started");

    while let Some(command) = inbox.blocking_recv() {
        match command {
            Command::Reach { goal, observer, reply } => {
                if reply.is_closed() {
                    debug!(%goal, "Nobody is waiting for this goal, skipping");
                    continue;
                }
                let result = controller.reach(goal, observer.as_deref());
                if reply.send(result).is_err() {
                    debug!(%goal, "Result dropped, nobody is waiting");
                }
            }
        }
    }

    info!("Mailbox closed, robot exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RobotConfig;
    use gherkin_kinematics::Angle;

    fn spawn(id: &str) -> RobotHandle {
        let controller = RobotController::new(id, RobotConfig::default().unpaced()).unwrap();
        RobotHandle::spawn(controller).unwrap()
    }

    #[tokio::test]
    async fn test_robot_processes_goals_in_order() {
        let robot = spawn("r1");
        assert_eq!(robot.id(), "r1");
        let first = robot.reach(Goal::new(60, 80, Angle::new(40)), None).unwrap();
        let second = robot.reach(Goal::new(0, 0, Angle::new(0)), None).unwrap();
        let third = robot.reach(Goal::new(100, 0, Angle::new(0)), None).unwrap();
        assert_eq!(first.robot_id(), "r1");

        let first = first.wait().await.unwrap();
        let second = second.wait().await.unwrap();
        let third = third.wait().await.unwrap();
        assert!(first.success);
        assert!(!second.success);
        assert!(third.success);
        assert!(first.completed_at <= second.completed_at);
        assert!(second.completed_at <= third.completed_at);

        robot.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_pending_is_skipped() {
        let robot = spawn("r2");
        drop(robot.reach(Goal::new(60, 80, Angle::new(40)), None).unwrap());
        let kept = robot.reach(Goal::new(100, 0, Angle::new(0)), None).unwrap();
        assert!(kept.wait().await.unwrap().success);
        robot.shutdown().await.unwrap();
    }
}
