//! Per-robot control loop: rotate the base toward the goal heading, then
//! converge the arm on the goal position.

use std::cmp::Ordering;
use std::time::Duration;

use spin_sleep::SpinSleeper;
use tracing::{debug, info, trace, warn};

use gherkin_kinematics::angle::HALF_TURN;
use gherkin_kinematics::{
    Arm, Direction, Goal, JointAngles, KinematicsError, Position, RotatingBase, Rotation, Speed,
};

use crate::observer::{Liveness, Observer, Phase, RobotSnapshot};
use crate::params::{ControlParams, RobotConfig};
use crate::report::ReachResult;

/// States of one reach attempt.
#[derive(Debug)]
enum ControlState {
    EvaluatingGoal(Goal),
    Rotating { goal: Goal, target: JointAngles },
    Translating { goal: Goal, target: JointAngles },
    Succeeded(Goal),
    Failed(Goal, KinematicsError),
}

/// Drives one robot (a rotating base plus a two-link arm) toward goals.
///
/// The controller is the only writer of its arm and base. Every control cycle
/// blocks the calling thread for the configured actuation time, so it is
/// meant to run on a thread of its own (see [`crate::RobotHandle`]).
pub struct RobotController {
    id: String,
    arm: Arm,
    base: RotatingBase,
    params: ControlParams,
    sleeper: SpinSleeper,
}

impl RobotController {
    /// Build a controller from a [`RobotConfig`], base facing 0°.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidLinkLength)` if a link length is
    /// not positive.
    pub fn new(id: impl Into<String>, config: RobotConfig) -> Result<Self, KinematicsError> {
        let arm = config.arm()?;
        let base = RotatingBase::new(Default::default(), config.rotation);
        Ok(Self::from_parts(id, arm, base, config.control))
    }

    /// Build a controller around an existing arm and base.
    pub fn from_parts(id: impl Into<String>, arm: Arm, base: RotatingBase, params: ControlParams) -> Self {
        RobotController {
            id: id.into(),
            arm,
            base,
            params,
            sleeper: SpinSleeper::new(1_000),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn arm(&self) -> &Arm {
        &self.arm
    }

    pub fn base(&self) -> &RotatingBase {
        &self.base
    }

    /// Run one goal to completion.
    ///
    /// Per-goal errors never escape: an unreachable goal or a failed
    /// kinematics evaluation ends the attempt with a failed result, and the
    /// controller stays usable for the next goal. The joint history is reset
    /// whatever the outcome.
    pub fn reach(&mut self, goal: Goal, observer: Option<&dyn Observer>) -> ReachResult {
        info!(%goal, heading = %self.base.angle(), "Reach started");
        let mut observer = observer;
        let mut cycles = 0usize;
        let mut state = ControlState::EvaluatingGoal(goal);

        let result = loop {
            state = match state {
                ControlState::EvaluatingGoal(requested) => {
                    let goal = self.evaluate_goal(requested);
                    if goal != requested {
                        debug!(%requested, %goal, "Facing transform applied");
                    }
                    match self.arm.inverse(goal.x as f64, goal.y as f64) {
                        Ok(target) => {
                            debug!(%target, "Joint target solved, rotating");
                            ControlState::Rotating { goal, target }
                        }
                        Err(e) => ControlState::Failed(goal, e),
                    }
                }
                ControlState::Rotating { goal, target } => {
                    if self.check_angle(&goal) {
                        debug!(heading = %self.base.angle(), cycles, "Base aligned, translating");
                        ControlState::Translating { goal, target }
                    } else {
                        let rotation = self.determine_rotation(&goal);
                        self.rotate(rotation);
                        cycles += 1;
                        trace!(%rotation, heading = %self.base.angle(), "Rotation cycle");
                        self.publish(&mut observer, &goal, Phase::Rotating, false);
                        ControlState::Rotating { goal, target }
                    }
                }
                ControlState::Translating { goal, target } => {
                    cycles += 1;
                    match self.move_arm(target).and_then(|()| self.check_success(&goal)) {
                        Ok(success) => {
                            trace!(joints = %self.arm.joints(), tip = %self.arm.tip(), "Translation cycle");
                            self.publish(&mut observer, &goal, Phase::Translating, success);
                            if success {
                                ControlState::Succeeded(goal)
                            } else {
                                ControlState::Translating { goal, target }
                            }
                        }
                        Err(e) => ControlState::Failed(goal, e),
                    }
                }
                ControlState::Succeeded(goal) => break ReachResult::succeeded(&self.id, goal),
                ControlState::Failed(goal, e) => break ReachResult::failed(&self.id, goal, e),
            };
        };

        self.arm.clear_history();
        match &result.error {
            None => info!(goal = %result.goal, cycles, tip = %self.arm.tip(), "Goal reached"),
            Some(e) => warn!(goal = %result.goal, cycles, error = %e, "Goal failed"),
        }
        result
    }

    /// Facing transform.
    ///
    /// The arm reaches equally well with the base facing the goal heading or
    /// its inverse, so pick whichever is nearer the current heading. When
    /// the chosen heading points behind the base (above 180°) a negative x is
    /// mirrored so the arm solve agrees with the facing.
    pub fn evaluate_goal(&self, goal: Goal) -> Goal {
        let heading = self.base.angle();
        let inverse = goal.angle.inverse();
        let keep = match heading.distance(goal.angle).cmp(&heading.distance(inverse)) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => heading + 90 >= goal.angle,
        };
        let optimal = if keep { goal.angle } else { inverse };
        let x = if optimal.degrees() > HALF_TURN && goal.x < 0 {
            -goal.x
        } else {
            goal.x
        };
        Goal::new(x, goal.y, optimal)
    }

    /// Whether the base faces the goal heading, directly or mirrored.
    pub fn check_angle(&self, goal: &Goal) -> bool {
        let heading = self.base.angle();
        heading == goal.angle || heading.inverse() == goal.angle
    }

    /// Shortest-arc rotation toward the goal heading. A half turn goes
    /// counter-clockwise.
    pub fn determine_rotation(&self, goal: &Goal) -> Rotation {
        let heading = self.base.angle();
        let direction = if (goal.angle - heading).degrees() < HALF_TURN {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        let speed = if heading.distance(goal.angle) > self.base.limits().fast_threshold() {
            Speed::Fast
        } else {
            Speed::Fine
        };
        Rotation::new(direction, speed)
    }

    /// Whether the arm tip is within tolerance of the goal position.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonFinitePosition)` if the forward
    /// kinematics cannot be evaluated for the current joints.
    pub fn check_success(&self, goal: &Goal) -> Result<bool, KinematicsError> {
        let joints = self.arm.joints();
        let tip = self.arm.try_forward(joints.theta0, joints.theta1)?;
        let target = Position::new(goal.x as f64, goal.y as f64);
        Ok(tip.distance_to(target) <= self.params.tolerance)
    }

    fn rotate(&mut self, rotation: Rotation) {
        self.base.apply(rotation);
        self.pause(self.base.limits().step_duration);
    }

    fn move_arm(&mut self, target: JointAngles) -> Result<(), KinematicsError> {
        let current = self.arm.joints();
        let gain = self.params.gain;
        self.arm.set_joints(JointAngles::new(
            current.theta0 + (target.theta0 - current.theta0) / gain,
            current.theta1 + (target.theta1 - current.theta1) / gain,
        ));
        self.pause(self.params.arm_step);
        if let Some(limits) = &self.params.joint_limits {
            limits.check(self.arm.history())?;
        }
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            self.sleeper.sleep(duration);
        }
    }

    fn publish(&self, observer: &mut Option<&dyn Observer>, goal: &Goal, phase: Phase, success: bool) {
        let Some(obs) = observer else {
            return;
        };
        let snapshot = RobotSnapshot {
            robot_id: self.id.clone(),
            base_angle: self.base.angle(),
            joints: self.arm.joints(),
            elbow: self.arm.elbow(),
            tip: self.arm.tip(),
            goal: *goal,
            phase,
            success,
        };
        if obs.observe(&snapshot) == Liveness::Stop {
            debug!("Observer stopped, continuing headless");
            *observer = None;
        }
    }
}
