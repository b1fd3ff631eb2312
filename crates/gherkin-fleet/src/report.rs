//! Per-goal outcomes and their fleet-level aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use gherkin_kinematics::{Goal, KinematicsError};

/// Terminal outcome of one reach attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachResult {
    /// Robot that ran the attempt.
    pub robot_id: String,
    /// The goal after the facing transform.
    pub goal: Goal,
    /// Whether the tip converged on the goal.
    pub success: bool,
    /// Wall-clock completion time.
    pub completed_at: SystemTime,
    /// Why the attempt failed, if it did.
    pub error: Option<KinematicsError>,
}

impl ReachResult {
    pub(crate) fn succeeded(robot_id: &str, goal: Goal) -> Self {
        ReachResult {
            robot_id: robot_id.to_owned(),
            goal,
            success: true,
            completed_at: SystemTime::now(),
            error: None,
        }
    }

    pub(crate) fn failed(robot_id: &str, goal: Goal, error: KinematicsError) -> Self {
        ReachResult {
            robot_id: robot_id.to_owned(),
            goal,
            success: false,
            completed_at: SystemTime::now(),
            error: Some(error),
        }
    }
}

impl fmt::Display for ReachResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self
            .completed_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        match &self.error {
            None => write!(f, "[{}] {} reached at t={:.3}", self.robot_id, self.goal, at),
            Some(e) => write!(f, "[{}] {} failed at t={:.3}: {}", self.robot_id, self.goal, at, e),
        }
    }
}

/// Results of one fleet run, grouped by robot id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetReport {
    by_robot: BTreeMap<String, Vec<ReachResult>>,
}

impl FleetReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result under its robot id, keeping per-robot arrival order.
    pub fn push(&mut self, result: ReachResult) {
        self.by_robot.entry(result.robot_id.clone()).or_default().push(result);
    }

    /// Results of one robot, in the order they arrived.
    pub fn for_robot(&self, robot_id: &str) -> &[ReachResult] {
        self.by_robot.get(robot_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Robot ids that reported at least one result.
    pub fn robot_ids(&self) -> impl Iterator<Item = &str> {
        self.by_robot.keys().map(String::as_str)
    }

    /// Every result, grouped by robot id.
    pub fn iter(&self) -> impl Iterator<Item = &ReachResult> {
        self.by_robot.values().flatten()
    }

    /// Number of results.
    pub fn total(&self) -> usize {
        self.by_robot.values().map(Vec::len).sum()
    }

    /// Number of successful results.
    pub fn succeeded(&self) -> usize {
        self.iter().filter(|r| r.success).count()
    }

    /// Number of failed results.
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

impl FromIterator<ReachResult> for FleetReport {
    fn from_iter<I: IntoIterator<Item = ReachResult>>(iter: I) -> Self {
        let mut report = FleetReport::new();
        for result in iter {
            report.push(result);
        }
        report
    }
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fleet report: {} goals, {} succeeded, {} failed",
            self.total(),
            self.succeeded(),
            self.failed()
        )?;
        for (robot_id, results) in &self.by_robot {
            writeln!(f, "  robot {}:", robot_id)?;
            for result in results {
                writeln!(f, "    {}", result)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gherkin_kinematics::Angle;

    #[test]
    fn test_report_groups_by_robot() {
        let goal = Goal::new(50, 50, Angle::new(45));
        let report: FleetReport = [
            ReachResult::succeeded("b", goal),
            ReachResult::succeeded("a", goal),
            ReachResult::failed("b", goal, KinematicsError::UnreachableGoal { x: 0.0, y: 0.0 }),
        ]
        .into_iter()
        .collect();

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.robot_ids().collect::<Vec<_>>(), vec!["a", "b"]);
        let b = report.for_robot("b");
        assert!(b[0].success);
        assert!(!b[1].success);
        assert!(report.for_robot("c").is_empty());
    }
}
