//! Goal bookkeeping and the robot selection heuristic.

use std::collections::HashMap;

use gherkin_kinematics::Goal;

use crate::error::FleetError;

/// Append-only log of the goals assigned to each robot, in robot
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct GoalLedger {
    order: Vec<String>,
    logs: HashMap<String, Vec<Goal>>,
}

impl GoalLedger {
    /// Register robots in the given order.
    ///
    /// # Errors
    ///
    /// Returns `Err(FleetError::DuplicateRobot)` if an id appears twice.
    pub fn new<I, S>(robot_ids: I) -> Result<Self, FleetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = GoalLedger::default();
        for id in robot_ids {
            let id = id.into();
            if ledger.logs.contains_key(&id) {
                return Err(FleetError::DuplicateRobot(id));
            }
            ledger.logs.insert(id.clone(), Vec::new());
            ledger.order.push(id);
        }
        Ok(ledger)
    }

    /// Robot ids in registration order.
    pub fn robot_ids(&self) -> &[String] {
        &self.order
    }

    /// Goals assigned so far to `robot_id`, oldest first.
    pub fn assigned(&self, robot_id: &str) -> &[Goal] {
        self.logs.get(robot_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record that `goal` was given to `robot_id`. Unknown ids are ignored.
    pub fn record(&mut self, robot_id: &str, goal: Goal) {
        if let Some(log) = self.logs.get_mut(robot_id) {
            log.push(goal);
        }
    }

    /// Pick the robot that should take `goal`.
    ///
    /// Idle robots are primed first. After that the busiest robot sits the
    /// goal out and the one whose latest goal is nearest wins. Ties go to the
    /// robot registered first. A lone robot always gets the goal.
    pub fn select(&self, goal: &Goal) -> Option<&str> {
        if let Some(idle) = self.order.iter().find(|id| self.assigned(id).is_empty()) {
            return Some(idle.as_str());
        }

        let mut busiest: Option<(&str, usize)> = None;
        for id in &self.order {
            let load = self.assigned(id).len();
            if busiest.is_none_or(|(_, max)| load > max) {
                busiest = Some((id.as_str(), load));
            }
        }
        let (busiest, _) = busiest?;

        self.order
            .iter()
            .filter(|id| id.as_str() != busiest)
            .filter_map(|id| {
                let last = self.assigned(id).last()?;
                Some((id.as_str(), last.difference(goal)))
            })
            .min_by_key(|&(_, difference)| difference)
            .map(|(id, _)| id)
            .or(Some(busiest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gherkin_kinematics::Angle;

    fn goal(x: i32, y: i32, degrees: i32) -> Goal {
        Goal::new(x, y, Angle::new(degrees))
    }

    fn ledger_with(logs: Vec<(&str, Vec<Goal>)>) -> GoalLedger {
        let mut ledger = GoalLedger::new(logs.iter().map(|(id, _)| *id)).unwrap();
        for (id, goals) in logs {
            for g in goals {
                ledger.record(id, g);
            }
        }
        ledger
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = GoalLedger::new(["a", "b", "a"]);
        assert!(matches!(result, Err(FleetError::DuplicateRobot(id)) if id == "a"));
    }

    #[test]
    fn test_empty_ledger_selects_nothing() {
        let ledger = GoalLedger::new(Vec::<String>::new()).unwrap();
        assert_eq!(ledger.select(&goal(50, 50, 0)), None);
    }

    #[test]
    fn test_idle_robot_first() {
        let g1 = goal(10, 60, 30);
        let g2 = goal(-40, 70, 90);
        let ledger = ledger_with(vec![("A", vec![]), ("B", vec![g1, g2])]);
        assert_eq!(ledger.select(&goal(50, 50, 45)), Some("A"));
    }

    #[test]
    fn test_idle_robots_primed_in_registration_order() {
        let mut ledger = GoalLedger::new(["1", "2", "3"]).unwrap();
        let g = goal(50, 50, 45);
        for expected in ["1", "2", "3"] {
            let chosen = ledger.select(&g).unwrap().to_owned();
            assert_eq!(chosen, expected);
            ledger.record(&chosen, g);
        }
    }

    #[test]
    fn test_most_loaded_robot_excluded() {
        let g1 = goal(60, 60, 10);
        let g2 = goal(-60, 60, 200);
        let g3 = goal(90, 0, 0);
        // B's last goal is identical to the new one, but B is the busiest.
        let ledger = ledger_with(vec![("A", vec![g1]), ("B", vec![g1, g2, g3]), ("C", vec![g2])]);
        let chosen = ledger.select(&g3).unwrap();
        assert!(chosen == "A" || chosen == "C");
    }

    #[test]
    fn test_closest_previous_goal_wins() {
        let goal1 = goal(50, -75, 135);
        let goal2 = goal(-130, -12, 32);
        let new_goal = goal(40, -62, 96);
        let ledger = ledger_with(vec![("1", vec![goal1]), ("2", vec![goal2]), ("3", vec![goal1, goal2])]);
        assert_eq!(ledger.select(&new_goal), Some("1"));
    }

    #[test]
    fn test_busiest_tie_excludes_first_registered() {
        let near = goal(50, 50, 10);
        let far = goal(-100, -50, 10);
        let ledger = ledger_with(vec![("A", vec![near]), ("B", vec![far])]);
        // Both carry one goal; A is the busiest by registration order.
        assert_eq!(ledger.select(&near), Some("B"));
    }

    #[test]
    fn test_proximity_tie_goes_to_first_registered() {
        let g = goal(50, 50, 10);
        let ledger = ledger_with(vec![("A", vec![g, g]), ("B", vec![g]), ("C", vec![g])]);
        assert_eq!(ledger.select(&g), Some("B"));
    }

    #[test]
    fn test_lone_robot_keeps_getting_goals() {
        let g = goal(50, 50, 10);
        let ledger = ledger_with(vec![("solo", vec![g, g])]);
        assert_eq!(ledger.select(&g), Some("solo"));
    }

    #[test]
    fn test_angle_term_uses_signed_difference() {
        let new_goal = goal(50, 50, 20);
        // Same position; A's last heading is 10° behind (diff 350), B's is
        // 10° ahead (diff 10).
        let ledger = ledger_with(vec![("X", vec![new_goal, new_goal]), ("A", vec![goal(50, 50, 10)]), ("B", vec![goal(50, 50, 30)])]);
        assert_eq!(ledger.select(&new_goal), Some("B"));
    }

    #[test]
    fn test_record_ignores_unknown() {
        let mut ledger = GoalLedger::new(["A"]).unwrap();
        ledger.record("Z", goal(1, 1, 1));
        assert!(ledger.assigned("Z").is_empty());
        assert!(ledger.assigned("A").is_empty());
    }
}
