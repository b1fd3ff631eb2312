//! Random goals inside the reachable annulus of an arm.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{trace, warn};

use gherkin_kinematics::angle::FULL_TURN;
use gherkin_kinematics::{Angle, Arm, Goal, Position};

/// Samples drawn per goal before giving up.
pub const MAX_REDRAWS: usize = 10_000;

/// Draws goals uniformly by angle and radius.
///
/// Coordinates are truncated to integers; a sample that truncation pushes out
/// of the annulus is redrawn.
#[derive(Clone)]
pub struct GoalGenerator {
    rng: StdRng,
    min_radius: f64,
    max_radius: f64,
}

impl GoalGenerator {
    /// Generator over `[min_radius, max_radius]`. The bounds are swapped if
    /// given in the wrong order. A `seed` makes the sequence reproducible.
    pub fn new(min_radius: f64, max_radius: f64, seed: Option<u64>) -> Self {
        let (min_radius, max_radius) = if min_radius <= max_radius {
            (min_radius.max(0.0), max_radius)
        } else {
            (max_radius.max(0.0), min_radius)
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        GoalGenerator {
            rng,
            min_radius,
            max_radius,
        }
    }

    /// Generator over everything `arm` can reach.
    pub fn for_arm(arm: &Arm, seed: Option<u64>) -> Self {
        Self::new(arm.min_reachable_radius(), arm.max_reachable_radius(), seed)
    }

    /// Draw one goal, or `None` if no sample landed in the annulus within
    /// [`MAX_REDRAWS`] attempts (an annulus too thin to hold integer points).
    pub fn next_goal(&mut self) -> Option<Goal> {
        for _ in 0..MAX_REDRAWS {
            let theta = self.rng.random_range(0.0..TAU);
            let radius = if self.max_radius > self.min_radius {
                self.rng.random_range(self.min_radius..=self.max_radius)
            } else {
                self.min_radius
            };
            let x = (radius * theta.cos()) as i32;
            let y = (radius * theta.sin()) as i32;
            let norm = Position::new(f64::from(x), f64::from(y)).norm();
            if norm < self.min_radius || norm > self.max_radius {
                trace!(x, y, norm, "Sample left the annulus, redrawing");
                continue;
            }
            let heading = Angle::new(self.rng.random_range(0..FULL_TURN));
            return Some(Goal::new(x, y, heading));
        }
        warn!(
            min_radius = self.min_radius,
            max_radius = self.max_radius,
            "No integer goal found in the annulus"
        );
        None
    }
}

/// Ends early if the annulus yields no goal.
impl Iterator for GoalGenerator {
    type Item = Goal;

    fn next(&mut self) -> Option<Goal> {
        self.next_goal()
    }
}
