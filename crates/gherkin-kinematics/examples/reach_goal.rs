use gherkin_kinematics::*;

fn main() {
    let link1 = 75.0;
    let link2 = 50.0;
    let arm_result = Arm::new(link1, link2);

    let goal = Goal::new(60, 80, Angle::new(40));
    let mut base = RotatingBase::new(Angle::new(0), RotationLimits::default());
    let gain = 10.0;
    let max_steps = 200;

    match arm_result {
        Ok(mut arm) => {
            println!("Initializing simulation...");
            println!("  Arm Parameters:");
            println!("    Link 1: {}", arm.link1());
            println!("    Link 2: {}", arm.link2());
            println!("    Reachable annulus: [{}, {}]", arm.min_reachable_radius(), arm.max_reachable_radius());
            println!("  Goal: {}", goal);

            while base.angle() != goal.angle && base.angle().inverse() != goal.angle {
                let speed = if base.angle().distance(goal.angle) > base.limits().fast_threshold() {
                    Speed::Fast
                } else {
                    Speed::Fine
                };
                base.rotate(Direction::Clockwise, speed);
            }
            println!("Base aligned at {}", base.angle());

            let target = match arm.inverse(goal.x as f64, goal.y as f64) {
                Ok(target) => target,
                Err(e) => {
                    eprintln!("Failed to solve goal: {}", e);
                    return;
                }
            };

            for i in 0..max_steps {
                let joints = arm.joints();
                arm.set_joints(JointAngles::new(
                    joints.theta0 + (target.theta0 - joints.theta0) / gain,
                    joints.theta1 + (target.theta1 - joints.theta1) / gain,
                ));
                let tip = arm.tip();
                println!("Step {:>3}: tip {}", i + 1, tip);
                if tip.distance_to(Position::new(goal.x as f64, goal.y as f64)) <= 0.25 {
                    println!("\nGoal reached after {} steps.", i + 1);
                    return;
                }
            }
            println!("\nGoal not reached after {} steps.", max_steps);
        }
        Err(e) => {
            eprintln!("Failed to initialize arm: {:?}", e);
            eprintln!("Please ensure link1 ({}) and link2 ({}) are positive.", link1, link2);
        }
    }
}
