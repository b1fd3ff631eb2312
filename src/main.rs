mod blackboard;
mod bus;
mod graphics;
mod settings;

use std::sync::Arc;

use anyhow::{Context, anyhow, ensure};
use tokio::runtime::Runtime;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gherkin_fleet::{
    FleetError, FleetManager, FleetReport, GoalGenerator, Observer, RobotController, RobotHandle,
    RobotSnapshot,
};
use gherkin_kinematics::Goal;

use blackboard::Blackboard;
use bus::Topic;
use graphics::DisplayObserver;
use settings::Settings;

const SNAPSHOT_TOPIC_CAPACITY: usize = 256;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load()?;
    let robot_config = settings.robot_config();
    let arm = robot_config.arm().context("invalid arm geometry")?;
    let goals: Vec<Goal> = GoalGenerator::for_arm(&arm, settings.fleet.seed)
        .take(settings.fleet.goals)
        .collect();
    ensure!(
        goals.len() == settings.fleet.goals,
        "arm geometry leaves no integer goal inside the reachable annulus"
    );
    let robots = spawn_robots(&settings)?;
    let robot_ids: Vec<String> = robots.iter().map(|r| r.id().to_owned()).collect();
    info!(
        robots = robot_ids.len(),
        goals = goals.len(),
        display = settings.display.enabled,
        "Gherkin fleet starting"
    );

    let runtime = Runtime::new()?;
    let bb: Blackboard = Arc::default();

    let outcome = if settings.display.enabled {
        let topic: Topic<RobotSnapshot> = Topic::new(SNAPSHOT_TOPIC_CAPACITY);
        let snapshot_rx = topic.subscribe();
        let observer: Arc<dyn Observer> = Arc::new(DisplayObserver::new(topic, bb.clone()));
        let fleet = FleetManager::new(robots, Some(observer))?;
        let fleet_task = runtime.spawn(run_fleet(fleet, goals, bb.clone()));

        let conf = graphics::window_conf(&settings.display, robot_ids.len());
        macroquad::Window::from_config(
            conf,
            graphics::run_visualization_loop(
                snapshot_rx,
                bb.clone(),
                robot_ids,
                arm.max_reachable_radius(),
                settings.display.clone(),
            ),
        );
        runtime.block_on(fleet_task).context("fleet task panicked")?
    } else {
        let fleet = FleetManager::new(robots, None)?;
        runtime.block_on(run_fleet(fleet, goals, bb.clone()))
    };

    match outcome {
        Ok(report) => {
            print!("{}", report);
            Ok(())
        }
        Err(FleetError::Dispatch { robot_id, completed }) => {
            print!("{}", completed);
            Err(anyhow!(
                "robot {} stopped before reporting, results above are partial",
                robot_id
            ))
        }
        Err(e) => Err(e.into()),
    }
}

fn spawn_robots(settings: &Settings) -> anyhow::Result<Vec<RobotHandle>> {
    (1..=settings.fleet.robots)
        .map(|n| {
            let controller = RobotController::new(format!("arm-{}", n), settings.robot_config())?;
            Ok(RobotHandle::spawn(controller)?)
        })
        .collect()
}

async fn run_fleet(
    fleet: FleetManager,
    goals: Vec<Goal>,
    bb: Blackboard,
) -> Result<FleetReport, FleetError> {
    let outcome = fleet.receive_goals(goals).await;
    if let Err(e) = &outcome {
        error!(error = %e, "Fleet run failed");
        blackboard::raise_fault(&bb, &e.to_string());
    }
    outcome
}
