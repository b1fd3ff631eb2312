use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use gherkin_fleet::{
    FleetError, FleetManager, GoalGenerator, Liveness, Observer, RobotConfig, RobotController,
    RobotHandle, RobotSnapshot,
};
use gherkin_kinematics::{Angle, Arm, Goal, Position};

const TOLERANCE: f64 = 0.25;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fleet(ids: &[&str], observer: Option<Arc<dyn Observer>>) -> FleetManager {
    let robots = ids
        .iter()
        .map(|id| {
            let controller = RobotController::new(*id, RobotConfig::default().unpaced()).unwrap();
            RobotHandle::spawn(controller).unwrap()
        })
        .collect();
    FleetManager::new(robots, observer).unwrap()
}

#[derive(Default)]
struct Recorder {
    observed: AtomicUsize,
    released: AtomicUsize,
    last: Mutex<Option<RobotSnapshot>>,
    panic_on: Option<&'static str>,
    events: Option<mpsc::UnboundedSender<String>>,
}

impl Recorder {
    fn notify(&self, event: String) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

impl Observer for Recorder {
    fn observe(&self, snapshot: &RobotSnapshot) -> Liveness {
        if self.panic_on == Some(snapshot.robot_id.as_str()) {
            self.notify(format!("{} down", snapshot.robot_id));
            panic!("observer fault on {}", snapshot.robot_id);
        }
        self.observed.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(snapshot.clone());
        if snapshot.success {
            self.notify(format!("{} reached", snapshot.robot_id));
        }
        Liveness::Continue
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn failing_recorder(robot_id: &'static str) -> (Arc<Recorder>, mpsc::UnboundedReceiver<String>) {
    let (events, rx) = mpsc::unbounded_channel();
    let recorder = Recorder {
        panic_on: Some(robot_id),
        events: Some(events),
        ..Recorder::default()
    };
    (Arc::new(recorder), rx)
}

/// Wait until every expected event was seen, then leave the robot threads
/// time to hand over their replies or finish unwinding.
async fn expect_events(rx: &mut mpsc::UnboundedReceiver<String>, expected: &[&str]) {
    let mut seen: Vec<String> = Vec::new();
    while !expected.iter().all(|e| seen.iter().any(|s| s == e)) {
        seen.push(rx.recv().await.unwrap());
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_single_robot_reaches_goal() {
    init_tracing();
    let recorder = Arc::new(Recorder::default());
    let fleet = fleet(&["solo"], Some(recorder.clone()));
    let goal = Goal::new(60, 80, Angle::new(40));

    let report = fleet.receive_goals([goal]).await.unwrap();

    assert_eq!(report.total(), 1);
    let result = &report.for_robot("solo")[0];
    assert!(result.success);
    assert_eq!(result.goal, goal);
    assert!(result.error.is_none());

    let last = recorder.last.lock().unwrap().clone().unwrap();
    assert!(last.success);
    assert_eq!(last.base_angle, Angle::new(40));
    assert!(last.tip.distance_to(Position::new(60.0, 80.0)) <= TOLERANCE);
    assert!(recorder.observed.load(Ordering::SeqCst) > 1);
    assert_eq!(recorder.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fleet_aggregates_results_by_robot() {
    init_tracing();
    let goals: Vec<Goal> = GoalGenerator::for_arm(&Arm::default(), Some(11)).take(9).collect();
    let fleet = fleet(&["a", "b", "c"], None);

    let report = fleet.receive_goals(goals.clone()).await.unwrap();

    assert_eq!(report.total(), goals.len());
    assert_eq!(report.succeeded(), goals.len());
    assert_eq!(report.robot_ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    // Idle robots are primed in order with the first three goals.
    assert_eq!(report.for_robot("a")[0].goal.x.abs(), goals[0].x.abs());
    assert_eq!(report.for_robot("b")[0].goal.y, goals[1].y);
    assert_eq!(report.for_robot("c")[0].goal.y, goals[2].y);
    for id in ["a", "b", "c"] {
        let results = report.for_robot(id);
        assert!(results.windows(2).all(|w| w[0].completed_at <= w[1].completed_at));
    }
}

#[tokio::test]
async fn test_unreachable_goal_does_not_stop_the_fleet() {
    init_tracing();
    let fleet = fleet(&["a", "b"], None);
    let goals = [
        Goal::new(0, 0, Angle::new(0)),
        Goal::new(60, 80, Angle::new(40)),
        Goal::new(100, 0, Angle::new(0)),
    ];

    let report = fleet.receive_goals(goals).await.unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.failed(), 1);
    assert!(!report.for_robot("a")[0].success);
}

#[tokio::test]
async fn test_dead_robot_aborts_with_partial_report() {
    init_tracing();
    let recorder = Arc::new(Recorder {
        panic_on: Some("b"),
        ..Recorder::default()
    });
    let fleet = fleet(&["a", "b"], Some(recorder.clone()));
    // a, b, then b again: both robots carry one goal, so a sits out.
    let goals = [
        Goal::new(60, 80, Angle::new(40)),
        Goal::new(100, 0, Angle::new(0)),
        Goal::new(80, 60, Angle::new(30)),
    ];

    let err = fleet.receive_goals(goals).await.unwrap_err();

    match err {
        FleetError::Dispatch { robot_id, completed } => {
            assert_eq!(robot_id, "b");
            assert_eq!(completed.total(), 1);
            assert!(completed.for_robot("a")[0].success);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(recorder.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_results_behind_a_lost_reply_are_kept() {
    init_tracing();
    let (recorder, mut events) = failing_recorder("b");
    let mut fleet = fleet(&["a", "b", "c"], Some(recorder.clone()));
    for goal in [
        Goal::new(60, 80, Angle::new(40)),
        Goal::new(100, 0, Angle::new(0)),
        Goal::new(80, 60, Angle::new(30)),
    ] {
        fleet.receive_goal(goal).unwrap();
    }
    expect_events(&mut events, &["a reached", "b down", "c reached"]).await;

    let err = fleet.receive_goals(Vec::new()).await.unwrap_err();

    match err {
        FleetError::Dispatch { robot_id, completed } => {
            assert_eq!(robot_id, "b");
            assert_eq!(completed.total(), 2);
            assert!(completed.for_robot("a")[0].success);
            assert!(completed.for_robot("c")[0].success);
            assert!(completed.for_robot("b").is_empty());
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(recorder.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_goal_for_dead_robot_ends_run_with_partial_report() {
    init_tracing();
    let (recorder, mut events) = failing_recorder("b");
    let mut fleet = fleet(&["a", "b"], Some(recorder.clone()));
    fleet.receive_goal(Goal::new(60, 80, Angle::new(40))).unwrap();
    fleet.receive_goal(Goal::new(100, 0, Angle::new(0))).unwrap();
    expect_events(&mut events, &["a reached", "b down"]).await;

    // Both robots carry one goal, so a sits out and b is picked.
    let next = Goal::new(80, 60, Angle::new(30));
    assert_eq!(fleet.select_robot(&next), Some("b"));
    let refused = fleet.receive_goal(next);
    assert!(matches!(refused, Err(FleetError::RobotUnavailable(id)) if id == "b"));
    assert_eq!(fleet.ledger().assigned("b").len(), 1);

    let err = fleet
        .receive_goals([next, Goal::new(-60, 80, Angle::new(120))])
        .await
        .unwrap_err();

    match err {
        FleetError::Dispatch { robot_id, completed } => {
            assert_eq!(robot_id, "b");
            assert_eq!(completed.total(), 1);
            assert!(completed.for_robot("a")[0].success);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(recorder.released.load(Ordering::SeqCst), 1);
}
