use macroquad::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use gherkin_fleet::{Liveness, Observer, Phase, RobotSnapshot};

use crate::blackboard::{self, Blackboard};
use crate::bus::Topic;
use crate::settings::DisplaySettings;

const STATUS_HEIGHT: f32 = 48.0;
const MARGIN: f32 = 16.0;
const BASE_RADIUS: f32 = 10.0;

pub fn window_conf(display: &DisplaySettings, robots: usize) -> Conf {
    Conf {
        window_title: "Gherkin Fleet".to_string(),
        window_width: (display.robot_width as usize * robots.max(1)) as i32,
        window_height: display.height as i32 + STATUS_HEIGHT as i32,
        high_dpi: true,
        ..Default::default()
    }
}

/// Forwards robot snapshots to the visualizer while the window is open.
pub struct DisplayObserver {
    topic: Topic<RobotSnapshot>,
    bb: Blackboard,
}

impl DisplayObserver {
    pub fn new(topic: Topic<RobotSnapshot>, bb: Blackboard) -> Self {
        DisplayObserver { topic, bb }
    }
}

impl Observer for DisplayObserver {
    fn observe(&self, snapshot: &RobotSnapshot) -> Liveness {
        if !blackboard::is_observing(&self.bb) {
            return Liveness::Stop;
        }
        if snapshot.success {
            blackboard::count_reached(&self.bb);
        }
        self.topic.publish(snapshot.clone());
        Liveness::Continue
    }

    fn release(&self) {
        blackboard::mark_done(&self.bb);
    }
}

/// Robot panels side by side, redrawn every frame until ESC or window close.
pub async fn run_visualization_loop(
    mut snapshot_rx: broadcast::Receiver<Arc<RobotSnapshot>>,
    bb: Blackboard,
    robot_ids: Vec<String>,
    max_reach: f64,
    display: DisplaySettings,
) {
    info!(robots = robot_ids.len(), "Visualization loop starting");
    prevent_quit();

    let panel_w = display.robot_width as f32;
    let panel_h = display.height as f32;
    let scale = ((panel_w.min(panel_h) / 2.0 - MARGIN) / max_reach as f32).max(0.1);
    let mut latest: BTreeMap<String, RobotSnapshot> = BTreeMap::new();
    let mut channel_open = true;

    loop {
        while channel_open {
            match snapshot_rx.try_recv() {
                Ok(snapshot) => {
                    latest.insert(snapshot.robot_id.clone(), (*snapshot).clone());
                }
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Visualization snapshot receiver lagged");
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    info!("Fleet released the display");
                    channel_open = false;
                }
            }
        }

        if is_key_pressed(KeyCode::Escape) || is_quit_requested() {
            info!("Visualization closed, robots continue headless");
            blackboard::stop_observing(&bb);
            break;
        }

        clear_background(LIGHTGRAY);
        for (i, id) in robot_ids.iter().enumerate() {
            let origin = vec2(panel_w * (i as f32 + 0.5), panel_h / 2.0);
            if i > 0 {
                let x = panel_w * i as f32;
                draw_line(x, 0.0, x, panel_h, 1.0, GRAY);
            }
            draw_circle_lines(origin.x, origin.y, max_reach as f32 * scale, 1.0, GRAY);
            draw_text(id, panel_w * i as f32 + 8.0, 20.0, 20.0, BLACK);
            match latest.get(id) {
                Some(snapshot) => draw_robot(origin, scale, snapshot),
                None => draw_circle(origin.x, origin.y, BASE_RADIUS, DARKGRAY),
            }
        }

        let state = blackboard::snapshot(&bb);
        let status = format!(
            "reached: {}  elapsed: {:.1}s  {}",
            state.reached,
            state.started.elapsed().as_secs_f32(),
            if state.fleet_done { "fleet finished, ESC to exit" } else { "running" },
        );
        draw_text(&status, 8.0, panel_h + 20.0, 20.0, BLACK);
        if let Some(fault) = state.faults.last() {
            draw_text(fault, 8.0, panel_h + 40.0, 18.0, RED);
        }

        next_frame().await
    }
}

fn to_screen(origin: Vec2, scale: f32, x: f64, y: f64) -> Vec2 {
    vec2(origin.x + x as f32 * scale, origin.y - y as f32 * scale)
}

fn draw_robot(origin: Vec2, scale: f32, snapshot: &RobotSnapshot) {
    let goal = to_screen(origin, scale, snapshot.goal.x as f64, snapshot.goal.y as f64);
    draw_circle(goal.x, goal.y, 5.0, RED);

    let heading = snapshot.base_angle.to_radians() as f32;
    let facing = vec2(origin.x + 2.0 * BASE_RADIUS * heading.cos(), origin.y - 2.0 * BASE_RADIUS * heading.sin());
    draw_circle(origin.x, origin.y, BASE_RADIUS, DARKGRAY);
    draw_line(origin.x, origin.y, facing.x, facing.y, 3.0, ORANGE);

    let elbow = to_screen(origin, scale, snapshot.elbow.x, snapshot.elbow.y);
    let tip = to_screen(origin, scale, snapshot.tip.x, snapshot.tip.y);
    draw_line(origin.x, origin.y, elbow.x, elbow.y, 5.0, BLUE);
    draw_line(elbow.x, elbow.y, tip.x, tip.y, 4.0, DARKBLUE);
    draw_circle(elbow.x, elbow.y, 4.0, BLACK);
    draw_circle(tip.x, tip.y, 4.0, if snapshot.success { GREEN } else { BLACK });

    let phase = match snapshot.phase {
        Phase::Rotating => "rotating",
        Phase::Translating => "translating",
    };
    draw_text(
        &format!("{} {}", phase, snapshot.base_angle),
        origin.x - 60.0,
        origin.y * 2.0 - 8.0,
        18.0,
        DARKGRAY,
    );
}
