use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

/// Run state shared between the fleet task and the visualizer.
#[derive(Clone)]
pub struct State {
    /// Cleared when the window goes away; robots then stop publishing.
    pub observing: bool,
    pub fleet_done: bool,
    pub reached: usize,
    pub started: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            observing: true,
            fleet_done: false,
            reached: 0,
            started: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn is_observing(bb: &Blackboard) -> bool {
    bb.read().observing
}

pub fn stop_observing(bb: &Blackboard) {
    bb.write().observing = false;
}

pub fn count_reached(bb: &Blackboard) {
    bb.write().reached += 1;
}

pub fn mark_done(bb: &Blackboard) {
    bb.write().fleet_done = true;
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
