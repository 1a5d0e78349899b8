#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use cobot_program_core::{DataField, IpController, Pose, ProgramPlayer, SimulationClock};

pub fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

#[derive(Default)]
pub struct Clock {
    pub time: f64,
    pub dt: f64,
}

impl Clock {
    pub fn with_dt(dt: f64) -> Self {
        Self { time: 0.0, dt }
    }
}

impl SimulationClock for Clock {
    fn time(&self) -> f64 {
        self.time
    }
    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
    fn dt(&self) -> f64 {
        self.dt
    }
    fn animate(&self) -> bool {
        true
    }
}

/// IK solver double that reaches its target at once.
#[derive(Default)]
pub struct Solver {
    pub target: Pose,
    pub init: Pose,
    pub writes: usize,
}

impl IpController for Solver {
    fn tcp_position(&self) -> Pose {
        self.target
    }
    fn tcp_target_position(&self) -> Pose {
        self.target
    }
    fn set_tcp_target_position(&mut self, pose: &Pose) {
        self.target = *pose;
        self.writes += 1;
    }
    fn tcp_target_init_position(&self) -> Pose {
        self.init
    }
}

/// Scalar field whose text value stays observable after being boxed.
#[derive(Clone, Default)]
pub struct SharedField(pub Rc<RefCell<String>>);

impl SharedField {
    pub fn value(&self) -> f64 {
        self.0.borrow().parse().unwrap_or(f64::NAN)
    }
}

impl DataField for SharedField {
    fn value_string(&self) -> String {
        self.0.borrow().clone()
    }
    fn read(&mut self, text: &str) -> bool {
        if text.parse::<f64>().is_err() {
            return false;
        }
        *self.0.borrow_mut() = text.to_string();
        true
    }
}

/// One host simulation step: begin event, clock advance, end event.
pub fn tick(player: &mut ProgramPlayer, clock: &mut Clock, solver: &mut Solver) {
    player.animate_begin(clock, solver);
    clock.time += clock.dt;
    player.animate_end(clock);
}
