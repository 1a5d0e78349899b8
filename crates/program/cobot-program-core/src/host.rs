//! Host collaborator traits.
//!
//! The simulation host (scene graph, clock, IK solver) implements these and
//! passes them into the player and target helpers by `&mut dyn` each call.
//! Nothing in this crate keeps a reference to a host object across calls.

use crate::pose::Pose;

/// Inverse-kinematics / position controller driving the end effector.
pub trait IpController {
    /// Current tool-center-point pose.
    fn tcp_position(&self) -> Pose;
    /// Pose the solver is currently steering towards.
    fn tcp_target_position(&self) -> Pose;
    fn set_tcp_target_position(&mut self, pose: &Pose);
    /// Target pose the scene was loaded with.
    fn tcp_target_init_position(&self) -> Pose;
}

/// Simulation clock of the root node.
pub trait SimulationClock {
    fn time(&self) -> f64;
    fn set_time(&mut self, time: f64);
    fn dt(&self) -> f64;
    /// Whether the host is currently animating.
    fn animate(&self) -> bool;
}

/// Generic host field written through its text form (the host's canonical write path).
pub trait DataField {
    fn value_string(&self) -> String;
    /// Parse `text` into the field. Returns false if the host rejected it.
    fn read(&mut self, text: &str) -> bool;
}

/// Mechanical state holding a single rigid position.
pub trait MechanicalState {
    /// Position vector as text, as the host writes it.
    fn write_vec(&self) -> String;
    /// Overwrite the position vector from text.
    fn read_vec(&mut self, text: &str);
}

/// Node of the host scene graph.
pub trait SceneNode {
    fn child(&self, name: &str) -> Option<&dyn SceneNode>;
    fn child_mut(&mut self, name: &str) -> Option<&mut dyn SceneNode>;
    fn mechanical_state(&self) -> Option<&dyn MechanicalState>;
    fn mechanical_state_mut(&mut self) -> Option<&mut dyn MechanicalState>;
}
