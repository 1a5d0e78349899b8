//! Direct access to the TCP target node of the scene (`Modelling/Target`).
//!
//! Used by the jog controls. Reads and writes go through the mechanical
//! state's text codec; when any node on the path is missing the last known
//! pose is kept.

use crate::host::{MechanicalState, SceneNode};
use crate::pose::Pose;

pub const MODELLING_NODE: &str = "Modelling";
pub const TARGET_NODE: &str = "Target";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TcpTarget {
    last: Pose,
}

impl TcpTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last pose read or written.
    #[inline]
    pub fn last_position(&self) -> Pose {
        self.last
    }

    /// Read the target pose; falls back to the last known one.
    pub fn position(&mut self, root: &dyn SceneNode) -> Pose {
        let read = target_state(root).and_then(|state| Pose::parse_stream(&state.write_vec()));
        if let Some(pose) = read {
            self.last = pose;
        }
        self.last
    }

    /// Write the target pose. Returns false if the target node is missing.
    pub fn set_position(&mut self, root: &mut dyn SceneNode, pose: &Pose) -> bool {
        match target_state_mut(root) {
            Some(state) => {
                state.read_vec(&pose.to_stream_string());
                self.last = *pose;
                true
            }
            None => false,
        }
    }

    /// Position truncated to whole scene units (mm) and roll/pitch/yaw in radians.
    pub fn position_euler(&mut self, root: &dyn SceneNode) -> ([i32; 3], [f64; 3]) {
        let pose = self.position(root);
        let [x, y, z] = pose.center;
        ([x as i32, y as i32, z as i32], pose.to_euler())
    }

    pub fn set_position_euler(
        &mut self,
        root: &mut dyn SceneNode,
        position: [i32; 3],
        rpy: [f64; 3],
    ) -> bool {
        let center = position.map(f64::from);
        self.set_position(root, &Pose::from_euler(center, rpy))
    }
}

fn target_state(root: &dyn SceneNode) -> Option<&dyn MechanicalState> {
    root.child(MODELLING_NODE)?
        .child(TARGET_NODE)?
        .mechanical_state()
}

fn target_state_mut(root: &mut dyn SceneNode) -> Option<&mut dyn MechanicalState> {
    root.child_mut(MODELLING_NODE)?
        .child_mut(TARGET_NODE)?
        .mechanical_state_mut()
}
