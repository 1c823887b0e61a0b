//! Seam between the motion core and the external physics/simulation layer.
//!
//! The sequencer never talks to a physics engine directly. Everything it
//! reads (joint state, end-effector pose, live body positions) and writes
//! (joint actuator targets, the gripper command) goes through [`ArmBridge`].
//! Any simulation backend implements this trait; [`MemoryBridge`] is the
//! deterministic in-memory implementation used by tests and demos.

use std::collections::HashMap;

use nalgebra::{Isometry3, Vector3};

use crate::types::{JointVector, TargetId, GRIPPER_CLOSED};

// ---------------------------------------------------------------------------
// ArmBridge
// ---------------------------------------------------------------------------

/// Trait the external simulation layer implements.
///
/// Reads happen at phase boundaries and every tick; writes happen every
/// tick while a sequence is running. The sequencer is the sole writer of
/// the actuator channels for the duration of a run.
pub trait ArmBridge {
    /// Current joint positions (radians).
    fn joint_positions(&self) -> JointVector;

    /// Current end-effector pose in the world frame.
    fn end_effector_pose(&self) -> Isometry3<f64>;

    /// World position of a tracked body, if it exists.
    fn body_position(&self, id: TargetId) -> Option<Vector3<f64>>;

    /// Write the 7 joint actuator targets (radians).
    fn write_joint_targets(&mut self, targets: &JointVector);

    /// Write the gripper actuator command (0 = closed, 255 = fully open).
    fn write_gripper(&mut self, command: u8);
}

// ---------------------------------------------------------------------------
// MemoryBridge
// ---------------------------------------------------------------------------

/// In-memory [`ArmBridge`] with ideal kinematics: written joint targets
/// become the reported joint positions on the next read.
#[derive(Debug, Clone)]
pub struct MemoryBridge {
    joints: JointVector,
    gripper: u8,
    ee_pose: Isometry3<f64>,
    bodies: HashMap<TargetId, Vector3<f64>>,
}

impl MemoryBridge {
    /// Create a bridge with the arm at the given configuration.
    #[must_use]
    pub fn new(initial: JointVector) -> Self {
        Self {
            joints: initial,
            gripper: GRIPPER_CLOSED,
            ee_pose: Isometry3::identity(),
            bodies: HashMap::new(),
        }
    }

    /// Register or move a tracked body.
    pub fn set_body(&mut self, id: TargetId, position: Vector3<f64>) {
        self.bodies.insert(id, position);
    }

    /// Remove a tracked body (e.g. after it has been placed).
    pub fn remove_body(&mut self, id: TargetId) {
        self.bodies.remove(&id);
    }

    /// Override the reported end-effector pose.
    pub fn set_end_effector_pose(&mut self, pose: Isometry3<f64>) {
        self.ee_pose = pose;
    }

    /// Last written gripper command.
    #[must_use]
    pub const fn gripper(&self) -> u8 {
        self.gripper
    }
}

impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new(JointVector::zeros())
    }
}

impl ArmBridge for MemoryBridge {
    fn joint_positions(&self) -> JointVector {
        self.joints
    }

    fn end_effector_pose(&self) -> Isometry3<f64> {
        self.ee_pose
    }

    fn body_position(&self, id: TargetId) -> Option<Vector3<f64>> {
        self.bodies.get(&id).copied()
    }

    fn write_joint_targets(&mut self, targets: &JointVector) {
        self.joints = *targets;
    }

    fn write_gripper(&mut self, command: u8) {
        self.gripper = command;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GRIPPER_OPEN;

    #[test]
    fn trait_is_object_safe() {
        fn _accepts_boxed(_: Box<dyn ArmBridge>) {}
    }

    #[test]
    fn written_targets_become_positions() {
        let mut bridge = MemoryBridge::default();
        let q = JointVector::new([0.1, 0.2, 0.3, -1.5, 0.5, 1.0, 0.7]);
        bridge.write_joint_targets(&q);
        assert_eq!(bridge.joint_positions(), q);
    }

    #[test]
    fn gripper_command_round_trip() {
        let mut bridge = MemoryBridge::default();
        assert_eq!(bridge.gripper(), GRIPPER_CLOSED);
        bridge.write_gripper(GRIPPER_OPEN);
        assert_eq!(bridge.gripper(), GRIPPER_OPEN);
    }

    #[test]
    fn body_positions() {
        let mut bridge = MemoryBridge::default();
        assert!(bridge.body_position(TargetId(1)).is_none());

        bridge.set_body(TargetId(1), Vector3::new(0.4, 0.1, 0.05));
        let p = bridge.body_position(TargetId(1)).unwrap();
        assert!((p.x - 0.4).abs() < f64::EPSILON);

        bridge.set_body(TargetId(1), Vector3::new(0.5, 0.1, 0.05));
        let p = bridge.body_position(TargetId(1)).unwrap();
        assert!((p.x - 0.5).abs() < f64::EPSILON);

        bridge.remove_body(TargetId(1));
        assert!(bridge.body_position(TargetId(1)).is_none());
    }

    #[test]
    fn end_effector_pose_override() {
        let mut bridge = MemoryBridge::default();
        let pose = Isometry3::translation(0.3, 0.0, 0.5);
        bridge.set_end_effector_pose(pose);
        assert_eq!(bridge.end_effector_pose(), pose);
    }
}
