// graspers-core: Types, config, errors, and the simulation bridge for Graspers.

pub mod bridge;
pub mod config;
pub mod error;
pub mod types;

pub use bridge::{ArmBridge, MemoryBridge};
pub use config::{DropZoneConfig, PlaceMode, SequenceConfig};
pub use error::{ConfigError, GraspersError};
pub use types::{
    JointVector, PickTarget, TargetId, TargetRef, DOF, GRIPPER_CLOSED, GRIPPER_OPEN, JOINT_LIMITS,
};
