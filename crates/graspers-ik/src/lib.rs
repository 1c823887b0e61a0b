//! Inverse kinematics for the Graspers 7-DOF arm.
//!
//! Provides the fixed arm geometry with forward kinematics, the closed-form
//! analytical solver, and redundancy resolution over the joint-7 scan
//! parameter.
//!
//! # Architecture
//!
//! ```text
//! target pose ──► RedundancyResolver ──► solver::solve (per q7) ──► JointVector
//! ```
//!
//! The solver enumerates every limit-respecting configuration for one pinned
//! joint-7 value; the resolver scans joint-7 candidates and keeps the
//! minimum-cost configuration relative to the current and neutral poses.

pub mod arm;
pub mod resolver;
pub mod solver;

pub use arm::{forward, normalize_angle, NEUTRAL};
pub use resolver::RedundancyResolver;
