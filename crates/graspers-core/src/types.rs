use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Number of actuated arm joints.
pub const DOF: usize = 7;

/// Per-joint position limits in radians, `(lower, upper)`.
///
/// Every [`JointVector`] produced by the solver or chosen by the resolver
/// satisfies this table.
pub const JOINT_LIMITS: [(f64, f64); DOF] = [
    (-2.8973, 2.8973),
    (-1.7628, 1.7628),
    (-2.8973, 2.8973),
    (-3.0718, -0.0698),
    (-2.8973, 2.8973),
    (-0.0175, 3.7525),
    (-2.8973, 2.8973),
];

/// Gripper actuator command for fully open fingers.
pub const GRIPPER_OPEN: u8 = 255;

/// Gripper actuator command for fully closed fingers.
pub const GRIPPER_CLOSED: u8 = 0;

// ---------------------------------------------------------------------------
// JointVector
// ---------------------------------------------------------------------------

/// Ordered joint angles for the 7-DOF arm, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointVector([f64; DOF]);

impl JointVector {
    /// Create from an explicit angle array.
    #[must_use]
    pub const fn new(angles: [f64; DOF]) -> Self {
        Self(angles)
    }

    /// All joints at zero.
    #[must_use]
    pub const fn zeros() -> Self {
        Self([0.0; DOF])
    }

    /// Slice view of the angles.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The underlying angle array.
    #[must_use]
    pub const fn as_array(&self) -> [f64; DOF] {
        self.0
    }

    /// Squared Euclidean distance to another configuration.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Whether every joint satisfies [`JOINT_LIMITS`].
    #[must_use]
    pub fn within_limits(&self) -> bool {
        self.0
            .iter()
            .zip(JOINT_LIMITS.iter())
            .all(|(q, (lo, hi))| q >= lo && q <= hi)
    }

    /// Copy with every joint clamped into [`JOINT_LIMITS`].
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut out = self.0;
        for (q, (lo, hi)) in out.iter_mut().zip(JOINT_LIMITS.iter()) {
            *q = q.clamp(*lo, *hi);
        }
        Self(out)
    }
}

impl std::ops::Index<usize> for JointVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl std::ops::IndexMut<usize> for JointVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl From<[f64; DOF]> for JointVector {
    fn from(angles: [f64; DOF]) -> Self {
        Self(angles)
    }
}

// ---------------------------------------------------------------------------
// Pick targets
// ---------------------------------------------------------------------------

/// Opaque identifier for a pick target or simulated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// A static pick target: a world-space point plus its identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTarget {
    pub id: TargetId,
    pub position: Vector3<f64>,
}

impl PickTarget {
    #[must_use]
    pub const fn new(id: TargetId, position: Vector3<f64>) -> Self {
        Self { id, position }
    }
}

/// One entry in the sequencer's target queue.
///
/// `Body` targets have their position re-read from the simulation bridge at
/// the start of each phase; `Point` targets are captured once at sequence
/// start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetRef {
    /// A live simulated body, tracked by the physics collaborator.
    Body(TargetId),
    /// A fixed world-space point (e.g. from a perception pass).
    Point(PickTarget),
}

impl TargetRef {
    /// The identifier reported in completion events.
    #[must_use]
    pub const fn id(&self) -> TargetId {
        match self {
            Self::Body(id) => *id,
            Self::Point(target) => target.id,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_within_limits_except_locked_joints() {
        // Joint 4 and joint 6 have limit windows that exclude zero, so the
        // all-zero vector is deliberately out of limits.
        let q = JointVector::zeros();
        assert!(!q.within_limits());
    }

    #[test]
    fn ready_pose_within_limits() {
        let q = JointVector::new([
            0.0,
            -std::f64::consts::FRAC_PI_4,
            0.0,
            -2.356_194_490_192_345,
            0.0,
            std::f64::consts::FRAC_PI_2,
            std::f64::consts::FRAC_PI_4,
        ]);
        assert!(q.within_limits());
    }

    #[test]
    fn clamped_restores_limits() {
        let q = JointVector::new([5.0, -5.0, 0.0, 0.0, 0.0, 9.0, -9.0]);
        let c = q.clamped();
        assert!(c.within_limits());
        assert!((c[0] - 2.8973).abs() < f64::EPSILON);
        assert!((c[1] - (-1.7628)).abs() < f64::EPSILON);
        assert!((c[3] - (-0.0698)).abs() < f64::EPSILON);
        assert!((c[5] - 3.7525).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_squared_is_componentwise() {
        let a = JointVector::new([0.0; DOF]);
        let mut b = JointVector::zeros();
        b[0] = 3.0;
        b[6] = 4.0;
        assert!((a.distance_squared(&b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn indexing_round_trip() {
        let mut q = JointVector::zeros();
        q[2] = 1.25;
        assert!((q[2] - 1.25).abs() < f64::EPSILON);
        assert!((q.as_slice()[2] - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn joint_vector_serde_roundtrip() {
        let q = JointVector::new([0.1, 0.2, 0.3, -1.0, 0.5, 1.0, 0.7]);
        let json = serde_json::to_string(&q).unwrap();
        let q2: JointVector = serde_json::from_str(&json).unwrap();
        assert_eq!(q, q2);
    }

    #[test]
    fn target_ref_id_for_both_variants() {
        let body = TargetRef::Body(TargetId(3));
        let point = TargetRef::Point(PickTarget::new(TargetId(9), Vector3::new(0.4, 0.0, 0.1)));
        assert_eq!(body.id(), TargetId(3));
        assert_eq!(point.id(), TargetId(9));
    }

    #[test]
    fn limit_table_is_well_formed() {
        for (lo, hi) in &JOINT_LIMITS {
            assert!(lo < hi);
        }
    }
}
