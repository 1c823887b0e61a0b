//! Fixed arm geometry: modified-DH link constants, the neutral pose, and
//! forward kinematics.
//!
//! The arm is a 7-DOF revolute chain with a spherical-ish wrist broken by
//! two small lateral offsets ([`A4`] at the elbow, [`A7`] at the wrist) and
//! a tool flange rotated 45 degrees about the approach axis. All angles are
//! radians, all lengths meters.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion};

use graspers_core::types::{JointVector, DOF};

// ---------------------------------------------------------------------------
// Link constants
// ---------------------------------------------------------------------------

/// Base to shoulder height.
pub const D1: f64 = 0.333;
/// Shoulder to elbow length along the upper-arm axis.
pub const D3: f64 = 0.316;
/// Elbow to wrist length along the forearm axis.
pub const D5: f64 = 0.384;
/// Flange-plus-tool offset from the wrist along the approach axis.
pub const D7E: f64 = 0.2104;
/// Lateral elbow offset.
pub const A4: f64 = 0.0825;
/// Lateral wrist offset.
pub const A7: f64 = 0.088;

/// Squared shoulder-to-elbow link length, `A4^2 + D3^2`.
pub const LL24: f64 = 0.106_662_25;
/// Squared elbow-to-wrist link length, `A4^2 + D5^2`.
pub const LL46: f64 = 0.154_262_25;
/// Shoulder-to-elbow link length, `sqrt(LL24)`.
pub const L24: f64 = 0.326_591_870_688_784_9;
/// Elbow-to-wrist link length, `sqrt(LL46)`.
pub const L46: f64 = 0.392_762_332_715_345_83;

/// `atan2(D5, A4)`: elbow-triangle angle opposite the forearm.
pub const THETA_H46: f64 = 1.359_169_518_029_266_9;
/// `atan2(D3, A4)`: elbow-triangle angle opposite the upper arm.
pub const THETA_342: f64 = 1.315_420_711_907_514_8;
/// `atan2(A4, D5)`: wrist-side offset angle.
pub const THETA_46H: f64 = 0.211_626_808_765_629_78;

/// Fixed rotation between the flange and the tool frame about the approach
/// axis.
pub const TOOL_TWIST: f64 = -FRAC_PI_4;

/// Neutral ("ready") configuration. Also the home preset the sequencer
/// returns to after the last item is placed.
pub const NEUTRAL: JointVector = JointVector::new([
    0.0,
    -FRAC_PI_4,
    0.0,
    -2.356_194_490_192_345,
    0.0,
    FRAC_PI_2,
    FRAC_PI_4,
]);

/// Modified-DH rows `(alpha, a, d)` for joints 1..=7; `theta` is the joint
/// variable.
const DH_TABLE: [(f64, f64, f64); DOF] = [
    (0.0, 0.0, D1),
    (-FRAC_PI_2, 0.0, 0.0),
    (FRAC_PI_2, 0.0, D3),
    (FRAC_PI_2, A4, 0.0),
    (-FRAC_PI_2, -A4, D5),
    (FRAC_PI_2, 0.0, 0.0),
    (FRAC_PI_2, A7, 0.0),
];

// ---------------------------------------------------------------------------
// Forward kinematics
// ---------------------------------------------------------------------------

/// Transform from frame `i-1` to frame `i` for one modified-DH row.
fn dh_transform(alpha: f64, a: f64, theta: f64, d: f64) -> Isometry3<f64> {
    let (sa, ca) = alpha.sin_cos();
    let (st, ct) = theta.sin_cos();
    let rotation = Matrix3::new(
        ct,
        -st,
        0.0,
        st * ca,
        ct * ca,
        -sa,
        st * sa,
        ct * sa,
        ca,
    );
    Isometry3::from_parts(
        Translation3::new(a, -d * sa, d * ca),
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation)),
    )
}

/// Tool-frame pose in the base frame for a joint configuration.
#[must_use]
pub fn forward(q: &JointVector) -> Isometry3<f64> {
    let mut transform = Isometry3::identity();
    for (i, (alpha, a, d)) in DH_TABLE.iter().enumerate() {
        transform *= dh_transform(*alpha, *a, q[i], *d);
    }
    // Flange + tool: translate along the approach axis, then the fixed twist.
    transform
        * Isometry3::from_parts(
            Translation3::new(0.0, 0.0, D7E),
            UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), TOOL_TWIST),
        )
}

// ---------------------------------------------------------------------------
// Angle helpers
// ---------------------------------------------------------------------------

/// Wrap an angle to `(-pi, pi]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
