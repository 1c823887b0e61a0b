//! Per-tick trajectory blending.
//!
//! Joint targets blend with a smoothstep ease so velocity is zero at both
//! ends of a phase. The visual end-effector indicator blends separately:
//! long cross-workspace transits interpolate in cylindrical coordinates
//! (radius, bearing, height) so the marker arcs around the robot base
//! instead of cutting a chord through it; short phases interpolate
//! linearly. Neither blend affects actuator commands beyond the joint
//! vector itself.

use nalgebra::{Isometry3, Vector3};

use graspers_core::types::JointVector;
use graspers_ik::normalize_angle;

/// Radius below which a cylindrical bearing is meaningless.
const AXIS_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Progress and easing
// ---------------------------------------------------------------------------

/// Cubic smoothstep, `p^2 (3 - 2p)`.
#[must_use]
pub fn smoothstep(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    p * p * (3.0 - 2.0 * p)
}

/// Normalized phase progress, clamped to `[0, 1]`.
#[must_use]
pub fn phase_progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).min(1.0)
}

// ---------------------------------------------------------------------------
// Joint blending
// ---------------------------------------------------------------------------

/// Eased joint-space blend between two configurations.
#[must_use]
pub fn blend_joints(start: &JointVector, target: &JointVector, progress: f64) -> JointVector {
    let s = smoothstep(progress);
    let mut out = *start;
    for i in 0..7 {
        out[i] = start[i] + (target[i] - start[i]) * s;
    }
    out
}

// ---------------------------------------------------------------------------
// Indicator blending
// ---------------------------------------------------------------------------

/// How the visual indicator travels between two poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorBlend {
    /// Straight-line position blend.
    Linear,
    /// Radius/bearing/height blend about the base axis.
    Cylindrical,
}

/// Eased pose blend for the visual indicator.
///
/// Orientation always slerps; only the translation path differs between the
/// two modes.
#[must_use]
pub fn blend_indicator(
    start: &Isometry3<f64>,
    target: &Isometry3<f64>,
    progress: f64,
    blend: IndicatorBlend,
) -> Isometry3<f64> {
    let s = smoothstep(progress);
    let rotation = start
        .rotation
        .try_slerp(&target.rotation, s, 1e-9)
        .unwrap_or(target.rotation);

    let p0 = start.translation.vector;
    let p1 = target.translation.vector;
    let position = match blend {
        IndicatorBlend::Linear => p0 + (p1 - p0) * s,
        IndicatorBlend::Cylindrical => {
            let r0 = p0.xy().norm();
            let r1 = p1.xy().norm();
            // Degenerate radii borrow the other end's bearing.
            let a0 = if r0 < AXIS_EPSILON {
                p1.y.atan2(p1.x)
            } else {
                p0.y.atan2(p0.x)
            };
            let a1 = if r1 < AXIS_EPSILON { a0 } else { p1.y.atan2(p1.x) };

            let radius = r0 + (r1 - r0) * s;
            let bearing = a0 + normalize_angle(a1 - a0) * s;
            let height = p0.z + (p1.z - p0.z) * s;
            Vector3::new(radius * bearing.cos(), radius * bearing.sin(), height)
        }
    };

    Isometry3::from_parts(position.into(), rotation)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
