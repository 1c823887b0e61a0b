//! Closed-form analytical solver for the 7-DOF arm.
//!
//! [`solve`] maps a target tool pose plus a fixed joint-7 angle (the
//! redundancy parameter) to every joint configuration that reaches the pose
//! with that joint-7 value. The chain decomposes geometrically once joint 7
//! is pinned: the wrist center follows from the tool offset, the elbow angle
//! from the shoulder-elbow-wrist triangle, and the remaining joints from two
//! nested two-way branches (wrist mirror, shoulder mirror), giving 0, 2, or
//! 4 candidates before limit pruning.
//!
//! The solver is a pure function: no state, no side effects, safe to call
//! concurrently. Unreachable poses produce an empty list, never an error.

use nalgebra::{Isometry3, Matrix3, Vector3};

use graspers_core::types::{JointVector, JOINT_LIMITS};

use crate::arm::{A4, A7, D1, D3, D5, D7E, L24, L46, LL24, LL46, THETA_342, THETA_46H, THETA_H46};

use std::f64::consts::{FRAC_PI_4, PI};

/// Cosine threshold beyond which the shoulder-to-virtual-elbow direction is
/// treated as vertical and joints 1/2 degenerate.
const SHOULDER_SINGULARITY_COS: f64 = 0.999;

/// Clamp an inverse-trig argument into its domain.
///
/// Absorbs floating-point overshoot at workspace boundaries so `acos`/`asin`
/// never see values outside `[-1, 1]`.
fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Strict limit check for one joint.
fn within_limit(index: usize, q: f64) -> bool {
    let (lo, hi) = JOINT_LIMITS[index];
    q > lo && q < hi
}

/// All joint configurations reaching `target` with joint 7 fixed at `q7`.
///
/// Candidates are enumerated in a fixed order (first wrist branch before the
/// second, direct shoulder pair before the mirrored pair) and each is fully
/// inside the joint limit table. An empty result means no configuration
/// exists for this `q7`; it says nothing about other joint-7 values.
#[must_use]
pub fn solve(target: &Isometry3<f64>, q7: f64) -> Vec<JointVector> {
    let mut solutions = Vec::new();

    if !within_limit(6, q7) {
        return solutions;
    }

    let rotation = *target.rotation.to_rotation_matrix().matrix();
    let z_ee = rotation.column(2).into_owned();
    let p_ee = target.translation.vector;

    // Wrist center: retract from the tool frame along the approach axis.
    let p7 = p_ee - D7E * z_ee;

    // Frame-6 x-axis from the fixed tool twist and the pinned joint 7, then
    // the frame-6 origin by retracting along it.
    let x6_in_ee = Vector3::new((q7 - FRAC_PI_4).cos(), -(q7 - FRAC_PI_4).sin(), 0.0);
    let x6 = (rotation * x6_in_ee).normalize();
    let p6 = p7 - A7 * x6;

    // Shoulder-elbow-wrist triangle.
    let p2 = Vector3::new(0.0, 0.0, D1);
    let v26 = p6 - p2;
    let ll26 = v26.norm_squared();
    let l26 = ll26.sqrt();

    if L24 + L46 < l26 || L24 + l26 < L46 || l26 + L46 < L24 {
        return solutions;
    }

    // Elbow angle: unique for the admissible elbow branch.
    let theta246 = clamp_unit((LL24 + LL46 - ll26) / (2.0 * L24 * L46)).acos();
    let q4 = theta246 + THETA_H46 + THETA_342 - 2.0 * PI;
    if !within_limit(3, q4) {
        return solutions;
    }

    let theta462 = clamp_unit((ll26 + LL46 - LL24) / (2.0 * l26 * L46)).acos();
    let theta26h = THETA_46H + theta462;
    let d26 = -l26 * theta26h.cos();

    // Orthonormal frame-6 basis from the approach axis and x6.
    let z6 = z_ee.cross(&x6);
    let y6 = z6.cross(&x6);
    let r6 = Matrix3::from_columns(&[x6, y6.normalize(), z6.normalize()]);

    // Amplitude/phase decomposition of the wrist-to-shoulder vector in
    // frame 6 yields the two joint-6 branches.
    let v_6_62 = r6.transpose() * (-v26);
    let phi6 = v_6_62.y.atan2(v_6_62.x);
    let theta6 = clamp_unit(d26 / v_6_62.xy().norm()).asin();

    for q6_raw in [PI - theta6 - phi6, theta6 - phi6] {
        // Joint 6's limit window is not centered on zero; shift by a full
        // turn into it before checking.
        let (lo6, hi6) = JOINT_LIMITS[5];
        let mut q6 = q6_raw;
        if q6 <= lo6 {
            q6 += 2.0 * PI;
        } else if q6 >= hi6 {
            q6 -= 2.0 * PI;
        }
        if !within_limit(5, q6) {
            continue;
        }

        // Virtual elbow: intersection of the upper-arm and forearm axes.
        let theta_p26 = 3.0 * std::f64::consts::FRAC_PI_2 - theta462 - theta246 - THETA_342;
        let theta_p = PI - theta_p26 - theta26h;
        let lp6 = l26 * theta_p26.sin() / theta_p.sin();

        let z5 = r6 * Vector3::new(q6.sin(), q6.cos(), 0.0);
        let v2p = p6 - lp6 * z5 - p2;
        let l2p = v2p.norm();

        // Two shoulder branches, or a single degenerate pair when the
        // shoulder-to-virtual-elbow direction is vertical and joint 1 is
        // indeterminate.
        let shoulder_pairs: Vec<(f64, f64)> = if (v2p.z / l2p).abs() > SHOULDER_SINGULARITY_COS {
            vec![(0.0, 0.0)]
        } else {
            let q1 = v2p.y.atan2(v2p.x);
            let q2 = clamp_unit(v2p.z / l2p).acos();
            let q1_mirror = if q1 < 0.0 { q1 + PI } else { q1 - PI };
            vec![(q1, q2), (q1_mirror, -q2)]
        };

        for (q1, q2) in shoulder_pairs {
            if !within_limit(0, q1) || !within_limit(1, q2) {
                continue;
            }

            // Joint 3 from the elbow-plane basis projected into the
            // shoulder frame.
            let z3 = v2p / l2p;
            let y3 = (-v26.cross(&v2p)).normalize();
            let x3 = y3.cross(&z3);

            let (s1, c1) = q1.sin_cos();
            let (s2, c2) = q2.sin_cos();
            let r1 = Matrix3::new(c1, -s1, 0.0, s1, c1, 0.0, 0.0, 0.0, 1.0);
            let r1_2 = Matrix3::new(c2, -s2, 0.0, 0.0, 0.0, 1.0, -s2, -c2, 0.0);
            let r2 = r1 * r1_2;
            let x3_in_2 = r2.transpose() * x3;
            let q3 = x3_in_2.z.atan2(x3_in_2.x);
            if !within_limit(2, q3) {
                continue;
            }

            // Joint 5 last, from the residual elbow offset seen in frame 5.
            let vh4 = p2 + D3 * z3 + A4 * x3 - p6 + D5 * z5;
            let (s6, c6) = q6.sin_cos();
            let r5_6 = Matrix3::new(c6, -s6, 0.0, 0.0, 0.0, -1.0, s6, c6, 0.0);
            let r5 = r6 * r5_6.transpose();
            let vh4_in_5 = r5.transpose() * vh4;
            let q5 = -vh4_in_5.y.atan2(vh4_in_5.x);
            if !within_limit(4, q5) {
                continue;
            }

            solutions.push(JointVector::new([q1, q2, q3, q4, q5, q6, q7]));
        }
    }

    solutions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::{forward, NEUTRAL};
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use rand::Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pose_reproduced(candidate: &JointVector, target: &Isometry3<f64>) -> bool {
        let ee = forward(candidate);
        let pos_err = (ee.translation.vector - target.translation.vector).norm();
        let rot_err = ee.rotation.angle_to(&target.rotation);
        pos_err < 1e-3 && rot_err < 1e-3
    }

    fn random_configuration(rng: &mut ChaCha8Rng) -> JointVector {
        let mut q = JointVector::zeros();
        for (i, (lo, hi)) in JOINT_LIMITS.iter().enumerate() {
            q[i] = rng.gen_range(*lo..*hi);
        }
        q
    }

    #[test]
    fn reachable_pose_identity_rotation() {
        let target = Isometry3::translation(0.4, 0.0, 0.4);
        let candidates = solve(&target, 0.0);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(c.within_limits());
            assert!(pose_reproduced(c, &target));
        }
    }

    #[test]
    fn out_of_reach_pose_is_empty_for_all_q7() {
        let target = Isometry3::translation(2.0, 0.0, 0.4);
        let (lo, hi) = JOINT_LIMITS[6];
        let mut q7 = lo + 0.01;
        while q7 < hi {
            assert!(solve(&target, q7).is_empty());
            q7 += 0.05;
        }
    }

    #[test]
    fn q7_outside_limits_is_empty() {
        let target = Isometry3::translation(0.4, 0.0, 0.4);
        assert!(solve(&target, 3.5).is_empty());
        assert!(solve(&target, -3.5).is_empty());
    }

    #[test]
    fn neutral_pose_round_trip() {
        let target = forward(&NEUTRAL);
        let candidates = solve(&target, NEUTRAL[6]);
        assert!(!candidates.is_empty());
        for c in &candidates {
            let ee = forward(c);
            assert_relative_eq!(
                (ee.translation.vector - target.translation.vector).norm(),
                0.0,
                epsilon = 1e-8
            );
            assert!(ee.rotation.angle_to(&target.rotation) < 1e-8);
        }
    }

    #[test]
    fn sampled_workspace_round_trip_and_limits() {
        // Sample configurations, run them through FK, and solve the
        // resulting poses. Not every configuration's pose admits a solution
        // with the enumerated elbow branch, but every candidate returned
        // must satisfy the limits and reproduce the pose through FK.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut nonempty = 0;
        for _ in 0..300 {
            let q = random_configuration(&mut rng);
            let target = forward(&q);
            let candidates = solve(&target, q[6]);
            assert!(candidates.len() <= 4);
            if !candidates.is_empty() {
                nonempty += 1;
            }
            for c in &candidates {
                assert!(c.within_limits(), "candidate out of limits: {c:?}");
                let ee = forward(c);
                let pos_err = (ee.translation.vector - target.translation.vector).norm();
                let rot_err = ee.rotation.angle_to(&target.rotation);
                assert!(pos_err < 1e-8, "position error {pos_err}");
                assert!(rot_err < 1e-8, "rotation error {rot_err}");
            }
        }
        // The admissible elbow branch covers most of the sampled workspace.
        assert!(nonempty > 200, "only {nonempty} poses solvable");
    }

    #[test]
    fn downward_grasp_pose_solvable() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI);
        let target = Isometry3::from_parts(Vector3::new(0.45, 0.15, 0.27).into(), rotation);
        let candidates = solve(&target, 1.0);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(pose_reproduced(c, &target));
        }
    }

    #[test]
    fn enumeration_order_is_deterministic() {
        let target = Isometry3::translation(0.4, 0.0, 0.4);
        let a = solve(&target, 0.0);
        let b = solve(&target, 0.0);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.as_array(), y.as_array());
        }
    }

    #[test]
    fn triangle_inequality_short_side() {
        // A target whose wrist center lands on the shoulder itself is
        // closer than the links can fold.
        let x6 = Vector3::new(FRAC_PI_4.cos(), FRAC_PI_4.sin(), 0.0);
        let p_ee = Vector3::new(0.0, 0.0, D1) + D7E * Vector3::z() + A7 * x6;
        let target = Isometry3::translation(p_ee.x, p_ee.y, p_ee.z);
        let candidates = solve(&target, 0.0);
        assert!(candidates.is_empty());
    }
}
