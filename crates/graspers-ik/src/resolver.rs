//! Redundancy resolution over the joint-7 scan parameter.
//!
//! The analytical solver answers "which configurations reach this pose with
//! joint 7 pinned here?"; the resolver answers "which single configuration
//! should the arm actually take?". It scans candidate joint-7 values, ranks
//! every configuration the solver returns by a continuity-plus-neutrality
//! cost, and keeps the global minimum.

use nalgebra::Isometry3;
use tracing::{debug, warn};

use graspers_core::types::{JointVector, JOINT_LIMITS};

use crate::arm::NEUTRAL;
use crate::solver;

/// Half-width of the fine scan window around the current joint-7 angle.
const LOCAL_WINDOW: f64 = 0.35;
/// Step of the fine scan.
const LOCAL_STEP: f64 = 0.05;
/// Step of the full-range fallback scan.
const FULL_STEP: f64 = 0.2;
/// Margin kept from the exact joint-7 limits during the fallback scan.
const FULL_MARGIN: f64 = 0.05;

// ---------------------------------------------------------------------------
// RedundancyResolver
// ---------------------------------------------------------------------------

/// Selects one joint configuration for a target pose.
///
/// Stateless apart from immutable weights and the neutral reference pose;
/// identical inputs always produce identical output.
#[derive(Debug, Clone)]
pub struct RedundancyResolver {
    /// Weight on squared distance to the current configuration.
    continuity_weight: f64,
    /// Weight on squared distance to the neutral configuration.
    neutrality_weight: f64,
    /// Reference pose the arm prefers to stay near.
    neutral: JointVector,
}

impl Default for RedundancyResolver {
    fn default() -> Self {
        Self {
            continuity_weight: 1.0,
            neutrality_weight: 0.35,
            neutral: NEUTRAL,
        }
    }
}

impl RedundancyResolver {
    /// Create a resolver with explicit cost weights.
    #[must_use]
    pub const fn new(continuity_weight: f64, neutrality_weight: f64) -> Self {
        Self {
            continuity_weight,
            neutrality_weight,
            neutral: NEUTRAL,
        }
    }

    /// Cost of a candidate relative to the current configuration.
    fn cost(&self, candidate: &JointVector, current: &JointVector) -> f64 {
        self.continuity_weight * candidate.distance_squared(current)
            + self.neutrality_weight * candidate.distance_squared(&self.neutral)
    }

    /// Pick the minimum-cost configuration reaching `target`.
    ///
    /// Scan order: the current joint-7 angle, then a fine window around it,
    /// then (only if nothing was found) a coarse sweep of the full joint-7
    /// range. Returns `None` only when the full sweep produces no candidate,
    /// i.e. the pose is unreachable in any configuration.
    #[must_use]
    pub fn solve(
        &self,
        target: &Isometry3<f64>,
        current: &JointVector,
    ) -> Option<JointVector> {
        let mut best: Option<(f64, JointVector)> = None;

        let mut consider = |q7: f64, best: &mut Option<(f64, JointVector)>| {
            for candidate in solver::solve(target, q7) {
                let cost = self.cost(&candidate, current);
                if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                    *best = Some((cost, candidate));
                }
            }
        };

        consider(current[6], &mut best);

        let steps = (LOCAL_WINDOW / LOCAL_STEP) as i32;
        for k in -steps..=steps {
            consider(current[6] + f64::from(k) * LOCAL_STEP, &mut best);
        }

        if best.is_none() {
            debug!("local q7 window exhausted, falling back to full-range scan");
            let (lo, hi) = JOINT_LIMITS[6];
            let mut q7 = lo + FULL_MARGIN;
            while q7 < hi {
                consider(q7, &mut best);
                q7 += FULL_STEP;
            }
        }

        if best.is_none() {
            warn!(
                "pose at ({:.3}, {:.3}, {:.3}) unreachable for every scanned q7",
                target.translation.x, target.translation.y, target.translation.z
            );
        }

        best.map(|(_, q)| q)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
