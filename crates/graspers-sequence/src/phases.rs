//! The fixed pick-and-place program.
//!
//! One item's cycle is fifteen phases, executed strictly in order. Each row
//! of [`PROGRAM`] is data, not code: its duration, gripper command, target
//! rule, and indicator blend mode drive the sequencer without any per-phase
//! dispatch logic. The final row either hands off to the next item or, when
//! the queue is empty, interpolates to the fixed home preset without
//! consulting the solver.

use graspers_core::types::{GRIPPER_CLOSED, GRIPPER_OPEN};

use crate::interp::IndicatorBlend;

/// Named phases of the pick-and-place cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MoveOverTarget,
    Hover,
    OpenGripper,
    LowerOnto,
    SettleWait,
    Grasp,
    GraspWait,
    Lift,
    MoveToDropZone,
    LowerToDrop,
    PreReleaseWait,
    Release,
    ReleaseWait,
    LiftAfterRelease,
    AdvanceOrReturnHome,
}

/// Which Cartesian target a phase drives toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRule {
    /// Above the pick target at hover height.
    PickHover,
    /// At the pick target's grasp height.
    PickGrasp,
    /// Above the pick target at lift height.
    PickLift,
    /// Above the current drop slot at lift height.
    DropHover,
    /// At the drop slot's release height.
    DropRelease,
    /// Above the drop slot at lift height.
    DropLift,
    /// The fixed home joint preset; bypasses the resolver.
    Home,
}

/// One row of the phase program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSpec {
    pub phase: Phase,
    /// Unscaled duration in seconds. The placement-mode multiplier and the
    /// global speed multiplier are applied at tick time.
    pub base_duration: f64,
    /// Gripper command held for the whole phase.
    pub gripper: u8,
    pub target: TargetRule,
    pub blend: IndicatorBlend,
    /// Whether the phase uses an explicit joint preset instead of a solve.
    pub uses_preset: bool,
}

const fn step(
    phase: Phase,
    base_duration: f64,
    gripper: u8,
    target: TargetRule,
    blend: IndicatorBlend,
) -> PhaseSpec {
    PhaseSpec {
        phase,
        base_duration,
        gripper,
        target,
        blend,
        uses_preset: matches!(target, TargetRule::Home),
    }
}

/// The fifteen-step program for one item.
pub const PROGRAM: [PhaseSpec; 15] = [
    step(
        Phase::MoveOverTarget,
        1.6,
        GRIPPER_CLOSED,
        TargetRule::PickHover,
        IndicatorBlend::Cylindrical,
    ),
    step(
        Phase::Hover,
        0.3,
        GRIPPER_CLOSED,
        TargetRule::PickHover,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::OpenGripper,
        0.4,
        GRIPPER_OPEN,
        TargetRule::PickHover,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::LowerOnto,
        1.0,
        GRIPPER_OPEN,
        TargetRule::PickGrasp,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::SettleWait,
        0.3,
        GRIPPER_OPEN,
        TargetRule::PickGrasp,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::Grasp,
        0.5,
        GRIPPER_CLOSED,
        TargetRule::PickGrasp,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::GraspWait,
        0.3,
        GRIPPER_CLOSED,
        TargetRule::PickGrasp,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::Lift,
        1.0,
        GRIPPER_CLOSED,
        TargetRule::PickLift,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::MoveToDropZone,
        1.6,
        GRIPPER_CLOSED,
        TargetRule::DropHover,
        IndicatorBlend::Cylindrical,
    ),
    step(
        Phase::LowerToDrop,
        1.0,
        GRIPPER_CLOSED,
        TargetRule::DropRelease,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::PreReleaseWait,
        0.3,
        GRIPPER_CLOSED,
        TargetRule::DropRelease,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::Release,
        0.4,
        GRIPPER_OPEN,
        TargetRule::DropRelease,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::ReleaseWait,
        0.3,
        GRIPPER_OPEN,
        TargetRule::DropRelease,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::LiftAfterRelease,
        0.8,
        GRIPPER_OPEN,
        TargetRule::DropLift,
        IndicatorBlend::Linear,
    ),
    step(
        Phase::AdvanceOrReturnHome,
        1.6,
        GRIPPER_OPEN,
        TargetRule::Home,
        IndicatorBlend::Cylindrical,
    ),
];

/// Index of the final (return-home) row.
pub const HOME_STEP: usize = PROGRAM.len() - 1;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_has_fifteen_steps_in_order() {
        assert_eq!(PROGRAM.len(), 15);
        let expected = [
            Phase::MoveOverTarget,
            Phase::Hover,
            Phase::OpenGripper,
            Phase::LowerOnto,
            Phase::SettleWait,
            Phase::Grasp,
            Phase::GraspWait,
            Phase::Lift,
            Phase::MoveToDropZone,
            Phase::LowerToDrop,
            Phase::PreReleaseWait,
            Phase::Release,
            Phase::ReleaseWait,
            Phase::LiftAfterRelease,
            Phase::AdvanceOrReturnHome,
        ];
        for (spec, phase) in PROGRAM.iter().zip(expected.iter()) {
            assert_eq!(spec.phase, *phase);
        }
    }

    #[test]
    fn only_home_step_uses_preset() {
        for (i, spec) in PROGRAM.iter().enumerate() {
            assert_eq!(spec.uses_preset, i == HOME_STEP);
        }
    }

    #[test]
    fn durations_are_positive() {
        for spec in &PROGRAM {
            assert!(spec.base_duration > 0.0);
        }
    }

    #[test]
    fn gripper_opens_before_grasp_and_after_release() {
        assert_eq!(PROGRAM[2].gripper, GRIPPER_OPEN); // OpenGripper
        assert_eq!(PROGRAM[5].gripper, GRIPPER_CLOSED); // Grasp
        assert_eq!(PROGRAM[11].gripper, GRIPPER_OPEN); // Release
        // The object is held closed for the whole transit.
        for spec in &PROGRAM[5..=10] {
            assert_eq!(spec.gripper, GRIPPER_CLOSED);
        }
    }

    #[test]
    fn long_transits_blend_cylindrically() {
        for (i, spec) in PROGRAM.iter().enumerate() {
            let expect_cylindrical = matches!(i, 0 | 8 | 14);
            assert_eq!(
                spec.blend == IndicatorBlend::Cylindrical,
                expect_cylindrical,
                "phase {i}"
            );
        }
    }
}
