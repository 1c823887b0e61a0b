//! The pick-and-place motion sequencer.
//!
//! A [`Sequencer`] owns the phase state machine for one run: it walks the
//! fixed [`PROGRAM`](crate::phases::PROGRAM) for each queued target, asks
//! the redundancy resolver for a joint configuration at every phase
//! boundary, and writes eased joint and gripper commands through the
//! [`ArmBridge`] every tick.
//!
//! The caller drives it from the simulation loop:
//!
//! ```text
//! loop {
//!     match sequencer.update(&mut bridge, dt) {
//!         SequenceEvent::Continuing => {}
//!         SequenceEvent::ItemCompleted(id) => { /* one item placed */ }
//!         SequenceEvent::BatchFinished => break,
//!     }
//! }
//! ```
//!
//! A phase whose target the resolver cannot reach holds the previous joint
//! target for its whole duration and the program still advances on
//! schedule; the failure is logged, never raised.

use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use tracing::warn;

use graspers_core::bridge::ArmBridge;
use graspers_core::config::{PlaceMode, SequenceConfig};
use graspers_core::types::{JointVector, TargetId, TargetRef};
use graspers_ik::{forward, RedundancyResolver, NEUTRAL};

use crate::interp::{blend_indicator, blend_joints, phase_progress};
use crate::phases::{Phase, PhaseSpec, TargetRule, HOME_STEP, PROGRAM};
use crate::placement::PlacementGrid;

// ---------------------------------------------------------------------------
// SequenceEvent
// ---------------------------------------------------------------------------

/// Outcome of one `update` tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// The sequence is idle or still mid-program.
    Continuing,
    /// One item finished its cycle; carries the item's identifier.
    ItemCompleted(TargetId),
    /// The queue is exhausted and the arm has returned home.
    BatchFinished,
}

// ---------------------------------------------------------------------------
// SequencerState
// ---------------------------------------------------------------------------

/// Mutable state of one run.
#[derive(Debug, Clone)]
pub struct SequencerState {
    /// Index into [`PROGRAM`].
    pub phase_index: usize,
    /// Seconds of (speed-scaled) time spent in the current phase.
    pub elapsed: f64,
    /// Joint configuration at the start of the current phase.
    pub start_joints: JointVector,
    /// Joint configuration the current phase drives toward.
    pub target_joints: JointVector,
    /// Indicator pose at the start of the current phase.
    pub start_indicator: Isometry3<f64>,
    /// Indicator pose the current phase drives toward.
    pub target_indicator: Isometry3<f64>,
    /// Targets for this run, processed strictly in order.
    pub queue: Vec<TargetRef>,
    /// Index of the target currently being picked.
    pub queue_index: usize,
    /// Items already placed; drives the stacking grid.
    pub placed_count: usize,
    /// Whether a run is active.
    pub running: bool,
}

impl SequencerState {
    fn idle() -> Self {
        Self {
            phase_index: 0,
            elapsed: 0.0,
            start_joints: NEUTRAL,
            target_joints: NEUTRAL,
            start_indicator: forward(&NEUTRAL),
            target_indicator: forward(&NEUTRAL),
            queue: Vec::new(),
            queue_index: 0,
            placed_count: 0,
            running: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Drives the arm through the pick-and-place program.
#[derive(Debug, Clone)]
pub struct Sequencer {
    config: SequenceConfig,
    resolver: RedundancyResolver,
    grid: Option<PlacementGrid>,
    state: SequencerState,
}

impl Sequencer {
    /// Create an idle sequencer.
    #[must_use]
    pub fn new(config: SequenceConfig) -> Self {
        Self {
            config,
            resolver: RedundancyResolver::default(),
            grid: None,
            state: SequencerState::idle(),
        }
    }

    /// Whether a run is active.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Items placed so far in the current run.
    #[must_use]
    pub const fn placed_count(&self) -> usize {
        self.state.placed_count
    }

    /// The phase currently executing.
    #[must_use]
    pub fn phase(&self) -> Phase {
        PROGRAM[self.state.phase_index].phase
    }

    /// Read access to the run state.
    #[must_use]
    pub const fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Begin a run over `targets`.
    ///
    /// A no-op returning `false` when the queue is empty or no drop zone is
    /// configured; the sequencer stays idle and no state changes.
    pub fn start<B: ArmBridge>(&mut self, bridge: &B, targets: Vec<TargetRef>) -> bool {
        if targets.is_empty() {
            return false;
        }
        let Some(zone) = self.config.drop_zone else {
            return false;
        };

        self.grid = Some(PlacementGrid::from_config(&zone));
        let current = bridge.joint_positions();
        let indicator = bridge.end_effector_pose();
        self.state = SequencerState {
            phase_index: 0,
            elapsed: 0.0,
            start_joints: current,
            target_joints: current,
            start_indicator: indicator,
            target_indicator: indicator,
            queue: targets,
            queue_index: 0,
            placed_count: 0,
            running: true,
        };
        self.prepare_step(bridge);
        true
    }

    /// Abort the current run, clearing phase and queue state.
    ///
    /// In-flight interpolation is discarded; actuator channels simply stop
    /// being written.
    pub fn stop(&mut self) {
        self.reset();
    }

    /// Clear all run state back to idle.
    pub fn reset(&mut self) {
        self.grid = None;
        self.state = SequencerState::idle();
    }

    /// Advance the run by `dt` seconds of wall time.
    ///
    /// Writes the interpolated joint targets and the phase's gripper
    /// command through the bridge, then advances the phase machine if the
    /// (speed-scaled) phase timer has elapsed. A no-op returning
    /// [`SequenceEvent::Continuing`] while idle.
    pub fn update<B: ArmBridge>(&mut self, bridge: &mut B, dt: f64) -> SequenceEvent {
        if !self.state.running {
            return SequenceEvent::Continuing;
        }

        let spec = &PROGRAM[self.state.phase_index];
        let duration = self.phase_duration(spec);

        self.state.elapsed += dt * self.config.speed;
        let progress = phase_progress(self.state.elapsed, duration);

        let joints = blend_joints(&self.state.start_joints, &self.state.target_joints, progress);
        bridge.write_joint_targets(&joints);
        bridge.write_gripper(spec.gripper);

        if self.state.elapsed >= duration {
            self.advance(bridge)
        } else {
            SequenceEvent::Continuing
        }
    }

    /// Current pose of the visual end-effector indicator.
    ///
    /// Purely cosmetic: follows the phase's blend mode and has no effect on
    /// actuator commands.
    #[must_use]
    pub fn indicator_pose(&self) -> Isometry3<f64> {
        let spec = &PROGRAM[self.state.phase_index];
        let progress = phase_progress(self.state.elapsed, self.phase_duration(spec));
        blend_indicator(
            &self.state.start_indicator,
            &self.state.target_indicator,
            progress,
            spec.blend,
        )
    }

    /// Snap the visual indicator to the live end-effector pose.
    ///
    /// Used when handing control to a manual IK operator while no run is
    /// active; does nothing mid-run.
    pub fn resync_indicator<B: ArmBridge>(&mut self, bridge: &B) {
        if self.state.running {
            return;
        }
        let pose = bridge.end_effector_pose();
        self.state.start_indicator = pose;
        self.state.target_indicator = pose;
    }

    // -- internals ----------------------------------------------------------

    fn phase_duration(&self, spec: &PhaseSpec) -> f64 {
        spec.base_duration * self.config.place_mode.duration_multiplier()
    }

    /// Orientation for every solved target: tool approach axis pointing
    /// straight down.
    fn grasp_orientation() -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
    }

    /// Phase-timer rollover: advance the phase machine by one step.
    fn advance<B: ArmBridge>(&mut self, bridge: &mut B) -> SequenceEvent {
        if self.state.phase_index == HOME_STEP {
            // Return-home interpolation finished; the batch is done.
            self.state.running = false;
            return SequenceEvent::BatchFinished;
        }

        if PROGRAM[self.state.phase_index].phase == Phase::LiftAfterRelease {
            // The current item's cycle is complete.
            let id = self.state.queue[self.state.queue_index].id();
            self.state.placed_count += 1;
            self.state.queue_index += 1;

            if self.state.queue_index < self.state.queue.len() {
                self.state.phase_index = 0;
            } else {
                self.state.phase_index = HOME_STEP;
            }
            self.prepare_step(bridge);
            return SequenceEvent::ItemCompleted(id);
        }

        self.state.phase_index += 1;
        self.prepare_step(bridge);
        SequenceEvent::Continuing
    }

    /// Compute the new phase's joint and indicator targets and reset the
    /// phase timer.
    fn prepare_step<B: ArmBridge>(&mut self, bridge: &B) {
        let spec = &PROGRAM[self.state.phase_index];
        self.state.elapsed = 0.0;
        self.state.start_joints = self.state.target_joints;
        self.state.start_indicator = self.state.target_indicator;

        if spec.uses_preset {
            self.state.target_joints = NEUTRAL;
            self.state.target_indicator = forward(&NEUTRAL);
            return;
        }

        let Some(position) = self.target_position(bridge, spec.target) else {
            warn!(
                phase = ?spec.phase,
                "phase target unavailable, holding position"
            );
            return;
        };

        let pose = Isometry3::from_parts(position.into(), Self::grasp_orientation());
        let current = bridge.joint_positions();
        match self.resolver.solve(&pose, &current) {
            Some(joints) => {
                self.state.target_joints = joints;
                self.state.target_indicator = pose;
            }
            None => {
                // Unreachable for every scanned q7: hold the previous
                // target and let the phase run out its timer.
                warn!(
                    phase = ?spec.phase,
                    x = pose.translation.x,
                    y = pose.translation.y,
                    z = pose.translation.z,
                    "phase target unreachable, holding position"
                );
            }
        }
    }

    /// The Cartesian point a target rule resolves to right now.
    fn target_position<B: ArmBridge>(
        &self,
        bridge: &B,
        rule: TargetRule,
    ) -> Option<Vector3<f64>> {
        match rule {
            TargetRule::PickHover | TargetRule::PickGrasp | TargetRule::PickLift => {
                let pick = self.pick_position(bridge)?;
                let height = match rule {
                    TargetRule::PickHover => self.config.hover_height,
                    TargetRule::PickGrasp => self.config.grasp_height,
                    _ => self.config.lift_height,
                };
                Some(pick + Vector3::new(0.0, 0.0, height))
            }
            TargetRule::DropHover | TargetRule::DropRelease | TargetRule::DropLift => {
                let slot = self.drop_slot()?;
                let height = match rule {
                    TargetRule::DropRelease => {
                        self.config.grasp_height + self.config.release_clearance
                    }
                    _ => self.config.lift_height,
                };
                Some(slot + Vector3::new(0.0, 0.0, height))
            }
            TargetRule::Home => None,
        }
    }

    /// Current pick position: live bodies are re-read from the bridge at
    /// every phase boundary, static points were captured at `start()`.
    fn pick_position<B: ArmBridge>(&self, bridge: &B) -> Option<Vector3<f64>> {
        match self.state.queue.get(self.state.queue_index)? {
            TargetRef::Body(id) => bridge.body_position(*id),
            TargetRef::Point(target) => Some(target.position),
        }
    }

    /// Drop slot for the item currently being placed.
    fn drop_slot(&self) -> Option<Vector3<f64>> {
        let grid = self.grid.as_ref()?;
        Some(match self.config.place_mode {
            PlaceMode::Fixed => grid.origin(),
            PlaceMode::Stack => grid.slot(self.state.placed_count),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
