//! Pick-and-place motion sequencing for the Graspers arm.
//!
//! # Architecture
//!
//! ```text
//! tick loop ──► Sequencer::update ──► RedundancyResolver (phase boundaries)
//!                      │
//!                      ├─► joint + gripper commands (ArmBridge)
//!                      └─► SequenceEvent (Continuing / ItemCompleted / BatchFinished)
//! ```
//!
//! The sequencer walks a fixed, data-driven phase program per queued item,
//! solving a fresh joint target at each phase boundary and easing toward it
//! every tick. Everything is synchronous and deterministic: one `update`
//! call performs a bounded amount of work and the same inputs always
//! produce the same commands.

pub mod interp;
pub mod phases;
pub mod placement;
pub mod sequencer;

pub use interp::IndicatorBlend;
pub use phases::{Phase, PhaseSpec, TargetRule, PROGRAM};
pub use placement::PlacementGrid;
pub use sequencer::{SequenceEvent, Sequencer, SequencerState};
