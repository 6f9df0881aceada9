//! Gait generation and sequencing
//!
//! [`phase`] computes the pure per-instant target pose for a diagonal
//! trot; [`sequencer`] is the state machine that walks a full run from
//! stance, through the cycles, and back to stance.

pub mod phase;
pub mod sequencer;

pub use phase::{leg_phase, target_pose};
pub use sequencer::{
    AbortReason, CyclePhase, FrameCommand, GaitSequencer, RunOutcome,
};
