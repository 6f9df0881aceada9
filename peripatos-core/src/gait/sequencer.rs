//! Gait run sequencer
//!
//! A synchronous state machine that turns a validated gait configuration
//! into the exact stream of pose commands for one walking run. Each call to
//! [`GaitSequencer::next_frame`] yields the next command together with the
//! delay to hold before the following one; the caller owns all pacing and
//! transport concerns.
//!
//! A run passes through four phases in order: settle into stance from
//! wherever the legs currently are, walk the configured number of cycles,
//! settle back into stance, done. Cycle targets are always computed against
//! the fixed stance pose, and the closing settle ends on the stance pose
//! verbatim, so a completed run leaves the robot exactly where it started.

use crate::config::GaitConfig;
use crate::gait::phase::target_pose;
use crate::joint::{ConfigError, JointId, JointTable};
use crate::motion::PoseInterpolator;
use crate::pose::Pose;

/// Where a run stands in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePhase {
    /// Interpolating from the observed pose into stance
    ApproachStance,
    /// Walking; `frame` is the index of the gait frame being interpolated
    /// toward, counted across all cycles
    Cycling { frame: u32 },
    /// Interpolating from the last gait target back into stance
    ReturnToStance,
    /// Run finished, no further commands
    Done,
}

/// Why a run stopped before completing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortReason {
    /// A servo stopped acknowledging commands
    CommunicationTimeout(JointId),
    /// The serial transport itself failed mid-run
    BusFault,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunOutcome {
    /// All cycles walked and stance restored
    Completed,
    /// Stopped early; the sequencer's phase records how far it got
    Aborted(AbortReason),
}

/// One pose command plus the hold time before the next one
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameCommand {
    pub pose: Pose,
    pub delay_ms: u32,
}

/// Step-driven sequencer for one walking run
pub struct GaitSequencer {
    config: GaitConfig,
    table: JointTable,
    stance: Pose,
    phase: CyclePhase,
    /// Last pose handed out; the start point of the next interpolation
    current: Pose,
    interp: Option<PoseInterpolator>,
    outcome: Option<RunOutcome>,
    started: bool,
}

impl GaitSequencer {
    /// Build a sequencer for one run, rejecting malformed configuration
    pub fn new(config: GaitConfig, table: JointTable, stance: Pose) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            table,
            stance,
            phase: CyclePhase::ApproachStance,
            current: stance,
            interp: None,
            outcome: None,
            started: false,
        })
    }

    /// Begin the run from the pose the legs are actually in
    ///
    /// Must be called before the first [`next_frame`](Self::next_frame);
    /// until then the sequencer yields nothing.
    pub fn start(&mut self, observed: Pose) {
        self.current = observed;
        self.phase = CyclePhase::ApproachStance;
        self.interp = Some(self.settle_toward(self.stance));
        self.outcome = None;
        self.started = true;
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// How the run ended, if it has
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Stop the run immediately
    ///
    /// The phase is left where the last fully dispatched command put it, so
    /// callers can report how far the run got.
    pub fn abort(&mut self, reason: AbortReason) {
        self.interp = None;
        self.outcome = Some(RunOutcome::Aborted(reason));
    }

    /// Next pose command, or `None` once the run is over
    pub fn next_frame(&mut self) -> Option<FrameCommand> {
        if !self.started || self.outcome.is_some() {
            return None;
        }
        loop {
            if let Some(interp) = self.interp.as_mut() {
                if let Some(step) = interp.next() {
                    self.current = step.pose;
                    return Some(FrameCommand {
                        pose: step.pose,
                        delay_ms: step.delay_ms,
                    });
                }
                self.interp = None;
            }
            if !self.advance() {
                return None;
            }
        }
    }

    /// Move to the next phase segment; false once the run is done
    fn advance(&mut self) -> bool {
        match self.phase {
            CyclePhase::ApproachStance => {
                self.phase = CyclePhase::Cycling { frame: 0 };
                self.interp = Some(self.frame_toward(0));
                true
            }
            CyclePhase::Cycling { frame } => {
                let next = frame + 1;
                if next < self.config.total_frames() {
                    self.phase = CyclePhase::Cycling { frame: next };
                    self.interp = Some(self.frame_toward(next));
                } else {
                    self.phase = CyclePhase::ReturnToStance;
                    self.interp = Some(self.settle_toward(self.stance));
                }
                true
            }
            CyclePhase::ReturnToStance => {
                self.phase = CyclePhase::Done;
                self.outcome = Some(RunOutcome::Completed);
                false
            }
            CyclePhase::Done => false,
        }
    }

    /// Interpolation segment toward one gait frame's target pose
    ///
    /// The segment's zeroth step repeats the pose already dispatched, so it
    /// is consumed here rather than handed out again.
    fn frame_toward(&self, frame: u32) -> PoseInterpolator {
        let target = target_pose(
            self.config.phase_at(frame),
            &self.config,
            &self.stance,
            &self.table,
        );
        let mut interp = PoseInterpolator::new(
            self.current,
            target,
            self.config.substeps_per_frame,
            self.config.frame_interval_ms,
        );
        let _ = interp.next();
        interp
    }

    fn settle_toward(&self, target: Pose) -> PoseInterpolator {
        let mut interp = PoseInterpolator::new(
            self.current,
            target,
            self.config.settle.steps,
            self.config.settle.duration_ms,
        );
        let _ = interp.next();
        interp
    }
}
