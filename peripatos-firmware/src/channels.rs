//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use peripatos_core::gait::RunOutcome;
use peripatos_core::joint::JOINT_COUNT;

/// Channel capacity for frame log records
///
/// The gait task drops records rather than stall when the log task
/// falls behind; pacing always wins over logging.
const FRAME_LOG_SIZE: usize = 16;

/// One dispatched gait frame for the CSV angle log
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameRecord {
    /// Seconds since the run started
    pub t_s: f32,
    /// Physical angles as dispatched, indexed by servo id minus one
    pub angles: [f32; JOINT_COUNT],
}

/// How the demo sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunStatus {
    /// Diagnostics vetoed the walk before it started
    Refused,
    /// The walk ran; outcome per the sequencer
    Finished(RunOutcome),
}

/// Dispatched frames for the frame log task
pub static FRAME_LOG: Channel<CriticalSectionRawMutex, FrameRecord, FRAME_LOG_SIZE> =
    Channel::new();

/// Final status of the demo sequence
pub static RUN_STATUS: Signal<CriticalSectionRawMutex, RunStatus> = Signal::new();
