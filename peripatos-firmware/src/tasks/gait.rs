//! Gait runner task
//!
//! Owns the servo bus and drives the full demo sequence: program the
//! servos' angle limits, sweep diagnostics, settle into stance, walk the
//! configured cycles, return to stance and lower into the rest pose.
//!
//! The sequencer core is synchronous; this task supplies the pacing
//! between frames and the physical dispatch. Dispatch per frame is in
//! ascending servo id order. Any dispatch failure aborts the run in
//! place; a partially-applied frame must never keep walking.

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_time::{Duration, Instant, Timer};

use peripatos_core::config::{GaitConfig, StanceConfig};
use peripatos_core::gait::{AbortReason, FrameCommand, GaitSequencer, RunOutcome};
use peripatos_core::joint::{JointTable, JOINT_COUNT};
use peripatos_core::motion::PoseInterpolator;
use peripatos_core::pose::Pose;
use peripatos_core::traits::{ActuatorError, ActuatorPort};
use peripatos_drivers::servo::{diagnostics, Lx16aBus};

use crate::channels::{FrameRecord, RunStatus, FRAME_LOG, RUN_STATUS};

/// How long each servo LED stays lit during the boot diagnostic walk
const LED_DWELL: Duration = Duration::from_millis(150);

/// Logical crouched rest pose the robot lowers into after the walk
const REST_POSE: Pose =
    Pose::from_angles([115.0, 90.0, 125.0, 150.0, 125.0, 150.0, 125.0, 90.0]);

/// Interpolation from stance down into the rest pose
const REST_DURATION_MS: u32 = 1200;
const REST_STEPS: u32 = 50;

/// Pause on stance before and after the walk
const HOLD_MS: u64 = 1500;

#[embassy_executor::task]
pub async fn gait_task(uart: BufferedUart<'static>) {
    let table = JointTable::default();
    let mut bus = Lx16aBus::new(uart);

    let status = match run_demo(&mut bus, &table).await {
        Ok(status) => status,
        Err(ActuatorError::Timeout { joint }) => {
            error!("servo {} stopped answering, run abandoned", joint.get());
            RunStatus::Finished(RunOutcome::Aborted(AbortReason::CommunicationTimeout(
                joint,
            )))
        }
        Err(_) => {
            error!("servo bus failure, run abandoned");
            RunStatus::Refused
        }
    };

    RUN_STATUS.signal(status);
    info!("gait task idle");
}

async fn run_demo(
    bus: &mut Lx16aBus<BufferedUart<'static>>,
    table: &JointTable,
) -> Result<RunStatus, ActuatorError> {
    // Mirror the configured limits into the servos' own registers
    for joint in table.iter() {
        bus.set_limits(joint.id, joint.min_deg, joint.max_deg).await?;
    }
    info!("angle limits programmed");

    let report = diagnostics::run(bus, table, LED_DWELL).await;
    info!(
        "diagnostics: {} joints, min {} mV, max {} C",
        report.joints.len(),
        report.min_voltage_mv().unwrap_or(0),
        report.max_temperature_c().unwrap_or(0)
    );
    if !report.healthy(diagnostics::MIN_VOLTAGE_MV) {
        warn!("diagnostics unhealthy, refusing to walk");
        return Ok(RunStatus::Refused);
    }

    // Starting pose from the servos themselves, mapped into logical space
    let mut observed = REST_POSE;
    for joint in table.iter() {
        let physical = bus.read_angle(joint.id).await?;
        observed = observed.with_joint(joint.id, joint.physical_to_logical(physical));
    }

    let stance = StanceConfig::default().build(table);
    let config = GaitConfig::default();
    let mut sequencer = match GaitSequencer::new(config, table.clone(), stance) {
        Ok(sequencer) => sequencer,
        Err(e) => {
            error!("gait configuration rejected: {}", e);
            return Ok(RunStatus::Refused);
        }
    };

    info!("walking");
    sequencer.start(observed);
    let t0 = Instant::now();
    while let Some(cmd) = sequencer.next_frame() {
        if let Err(err) = dispatch(bus, table, &cmd, t0).await {
            let reason = match err {
                ActuatorError::Timeout { joint } => {
                    warn!("servo {} timed out mid-run, aborting", joint.get());
                    AbortReason::CommunicationTimeout(joint)
                }
                ActuatorError::InvalidReply { joint } => {
                    warn!("servo {} answered garbage mid-run, aborting", joint.get());
                    AbortReason::BusFault
                }
                ActuatorError::Bus => {
                    warn!("bus write failed mid-run, aborting");
                    AbortReason::BusFault
                }
            };
            sequencer.abort(reason);
        }
        Timer::after(Duration::from_millis(cmd.delay_ms as u64)).await;
    }

    let outcome = match sequencer.outcome() {
        Some(outcome) => outcome,
        None => RunOutcome::Completed,
    };

    if outcome == RunOutcome::Completed {
        info!("walk complete, resting");
        Timer::after(Duration::from_millis(HOLD_MS)).await;
        for step in PoseInterpolator::new(stance, REST_POSE, REST_STEPS, REST_DURATION_MS) {
            let cmd = FrameCommand {
                pose: step.pose,
                delay_ms: step.delay_ms,
            };
            dispatch(bus, table, &cmd, t0).await?;
            Timer::after(Duration::from_millis(step.delay_ms as u64)).await;
        }
    }

    Ok(RunStatus::Finished(outcome))
}

/// Send one logical pose to the bus in ascending servo id order
async fn dispatch(
    bus: &mut Lx16aBus<BufferedUart<'static>>,
    table: &JointTable,
    cmd: &FrameCommand,
    t0: Instant,
) -> Result<(), ActuatorError> {
    let mut dispatched = [0.0f32; JOINT_COUNT];
    for joint in table.iter() {
        let physical = joint.clamp(joint.logical_to_physical(cmd.pose.angle(joint.id)));
        bus.move_joint(joint.id, physical, cmd.delay_ms as u16).await?;
        dispatched[(joint.id.get() - 1) as usize] = physical;
    }

    let record = FrameRecord {
        t_s: (Instant::now() - t0).as_micros() as f32 / 1_000_000.0,
        angles: dispatched,
    };
    // Drop the record if the log task is behind; pacing must not stall
    let _ = FRAME_LOG.try_send(record);
    Ok(())
}
