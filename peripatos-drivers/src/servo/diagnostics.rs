//! Boot-time servo diagnostics
//!
//! Before the first run the firmware walks the bus once: it blinks each
//! servo's LED in a fixed order so a watching human can spot a dead or
//! mis-addressed servo, then interrogates every joint for position,
//! supply voltage, temperature and a torque toggle round trip.
//!
//! The sweep never stops early. A joint that fails to answer is recorded
//! as unresponsive and the sweep moves on, so the report always covers
//! every configured joint. The caller inspects the aggregate and decides
//! whether the robot may walk.

use embassy_time::{Duration, Timer};
use embedded_io_async::{Read, Write};
use heapless::Vec;

use peripatos_core::joint::{JointId, JointTable, JOINT_COUNT};
use peripatos_core::traits::{ActuatorError, ActuatorPort};

use super::lx16a::Lx16aBus;

/// LED blink order for the visual bus check
///
/// Front servos first, then rear, matching how the robot is usually
/// oriented on the bench.
pub const LED_WALK_ORDER: [u8; 8] = [1, 2, 7, 8, 3, 4, 5, 6];

/// Minimum supply voltage for a walk, millivolts
pub const MIN_VOLTAGE_MV: u16 = 5000;

/// What one servo reported during the sweep
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JointStatus {
    Responding {
        /// Physical angle the servo reported, degrees
        position_deg: f32,
        voltage_mv: u16,
        temperature_c: u8,
        /// Torque off-then-on toggle read back as commanded
        torque_verified: bool,
    },
    /// The servo's interrogation failed; the first error is kept
    Unresponsive(ActuatorError),
}

/// Everything learned about one servo during the sweep
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointDiagnostics {
    pub joint: JointId,
    pub status: JointStatus,
}

impl JointDiagnostics {
    pub fn responded(&self) -> bool {
        matches!(self.status, JointStatus::Responding { .. })
    }
}

/// Aggregate result of one diagnostic sweep
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticsReport {
    pub joints: Vec<JointDiagnostics, JOINT_COUNT>,
}

impl DiagnosticsReport {
    /// All joints answered, verified torque control and meet the supply threshold
    pub fn healthy(&self, min_voltage_mv: u16) -> bool {
        self.joints.len() == JOINT_COUNT
            && self.joints.iter().all(|j| match j.status {
                JointStatus::Responding {
                    voltage_mv,
                    torque_verified,
                    ..
                } => torque_verified && voltage_mv >= min_voltage_mv,
                JointStatus::Unresponsive(_) => false,
            })
    }

    /// Lowest supply voltage seen among the joints that answered
    pub fn min_voltage_mv(&self) -> Option<u16> {
        self.joints
            .iter()
            .filter_map(|j| match j.status {
                JointStatus::Responding { voltage_mv, .. } => Some(voltage_mv),
                JointStatus::Unresponsive(_) => None,
            })
            .min()
    }

    /// Hottest servo among the joints that answered
    pub fn max_temperature_c(&self) -> Option<u8> {
        self.joints
            .iter()
            .filter_map(|j| match j.status {
                JointStatus::Responding { temperature_c, .. } => Some(temperature_c),
                JointStatus::Unresponsive(_) => None,
            })
            .max()
    }
}

/// Run the full diagnostic sweep
///
/// `led_dwell` is how long each LED stays lit during the visual check.
pub async fn run<U: Read + Write>(
    bus: &mut Lx16aBus<U>,
    table: &JointTable,
    led_dwell: Duration,
) -> DiagnosticsReport {
    for raw in LED_WALK_ORDER {
        if let Some(id) = JointId::new(raw) {
            if bus.set_led(id, true).await.is_ok() {
                Timer::after(led_dwell).await;
                let _ = bus.set_led(id, false).await;
            }
        }
    }

    let mut report = DiagnosticsReport::default();
    for joint in table.iter() {
        let status = match probe_joint(bus, joint.id).await {
            Ok(status) => status,
            Err(err) => JointStatus::Unresponsive(err),
        };
        // Push cannot fail; the table holds exactly JOINT_COUNT joints
        let _ = report.joints.push(JointDiagnostics {
            joint: joint.id,
            status,
        });
    }

    // Leave every LED lit as the "diagnostics ran to completion" signal
    for id in JointId::ALL {
        let _ = bus.set_led(id, true).await;
    }

    report
}

async fn probe_joint<U: Read + Write>(
    bus: &mut Lx16aBus<U>,
    id: JointId,
) -> Result<JointStatus, ActuatorError> {
    let position_deg = bus.read_angle(id).await?;
    let voltage_mv = bus.read_voltage_mv(id).await?;
    let temperature_c = bus.read_temperature_c(id).await?;

    bus.set_torque(id, false).await?;
    let off_ok = !bus.read_torque(id).await?;
    bus.set_torque(id, true).await?;
    let on_ok = bus.read_torque(id).await?;

    Ok(JointStatus::Responding {
        position_deg,
        voltage_mv,
        temperature_c,
        torque_verified: off_ok && on_ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    use peripatos_protocol::{commands, Frame};

    use crate::servo::lx16a::mock::MockPort;

    fn queue_joint_replies(port: &mut MockPort, raw_id: u8, voltage_mv: u16, torque_ok: bool) {
        // One sweep per joint: position, voltage, temperature, torque
        // readback after off, torque readback after on
        port.queue_reply(&Frame::new(raw_id, commands::POS_READ, &[0xF4, 0x01]).unwrap());
        port.queue_reply(
            &Frame::new(raw_id, commands::VIN_READ, &voltage_mv.to_le_bytes()).unwrap(),
        );
        port.queue_reply(&Frame::new(raw_id, commands::TEMP_READ, &[35]).unwrap());
        port.queue_reply(
            &Frame::new(raw_id, commands::LOAD_OR_UNLOAD_READ, &[torque_ok as u8 ^ 1]).unwrap(),
        );
        port.queue_reply(&Frame::new(raw_id, commands::LOAD_OR_UNLOAD_READ, &[1]).unwrap());
    }

    #[test]
    fn test_sweep_reports_every_joint() {
        let mut port = MockPort::new();
        for raw in 1..=8 {
            queue_joint_replies(&mut port, raw, 7400, true);
        }

        let table = JointTable::default();
        let mut bus = Lx16aBus::new(port);
        let report = block_on(run(&mut bus, &table, Duration::from_ticks(0)));

        assert_eq!(report.joints.len(), 8);
        assert!(report.healthy(MIN_VOLTAGE_MV));
        assert_eq!(report.min_voltage_mv(), Some(7400));
        assert_eq!(report.max_temperature_c(), Some(35));
        for j in &report.joints {
            match j.status {
                JointStatus::Responding { position_deg, .. } => {
                    assert!((position_deg - 120.0).abs() < 1e-3);
                }
                JointStatus::Unresponsive(err) => panic!("joint {} failed: {:?}", j.joint.get(), err),
            }
        }
    }

    #[test]
    fn test_low_voltage_fails_health_check() {
        let mut port = MockPort::new();
        for raw in 1..=8 {
            let voltage = if raw == 5 { 4600 } else { 7400 };
            queue_joint_replies(&mut port, raw, voltage, true);
        }

        let table = JointTable::default();
        let mut bus = Lx16aBus::new(port);
        let report = block_on(run(&mut bus, &table, Duration::from_ticks(0)));

        assert_eq!(report.joints.len(), 8);
        assert!(!report.healthy(MIN_VOLTAGE_MV));
        assert_eq!(report.min_voltage_mv(), Some(4600));
    }

    #[test]
    fn test_stuck_torque_is_flagged() {
        let mut port = MockPort::new();
        for raw in 1..=8 {
            // Joint 3 reports torque still on after the off command
            queue_joint_replies(&mut port, raw, 7400, raw != 3);
        }

        let table = JointTable::default();
        let mut bus = Lx16aBus::new(port);
        let report = block_on(run(&mut bus, &table, Duration::from_ticks(0)));

        assert!(!report.healthy(MIN_VOLTAGE_MV));
        let bad = report.joints.iter().find(|j| j.joint.get() == 3).unwrap();
        assert_eq!(
            bad.status,
            JointStatus::Responding {
                position_deg: 120.0,
                voltage_mv: 7400,
                temperature_c: 35,
                torque_verified: false,
            }
        );
        assert!(report.joints.iter().filter(|j| j.responded()).count() == 8);
    }

    #[test]
    fn test_dead_joint_does_not_stop_the_sweep() {
        // Only joints 1 and 2 answer; from joint 3 on the bus is silent
        let mut port = MockPort::new();
        queue_joint_replies(&mut port, 1, 7400, true);
        queue_joint_replies(&mut port, 2, 7400, true);

        let table = JointTable::default();
        let mut bus = Lx16aBus::new(port).with_reply_timeout(Duration::from_millis(5));
        let report = block_on(run(&mut bus, &table, Duration::from_ticks(0)));

        assert_eq!(report.joints.len(), 8);
        assert!(report.joints[0].responded());
        assert!(report.joints[1].responded());
        for j in &report.joints[2..] {
            assert_eq!(
                j.status,
                JointStatus::Unresponsive(ActuatorError::Timeout { joint: j.joint })
            );
        }
        assert!(!report.healthy(MIN_VOLTAGE_MV));
        // The answering joints' readings survive the dead ones
        assert_eq!(report.min_voltage_mv(), Some(7400));
    }
}
