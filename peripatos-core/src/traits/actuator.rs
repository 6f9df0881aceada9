//! Servo actuator trait
//!
//! This trait abstracts over the servo bus implementation so the gait
//! engine never touches wire formats or transport timing. All angles that
//! cross this boundary are physical servo angles in degrees; the logical
//! mirror mapping happens above it.

use crate::joint::JointId;

/// Errors that can occur talking to a servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// The servo did not reply within its deadline
    Timeout { joint: JointId },
    /// A reply arrived but could not be decoded
    InvalidReply { joint: JointId },
    /// The underlying transport failed
    Bus,
}

/// Trait for the servo bus an actuator task drives
///
/// Implementations own the serial transport and the wire protocol.
/// Commands address one servo at a time; callers sequence multi-joint
/// updates themselves.
#[allow(async_fn_in_trait)]
pub trait ActuatorPort {
    /// Program the servo's own angle limit registers
    ///
    /// The limits mirror the joint configuration so the servo firmware
    /// rejects out-of-range targets even if a bad command slips through.
    async fn set_limits(&mut self, id: JointId, min_deg: f32, max_deg: f32)
        -> Result<(), ActuatorError>;

    /// Command a timed move to a physical angle
    ///
    /// `time_ms` is the servo's own ramp duration; the caller still owns
    /// the inter-command pacing.
    async fn move_joint(
        &mut self,
        id: JointId,
        physical_deg: f32,
        time_ms: u16,
    ) -> Result<(), ActuatorError>;

    /// Read back the servo's current physical angle in degrees
    async fn read_angle(&mut self, id: JointId) -> Result<f32, ActuatorError>;
}
