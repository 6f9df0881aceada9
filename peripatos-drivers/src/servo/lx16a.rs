//! LX-16A bus servo driver
//!
//! All eight servos share one half-duplex UART bus behind a BusLinker
//! board that handles line direction, so from this side the bus looks
//! like an ordinary full-duplex serial port with no local echo.
//!
//! Write commands get no acknowledgment; read commands are answered with
//! a frame carrying the same command identifier. A servo that does not
//! answer within the reply deadline is reported as timed out so the gait
//! engine can abort the run instead of walking blind.

use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};

use peripatos_core::joint::JointId;
use peripatos_core::traits::{ActuatorError, ActuatorPort};
use peripatos_protocol::{commands, deg_to_ticks, ticks_to_deg, Frame, FrameParser};

/// How long to wait for a servo reply before declaring it lost
///
/// An LX-16A normally answers well under 10 ms at 115200 baud.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(50);

/// Driver for the shared LX-16A servo bus
pub struct Lx16aBus<U> {
    uart: U,
    parser: FrameParser,
    reply_timeout: Duration,
}

impl<U: Read + Write> Lx16aBus<U> {
    /// Wrap a serial port as a servo bus
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            parser: FrameParser::new(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Override the reply deadline
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Send a command that expects no reply
    pub async fn send(&mut self, frame: &Frame) -> Result<(), ActuatorError> {
        let bytes = frame.encode_to_vec().map_err(|_| ActuatorError::Bus)?;
        self.uart
            .write_all(&bytes)
            .await
            .map_err(|_| ActuatorError::Bus)?;
        self.uart.flush().await.map_err(|_| ActuatorError::Bus)
    }

    /// Send a read command and wait for the matching reply
    ///
    /// Stale bytes from an earlier exchange are discarded by resetting the
    /// parser before the request goes out. Corrupted frames on the line do
    /// not fail the exchange; parsing resynchronizes and keeps scanning
    /// until the deadline.
    pub async fn transact(&mut self, request: &Frame, joint: JointId) -> Result<Frame, ActuatorError> {
        self.parser.reset();
        self.send(request).await?;

        let reply = with_timeout(self.reply_timeout, Self::read_frame(&mut self.uart, &mut self.parser))
            .await
            .map_err(|_| ActuatorError::Timeout { joint })??;

        if reply.id != joint.get() {
            return Err(ActuatorError::InvalidReply { joint });
        }
        Ok(reply)
    }

    async fn read_frame(uart: &mut U, parser: &mut FrameParser) -> Result<Frame, ActuatorError> {
        let mut byte = [0u8; 1];
        loop {
            let n = uart.read(&mut byte).await.map_err(|_| ActuatorError::Bus)?;
            if n == 0 {
                return Err(ActuatorError::Bus);
            }
            match parser.feed(byte[0]) {
                Ok(Some(frame)) => return Ok(frame),
                // Parse errors reset the parser; keep scanning
                Ok(None) | Err(_) => {}
            }
        }
    }

    /// Read the servo's input voltage in millivolts
    pub async fn read_voltage_mv(&mut self, joint: JointId) -> Result<u16, ActuatorError> {
        let reply = self.transact(&commands::vin_read(joint.get()), joint).await?;
        commands::parse_voltage_mv(&reply).map_err(|_| ActuatorError::InvalidReply { joint })
    }

    /// Read the servo's internal temperature in degrees Celsius
    pub async fn read_temperature_c(&mut self, joint: JointId) -> Result<u8, ActuatorError> {
        let reply = self.transact(&commands::temp_read(joint.get()), joint).await?;
        commands::parse_temperature_c(&reply).map_err(|_| ActuatorError::InvalidReply { joint })
    }

    /// Enable or disable the servo's output torque
    pub async fn set_torque(&mut self, joint: JointId, on: bool) -> Result<(), ActuatorError> {
        self.send(&commands::load_write(joint.get(), on)).await
    }

    /// Read back the torque enable state
    pub async fn read_torque(&mut self, joint: JointId) -> Result<bool, ActuatorError> {
        let reply = self.transact(&commands::load_read(joint.get()), joint).await?;
        commands::parse_load(&reply).map_err(|_| ActuatorError::InvalidReply { joint })
    }

    /// Turn the servo's status LED on or off
    pub async fn set_led(&mut self, joint: JointId, lit: bool) -> Result<(), ActuatorError> {
        self.send(&commands::led_ctrl_write(joint.get(), lit)).await
    }
}

impl<U: Read + Write> ActuatorPort for Lx16aBus<U> {
    async fn set_limits(
        &mut self,
        id: JointId,
        min_deg: f32,
        max_deg: f32,
    ) -> Result<(), ActuatorError> {
        let frame =
            commands::angle_limit_write(id.get(), deg_to_ticks(min_deg), deg_to_ticks(max_deg));
        self.send(&frame).await
    }

    async fn move_joint(
        &mut self,
        id: JointId,
        physical_deg: f32,
        time_ms: u16,
    ) -> Result<(), ActuatorError> {
        let frame = commands::move_time_write(id.get(), deg_to_ticks(physical_deg), time_ms);
        self.send(&frame).await
    }

    async fn read_angle(&mut self, id: JointId) -> Result<f32, ActuatorError> {
        let reply = self.transact(&commands::pos_read(id.get()), id).await?;
        let ticks =
            commands::parse_position(&reply).map_err(|_| ActuatorError::InvalidReply { joint: id })?;
        Ok(ticks_to_deg(ticks))
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockPort;
    use super::*;
    use embassy_futures::block_on;

    fn joint(raw: u8) -> JointId {
        JointId::new(raw).unwrap()
    }

    #[test]
    fn test_move_joint_wire_format() {
        let mut bus = Lx16aBus::new(MockPort::new());
        // 120 deg = 500 ticks over 30 ms
        block_on(bus.move_joint(joint(3), 120.0, 30)).unwrap();

        let expected = commands::move_time_write(3, 500, 30).encode_to_vec().unwrap();
        assert_eq!(&bus.uart.written[..], &expected[..]);
    }

    #[test]
    fn test_set_limits_wire_format() {
        let mut bus = Lx16aBus::new(MockPort::new());
        block_on(bus.set_limits(joint(8), 40.0, 200.0)).unwrap();

        let expected = commands::angle_limit_write(8, deg_to_ticks(40.0), deg_to_ticks(200.0))
            .encode_to_vec()
            .unwrap();
        assert_eq!(&bus.uart.written[..], &expected[..]);
    }

    #[test]
    fn test_read_angle_parses_reply() {
        let mut port = MockPort::new();
        port.queue_reply(&Frame::new(5, commands::POS_READ, &[0xF4, 0x01]).unwrap());

        let mut bus = Lx16aBus::new(port);
        let deg = block_on(bus.read_angle(joint(5))).unwrap();
        assert!((deg - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_read_angle_skips_line_noise() {
        let mut port = MockPort::new();
        port.queue_raw(&[0x00, 0x55, 0x13]);
        port.queue_reply(&Frame::new(2, commands::POS_READ, &[0x2C, 0x01]).unwrap());

        let mut bus = Lx16aBus::new(port);
        let deg = block_on(bus.read_angle(joint(2))).unwrap();
        assert!((deg - 72.0).abs() < 1e-3);
    }

    #[test]
    fn test_reply_from_wrong_servo_rejected() {
        let mut port = MockPort::new();
        port.queue_reply(&Frame::new(6, commands::POS_READ, &[0x00, 0x00]).unwrap());

        let mut bus = Lx16aBus::new(port);
        let result = block_on(bus.read_angle(joint(5)));
        assert_eq!(result, Err(ActuatorError::InvalidReply { joint: joint(5) }));
    }

    #[test]
    fn test_silent_servo_times_out() {
        let mut port = MockPort::new();
        port.silent = true;

        let mut bus = Lx16aBus::new(port).with_reply_timeout(Duration::from_millis(10));
        let result = block_on(bus.read_angle(joint(4)));
        assert_eq!(result, Err(ActuatorError::Timeout { joint: joint(4) }));
    }

    #[test]
    fn test_voltage_and_torque_readback() {
        let mut port = MockPort::new();
        port.queue_reply(&Frame::new(1, commands::VIN_READ, &[0x88, 0x13]).unwrap());
        port.queue_reply(&Frame::new(1, commands::LOAD_OR_UNLOAD_READ, &[1]).unwrap());

        let mut bus = Lx16aBus::new(port);
        assert_eq!(block_on(bus.read_voltage_mv(joint(1))), Ok(5000));
        assert_eq!(block_on(bus.read_torque(joint(1))), Ok(true));
    }
}
