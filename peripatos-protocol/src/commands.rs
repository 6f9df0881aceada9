//! LX-16A command set
//!
//! Typed builders for the request frames the robot uses and parsers for the
//! matching replies. Command identifiers and parameter layouts follow the
//! LewanSoul bus servo communication protocol; all multi-byte parameters
//! are little-endian.
//!
//! Positions on the wire are ticks: 0..=1000 spanning 0..=240 degrees,
//! 0.24 degrees per tick. Position read-back is signed because a servo
//! pushed past its mechanical zero reports a small negative tick count.

use heapless::Vec;

use crate::frame::Frame;

/// Move to a position over a given time
pub const SERVO_MOVE_TIME_WRITE: u8 = 1;
/// Assign a new bus address
pub const ID_WRITE: u8 = 13;
/// Read the bus address (broadcast-safe, single servo on the bus only)
pub const ID_READ: u8 = 14;
/// Program the servo's internal angle limits
pub const ANGLE_LIMIT_WRITE: u8 = 20;
/// Read back the programmed angle limits
pub const ANGLE_LIMIT_READ: u8 = 21;
/// Read the internal temperature in degrees Celsius
pub const TEMP_READ: u8 = 26;
/// Read the input voltage in millivolts
pub const VIN_READ: u8 = 27;
/// Read the current position in ticks
pub const POS_READ: u8 = 28;
/// Enable or disable output torque
pub const LOAD_OR_UNLOAD_WRITE: u8 = 31;
/// Read the torque enable state
pub const LOAD_OR_UNLOAD_READ: u8 = 32;
/// Control the status LED
pub const LED_CTRL_WRITE: u8 = 33;

/// Highest valid position tick
pub const MAX_TICKS: u16 = 1000;

/// Degrees of travel covered by one tick
pub const DEG_PER_TICK: f32 = 0.24;

/// Convert a physical angle in degrees to position ticks
///
/// The result is rounded to the nearest tick and saturated to the servo's
/// representable range.
pub fn deg_to_ticks(deg: f32) -> u16 {
    let ticks = deg / DEG_PER_TICK + 0.5;
    if ticks <= 0.0 {
        0
    } else if ticks >= MAX_TICKS as f32 {
        MAX_TICKS
    } else {
        ticks as u16
    }
}

/// Convert position ticks to a physical angle in degrees
pub fn ticks_to_deg(ticks: i16) -> f32 {
    ticks as f32 * DEG_PER_TICK
}

/// Move `id` to `ticks` over `time_ms` milliseconds
pub fn move_time_write(id: u8, ticks: u16, time_ms: u16) -> Frame {
    let ticks = ticks.min(MAX_TICKS);
    build(
        id,
        SERVO_MOVE_TIME_WRITE,
        &[
            ticks as u8,
            (ticks >> 8) as u8,
            time_ms as u8,
            (time_ms >> 8) as u8,
        ],
    )
}

/// Program the servo's internal angle limit registers
pub fn angle_limit_write(id: u8, min_ticks: u16, max_ticks: u16) -> Frame {
    let min_ticks = min_ticks.min(MAX_TICKS);
    let max_ticks = max_ticks.min(MAX_TICKS);
    build(
        id,
        ANGLE_LIMIT_WRITE,
        &[
            min_ticks as u8,
            (min_ticks >> 8) as u8,
            max_ticks as u8,
            (max_ticks >> 8) as u8,
        ],
    )
}

/// Request the programmed angle limits
pub fn angle_limit_read(id: u8) -> Frame {
    Frame::empty(id, ANGLE_LIMIT_READ)
}

/// Request the current position
pub fn pos_read(id: u8) -> Frame {
    Frame::empty(id, POS_READ)
}

/// Request the input voltage
pub fn vin_read(id: u8) -> Frame {
    Frame::empty(id, VIN_READ)
}

/// Request the internal temperature
pub fn temp_read(id: u8) -> Frame {
    Frame::empty(id, TEMP_READ)
}

/// Assign a new bus address
pub fn id_write(id: u8, new_id: u8) -> Frame {
    build(id, ID_WRITE, &[new_id])
}

/// Request the bus address
pub fn id_read(id: u8) -> Frame {
    Frame::empty(id, ID_READ)
}

/// Enable or disable output torque
pub fn load_write(id: u8, torque_on: bool) -> Frame {
    build(id, LOAD_OR_UNLOAD_WRITE, &[torque_on as u8])
}

/// Request the torque enable state
pub fn load_read(id: u8) -> Frame {
    Frame::empty(id, LOAD_OR_UNLOAD_READ)
}

/// Turn the status LED on or off
///
/// The servo register is inverted: 0 keeps the LED lit, 1 turns it off.
pub fn led_ctrl_write(id: u8, lit: bool) -> Frame {
    build(id, LED_CTRL_WRITE, &[if lit { 0 } else { 1 }])
}

/// Errors that can occur decoding a reply frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// The reply answered a different command than expected
    WrongCommand { expected: u8, got: u8 },
    /// The reply's parameter count does not match the command
    BadLength,
}

/// Decode a position reply into signed ticks
pub fn parse_position(frame: &Frame) -> Result<i16, ReplyError> {
    let params = expect_reply(frame, POS_READ, 2)?;
    Ok(i16::from_le_bytes([params[0], params[1]]))
}

/// Decode an angle limit reply into (min, max) ticks
pub fn parse_angle_limits(frame: &Frame) -> Result<(u16, u16), ReplyError> {
    let params = expect_reply(frame, ANGLE_LIMIT_READ, 4)?;
    Ok((
        u16::from_le_bytes([params[0], params[1]]),
        u16::from_le_bytes([params[2], params[3]]),
    ))
}

/// Decode a voltage reply into millivolts
pub fn parse_voltage_mv(frame: &Frame) -> Result<u16, ReplyError> {
    let params = expect_reply(frame, VIN_READ, 2)?;
    Ok(u16::from_le_bytes([params[0], params[1]]))
}

/// Decode a temperature reply into degrees Celsius
pub fn parse_temperature_c(frame: &Frame) -> Result<u8, ReplyError> {
    let params = expect_reply(frame, TEMP_READ, 1)?;
    Ok(params[0])
}

/// Decode an address reply
pub fn parse_id(frame: &Frame) -> Result<u8, ReplyError> {
    let params = expect_reply(frame, ID_READ, 1)?;
    Ok(params[0])
}

/// Decode a torque state reply
pub fn parse_load(frame: &Frame) -> Result<bool, ReplyError> {
    let params = expect_reply(frame, LOAD_OR_UNLOAD_READ, 1)?;
    Ok(params[0] != 0)
}

fn expect_reply(frame: &Frame, command: u8, params: usize) -> Result<&[u8], ReplyError> {
    if frame.command != command {
        return Err(ReplyError::WrongCommand {
            expected: command,
            got: frame.command,
        });
    }
    if frame.params.len() != params {
        return Err(ReplyError::BadLength);
    }
    Ok(&frame.params)
}

/// Builder for the fixed-size parameter lists above, which never exceed
/// the frame's parameter capacity
fn build(id: u8, command: u8, params: &[u8]) -> Frame {
    let mut vec = Vec::new();
    let _ = vec.extend_from_slice(params);
    Frame {
        id,
        command,
        params: vec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_deg_to_ticks_endpoints() {
        assert_eq!(deg_to_ticks(0.0), 0);
        assert_eq!(deg_to_ticks(240.0), 1000);
        assert_eq!(deg_to_ticks(-10.0), 0);
        assert_eq!(deg_to_ticks(300.0), 1000);
    }

    #[test]
    fn test_deg_to_ticks_rounds_to_nearest() {
        // 120 deg = 500 ticks exactly
        assert_eq!(deg_to_ticks(120.0), 500);
        // 0.1 deg is closer to 0 ticks than to 1
        assert_eq!(deg_to_ticks(0.1), 0);
        // 0.13 deg is closer to 1 tick
        assert_eq!(deg_to_ticks(0.13), 1);
    }

    #[test]
    fn test_ticks_to_deg_signed() {
        assert_eq!(ticks_to_deg(500), 120.0);
        assert_eq!(ticks_to_deg(-25), -6.0);
    }

    #[test]
    fn test_move_time_write_layout() {
        let frame = move_time_write(3, 500, 1000);
        assert_eq!(frame.id, 3);
        assert_eq!(frame.command, SERVO_MOVE_TIME_WRITE);
        assert_eq!(&frame.params[..], &[0xF4, 0x01, 0xE8, 0x03]);
    }

    #[test]
    fn test_move_time_write_saturates_ticks() {
        let frame = move_time_write(1, 5000, 0);
        assert_eq!(&frame.params[..2], &[0xE8, 0x03]);
    }

    #[test]
    fn test_angle_limit_write_layout() {
        // 40 deg = 167 ticks, 200 deg = 833 ticks
        let frame = angle_limit_write(8, 167, 833);
        assert_eq!(frame.command, ANGLE_LIMIT_WRITE);
        assert_eq!(&frame.params[..], &[0xA7, 0x00, 0x41, 0x03]);
    }

    #[test]
    fn test_led_register_is_inverted() {
        assert_eq!(&led_ctrl_write(1, true).params[..], &[0]);
        assert_eq!(&led_ctrl_write(1, false).params[..], &[1]);
    }

    #[test]
    fn test_parse_position() {
        let reply = Frame::new(3, POS_READ, &[0xF4, 0x01]).unwrap();
        assert_eq!(parse_position(&reply), Ok(500));

        // Slightly past mechanical zero
        let reply = Frame::new(3, POS_READ, &[0xF6, 0xFF]).unwrap();
        assert_eq!(parse_position(&reply), Ok(-10));
    }

    #[test]
    fn test_parse_rejects_wrong_command() {
        let reply = Frame::new(3, VIN_READ, &[0x88, 0x13]).unwrap();
        assert_eq!(
            parse_position(&reply),
            Err(ReplyError::WrongCommand {
                expected: POS_READ,
                got: VIN_READ,
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        let reply = Frame::new(3, POS_READ, &[0xF4]).unwrap();
        assert_eq!(parse_position(&reply), Err(ReplyError::BadLength));
    }

    #[test]
    fn test_parse_voltage_and_temperature() {
        let reply = Frame::new(5, VIN_READ, &[0x88, 0x13]).unwrap();
        assert_eq!(parse_voltage_mv(&reply), Ok(5000));

        let reply = Frame::new(5, TEMP_READ, &[38]).unwrap();
        assert_eq!(parse_temperature_c(&reply), Ok(38));
    }

    #[test]
    fn test_parse_angle_limits() {
        let reply = Frame::new(2, ANGLE_LIMIT_READ, &[0xA7, 0x00, 0x41, 0x03]).unwrap();
        assert_eq!(parse_angle_limits(&reply), Ok((167, 833)));
    }

    proptest! {
        #[test]
        fn prop_tick_conversion_round_trips(ticks in 0u16..=1000) {
            let deg = ticks_to_deg(ticks as i16);
            prop_assert_eq!(deg_to_ticks(deg), ticks);
        }

        #[test]
        fn prop_deg_to_ticks_monotone(a in 0.0f32..240.0, b in 0.0f32..240.0) {
            if a <= b {
                prop_assert!(deg_to_ticks(a) <= deg_to_ticks(b));
            }
        }
    }
}
