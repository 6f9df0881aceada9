//! Frame encoding and decoding for the LX-16A servo bus.
//!
//! Frame format:
//! - HEADER (2 bytes): 0x55 0x55 synchronization bytes
//! - ID (1 byte): servo address, or 0xFE for broadcast
//! - LENGTH (1 byte): parameter count plus 3
//! - COMMAND (1 byte): command identifier
//! - PARAMS (0-7 bytes): command-specific data
//! - CHECKSUM (1 byte): bitwise NOT of the low byte of
//!   ID + LENGTH + COMMAND + sum of PARAMS

use heapless::Vec;

/// Frame synchronization byte, sent twice
pub const FRAME_HEADER: u8 = 0x55;

/// Servo address that every servo on the bus accepts
pub const BROADCAST_ID: u8 = 0xFE;

/// Maximum parameter count in one frame
pub const MAX_PARAMS: usize = 7;

/// Maximum complete frame size (HEADER*2 + ID + LENGTH + COMMAND + PARAMS + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = 2 + 1 + 1 + 1 + MAX_PARAMS + 1;

/// LENGTH counts the command, the checksum and itself on top of the params
const LENGTH_OVERHEAD: u8 = 3;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Parameter count exceeds maximum allowed size
    TooManyParams,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid frame structure
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Servo address
    pub id: u8,
    /// Command identifier
    pub command: u8,
    /// Parameter bytes
    pub params: Vec<u8, MAX_PARAMS>,
}

impl Frame {
    /// Create a new frame with the given address, command and parameters
    pub fn new(id: u8, command: u8, params: &[u8]) -> Result<Self, FrameError> {
        if params.len() > MAX_PARAMS {
            return Err(FrameError::TooManyParams);
        }

        let mut params_vec = Vec::new();
        params_vec
            .extend_from_slice(params)
            .map_err(|_| FrameError::TooManyParams)?;

        Ok(Self {
            id,
            command,
            params: params_vec,
        })
    }

    /// Create a frame with no parameters
    pub fn empty(id: u8, command: u8) -> Self {
        Self {
            id,
            command,
            params: Vec::new(),
        }
    }

    /// Calculate checksum for frame data
    fn calculate_checksum(id: u8, length: u8, command: u8, params: &[u8]) -> u8 {
        let mut sum = id as u16 + length as u16 + command as u16;
        for &byte in params {
            sum += byte as u16;
        }
        !(sum as u8)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = 6 + self.params.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.params.len() as u8 + LENGTH_OVERHEAD;
        let checksum = Self::calculate_checksum(self.id, length, self.command, &self.params);

        buffer[0] = FRAME_HEADER;
        buffer[1] = FRAME_HEADER;
        buffer[2] = self.id;
        buffer[3] = length;
        buffer[4] = self.command;
        buffer[5..5 + self.params.len()].copy_from_slice(&self.params);
        buffer[5 + self.params.len()] = checksum;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_PARAMS>,
    id: u8,
    expected_params: u8,
    command: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the first header byte
    WaitingForHeader1,
    /// Got one header byte, waiting for the second
    WaitingForHeader2,
    /// Waiting for ID
    WaitingForId,
    /// Waiting for LENGTH
    WaitingForLength,
    /// Waiting for COMMAND
    WaitingForCommand,
    /// Reading parameter bytes
    ReadingParams,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader1,
            buffer: Vec::new(),
            id: 0,
            expected_params: 0,
            command: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader1;
        self.buffer.clear();
        self.id = 0;
        self.expected_params = 0;
        self.command = 0;
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForHeader1 => {
                if byte == FRAME_HEADER {
                    self.state = ParseState::WaitingForHeader2;
                }
                // Silently ignore other bytes while waiting
                Ok(None)
            }
            ParseState::WaitingForHeader2 => {
                if byte == FRAME_HEADER {
                    self.state = ParseState::WaitingForId;
                } else {
                    self.state = ParseState::WaitingForHeader1;
                }
                Ok(None)
            }
            ParseState::WaitingForId => {
                // A header byte here means the previous pair straddled noise
                if byte == FRAME_HEADER {
                    return Ok(None);
                }
                self.id = byte;
                self.state = ParseState::WaitingForLength;
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte < LENGTH_OVERHEAD || byte > LENGTH_OVERHEAD + MAX_PARAMS as u8 {
                    self.reset();
                    return Err(FrameError::InvalidFrame);
                }
                self.expected_params = byte - LENGTH_OVERHEAD;
                self.state = ParseState::WaitingForCommand;
                Ok(None)
            }
            ParseState::WaitingForCommand => {
                self.command = byte;
                if self.expected_params == 0 {
                    self.state = ParseState::WaitingForChecksum;
                } else {
                    self.buffer.clear();
                    self.state = ParseState::ReadingParams;
                }
                Ok(None)
            }
            ParseState::ReadingParams => {
                // Cannot fail since expected_params is bounded above
                let _ = self.buffer.push(byte);
                if self.buffer.len() == self.expected_params as usize {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let length = self.expected_params + LENGTH_OVERHEAD;
                let expected_checksum =
                    Frame::calculate_checksum(self.id, length, self.command, &self.buffer);

                if byte != expected_checksum {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let frame = Frame {
                    id: self.id,
                    command: self.command,
                    params: self.buffer.clone(),
                };

                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_encode_with_params() {
        // Move servo 3 to tick 500 over 1000 ms
        let frame = Frame::new(3, 1, &[0xF4, 0x01, 0xE8, 0x03]).unwrap();
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 10);
        assert_eq!(buffer[0], FRAME_HEADER);
        assert_eq!(buffer[1], FRAME_HEADER);
        assert_eq!(buffer[2], 3); // id
        assert_eq!(buffer[3], 7); // length = 4 params + 3
        assert_eq!(buffer[4], 1); // command
        assert_eq!(&buffer[5..9], &[0xF4, 0x01, 0xE8, 0x03]);
        // checksum = !(3 + 7 + 1 + 0xF4 + 0x01 + 0xE8 + 0x03)
        let sum = 3u16 + 7 + 1 + 0xF4 + 0x01 + 0xE8 + 0x03;
        assert_eq!(buffer[9], !(sum as u8));
    }

    #[test]
    fn test_frame_encode_empty_params() {
        let frame = Frame::empty(5, 28); // position read request
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(buffer[3], 3); // length with no params
        assert_eq!(buffer[5], !(5u8.wrapping_add(3).wrapping_add(28)));
    }

    #[test]
    fn test_frame_roundtrip() {
        let original = Frame::new(8, 20, &[0x28, 0x00, 0xE8, 0x03]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parser_invalid_checksum() {
        let frame = Frame::empty(1, 28);
        let mut encoded = frame.encode_to_vec().unwrap();
        let last_idx = encoded.len() - 1;
        encoded[last_idx] ^= 0xFF;

        let mut parser = FrameParser::new();
        let result = parser.feed_bytes(&encoded);
        assert_eq!(result, Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let frame = Frame::new(2, 28, &[0x2C, 0x01]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        // Prepend garbage, including a lone header byte
        let mut data = Vec::<u8, 20>::new();
        data.extend_from_slice(&[0x00, 0x55, 0x12, 0x34]).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();

        assert_eq!(parsed.id, 2);
        assert_eq!(parsed.command, 28);
    }

    #[test]
    fn test_parser_rejects_undersized_length() {
        // LENGTH below 3 cannot describe a valid frame
        let mut parser = FrameParser::new();
        let result = parser.feed_bytes(&[0x55, 0x55, 0x01, 0x02]);
        assert_eq!(result, Err(FrameError::InvalidFrame));

        // Parser recovers on the next well-formed frame
        let frame = Frame::empty(1, 26);
        let encoded = frame.encode_to_vec().unwrap();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(parsed.command, 26);
    }

    #[test]
    fn test_too_many_params() {
        let params = [0u8; MAX_PARAMS + 1];
        let result = Frame::new(1, 1, &params);
        assert_eq!(result, Err(FrameError::TooManyParams));
    }

    #[test]
    fn test_parser_extra_header_before_id() {
        // 0x55 0x55 0x55 id ... still locks on to the frame
        let frame = Frame::empty(4, 27);
        let encoded = frame.encode_to_vec().unwrap();

        let mut data = Vec::<u8, 20>::new();
        data.push(0x55).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();
        assert_eq!(parsed.id, 4);
    }
}
