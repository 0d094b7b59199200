//! MLLP frame delimiter configuration.
//!
//! MLLP brackets each message with a start byte and a two-byte end
//! sequence. The standard values are `0x0B` (vertical tab) before the
//! payload and `0x1C 0x0D` (file separator, carriage return) after it.

use serde::Deserialize;

use crate::error::{MllpError, Result};

/// Standard MLLP start-of-block byte.
pub const DEFAULT_START_BYTE: u8 = 0x0B;

/// Standard MLLP first end-of-block byte.
pub const DEFAULT_END_BYTE1: u8 = 0x1C;

/// Standard MLLP second end-of-block byte.
pub const DEFAULT_END_BYTE2: u8 = 0x0D;

/// The three framing bytes for a session.
///
/// All scanning and envelope encoding is parameterized on this, so
/// non-standard deployments can rebind the markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Delimiters {
    /// Byte marking the start of a frame.
    #[serde(default = "default_start")]
    pub start_byte: u8,
    /// First byte of the frame terminator.
    #[serde(default = "default_end1")]
    pub end_byte1: u8,
    /// Second byte of the frame terminator.
    #[serde(default = "default_end2")]
    pub end_byte2: u8,
}

fn default_start() -> u8 {
    DEFAULT_START_BYTE
}

fn default_end1() -> u8 {
    DEFAULT_END_BYTE1
}

fn default_end2() -> u8 {
    DEFAULT_END_BYTE2
}

impl Delimiters {
    /// Create delimiters with explicit marker bytes.
    pub fn new(start_byte: u8, end_byte1: u8, end_byte2: u8) -> Self {
        Self {
            start_byte,
            end_byte1,
            end_byte2,
        }
    }

    /// Validate that the three markers are pairwise distinct.
    ///
    /// The scanner cannot distinguish frame boundaries if two markers
    /// share a byte value.
    pub fn validate(&self) -> Result<()> {
        if self.start_byte == self.end_byte1
            || self.start_byte == self.end_byte2
            || self.end_byte1 == self.end_byte2
        {
            return Err(MllpError::Protocol(format!(
                "delimiters must be distinct: start=0x{:02X} end1=0x{:02X} end2=0x{:02X}",
                self.start_byte, self.end_byte1, self.end_byte2
            )));
        }
        Ok(())
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_START_BYTE, DEFAULT_END_BYTE1, DEFAULT_END_BYTE2)
    }
}
