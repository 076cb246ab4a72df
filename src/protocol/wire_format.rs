//! EMS v2 wire format constants.
//!
//! ```text
//! ┌────────┬──────────┬─────┬─────┬──────────┬────────┬────────┐
//! │ Header │ Length   │ Dir │ Cmd │ Body     │ CRC16  │ Term   │
//! │ 68 79  │ uint16 BE│ 1 B │ 1 B │ variable │ 2 bytes│ 0D 0A  │
//! └────────┴──────────┴─────┴─────┴──────────┴────────┴────────┘
//! ```
//!
//! Length counts the whole frame. Some firmware revisions send the length
//! without the terminator, and some send the CRC byte-swapped; receivers
//! accept both.

use serde::{Deserialize, Serialize};

/// Two-byte frame header.
pub const HEADER: [u8; 2] = [0x68, 0x79];

/// Two-byte frame terminator.
pub const TERMINATOR: [u8; 2] = [0x0D, 0x0A];

/// Header length in bytes.
pub const HEADER_LEN: usize = 2;

/// Length field size in bytes.
pub const LENGTH_FIELD_LEN: usize = 2;

/// CRC field size in bytes.
pub const CRC_LEN: usize = 2;

/// Terminator size in bytes.
pub const TERMINATOR_LEN: usize = 2;

/// Offset of the direction byte.
pub const DIRECTION_OFFSET: usize = 4;

/// Offset of the command id byte.
pub const COMMAND_OFFSET: usize = 5;

/// Offset of the first body byte.
pub const BODY_OFFSET: usize = 6;

/// Smallest complete frame: header, length, direction, command, CRC, terminator.
pub const MIN_FRAME_SIZE: usize = 10;

/// Smallest buffer worth scanning for a terminator (terminator not counted).
pub const MIN_EXTRACT_SIZE: usize = 8;

/// Largest frame the 16-bit length field can describe.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Command id constants.
pub mod command {
    /// Status query / program control / status report.
    pub const STATUS: u8 = 0;
    /// Stimulation mode.
    pub const MODE: u8 = 1;
    /// Intensity level.
    pub const INTENSITY: u8 = 2;
    /// Body zone.
    pub const BODY_ZONE: u8 = 3;
    /// Heating pad.
    pub const HOT_SITE: u8 = 4;
    /// Power.
    pub const POWER: u8 = 5;
    /// Battery.
    pub const BATTERY: u8 = 6;
    /// Buzzer (mute).
    pub const BUZZER: u8 = 7;
    /// Session timer.
    pub const TIMER: u8 = 8;
    /// Heartbeat request / report.
    pub const HEARTBEAT: u8 = 0x0A;
    /// Run state with duration.
    pub const RUN_STATE: u8 = 11;
}

/// Frame direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Phone to device (wire byte 0x01).
    AppToDevice,
    /// Device to phone (wire byte 0x02).
    DeviceToApp,
}

impl Direction {
    /// Wire byte for this direction.
    #[inline]
    pub fn to_byte(self) -> u8 {
        match self {
            Direction::AppToDevice => 0x01,
            Direction::DeviceToApp => 0x02,
        }
    }

    /// Parse a wire byte. Unknown values are read as `DeviceToApp`.
    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => Direction::AppToDevice,
            _ => Direction::DeviceToApp,
        }
    }
}

/// Find the first occurrence of `needle` in `haystack` at or after `from`.
pub(crate) fn find_pair(haystack: &[u8], needle: [u8; 2], from: usize) -> Option<usize> {
    if haystack.len() < 2 || from > haystack.len() - 2 {
        return None;
    }
    haystack[from..]
        .windows(2)
        .position(|w| w == needle)
        .map(|pos| pos + from)
}
