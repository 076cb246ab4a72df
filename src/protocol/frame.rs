//! Frame struct with typed accessors.
//!
//! A [`Frame`] is a delimited byte sequence cut from the notification stream
//! by the reassembler. It is not validated: accessors read the raw layout and
//! the codec decides whether the frame is well formed.
//!
//! # Example
//!
//! ```
//! use massager_protocol::protocol::{build_frame, Direction, Frame};
//!
//! let bytes = build_frame(Direction::AppToDevice, 2, &[5]);
//! let frame = Frame::from_slice(&bytes);
//!
//! assert_eq!(frame.command_id(), Some(2));
//! assert_eq!(frame.body(), &[5]);
//! ```

use bytes::Bytes;

use super::wire_format::{
    Direction, BODY_OFFSET, COMMAND_OFFSET, CRC_LEN, DIRECTION_OFFSET, HEADER, HEADER_LEN,
    MAX_FRAME_SIZE, TERMINATOR, TERMINATOR_LEN,
};
use crate::checksum;

/// A complete frame as received or built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Wrap already-owned bytes (zero-copy).
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Create a frame from a slice (copies data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Raw frame bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap clone of the underlying buffer.
    #[inline]
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Frame length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the frame is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Declared length from the length field.
    pub fn declared_len(&self) -> Option<u16> {
        self.bytes
            .get(HEADER_LEN..HEADER_LEN + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    /// Direction byte, leniently parsed.
    pub fn direction(&self) -> Option<Direction> {
        self.bytes
            .get(DIRECTION_OFFSET)
            .map(|&b| Direction::from_byte(b))
    }

    /// Command id byte.
    pub fn command_id(&self) -> Option<u8> {
        self.bytes.get(COMMAND_OFFSET).copied()
    }

    /// Offset of the CRC field, if the frame is long enough to have one.
    pub fn crc_index(&self) -> Option<usize> {
        self.bytes
            .len()
            .checked_sub(TERMINATOR_LEN + CRC_LEN)
            .filter(|&idx| idx >= BODY_OFFSET)
    }

    /// Body bytes between the command id and the CRC.
    pub fn body(&self) -> &[u8] {
        match self.crc_index() {
            Some(idx) => &self.bytes[BODY_OFFSET..idx],
            None => &[],
        }
    }

    /// The two stored CRC bytes, unparsed.
    pub fn crc_bytes(&self) -> Option<[u8; 2]> {
        self.crc_index()
            .map(|idx| [self.bytes[idx], self.bytes[idx + 1]])
    }
}

/// Build a complete EMS v2 frame.
///
/// The length field counts the whole frame and the CRC is written big-endian.
///
/// # Panics
///
/// Panics if the frame would exceed [`MAX_FRAME_SIZE`]. Callers build bodies
/// from typed commands, so an oversized body is a programming error.
pub fn build_frame(direction: Direction, command_id: u8, body: &[u8]) -> Vec<u8> {
    let total = BODY_OFFSET + body.len() + CRC_LEN + TERMINATOR_LEN;
    assert!(
        total <= MAX_FRAME_SIZE,
        "frame of {} bytes exceeds maximum {}",
        total,
        MAX_FRAME_SIZE
    );

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(&HEADER);
    buf.extend_from_slice(&(total as u16).to_be_bytes());
    buf.push(direction.to_byte());
    buf.push(command_id);
    buf.extend_from_slice(body);

    let crc = checksum::compute(&buf);
    buf.extend_from_slice(&crc.to_be_bytes());
    buf.extend_from_slice(&TERMINATOR);
    buf
}
