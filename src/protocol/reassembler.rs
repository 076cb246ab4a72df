//! Stream reassembler for characteristic notifications.
//!
//! BLE notifications arrive in arbitrary slices: a frame may span several
//! notifications, and one notification may carry several frames or leading
//! noise. The reassembler accumulates bytes in a `bytes::BytesMut` and cuts
//! frames with [`extract_frame`](super::extract_frame).
//!
//! # Example
//!
//! ```
//! use massager_protocol::protocol::{build_frame, Direction, StreamReassembler};
//!
//! let mut reassembler = StreamReassembler::new();
//! let bytes = build_frame(Direction::DeviceToApp, 2, &[5]);
//!
//! assert!(reassembler.append(&bytes[..4]).is_empty());
//! let frames = reassembler.append(&bytes[4..]);
//! assert_eq!(frames.len(), 1);
//! ```

use bytes::BytesMut;

use super::extractor::{extract_frame, Extraction};
use super::Frame;

/// Hard ceiling on buffered bytes.
pub const DEFAULT_MAX_BUFFER_LEN: usize = 256;

/// Accumulates notification payloads and emits complete frames.
///
/// Not synchronized. A connection that receives notifications on one task
/// and clears on another must wrap it in a mutex.
#[derive(Debug)]
pub struct StreamReassembler {
    /// Bytes not yet consumed as frames.
    buffer: BytesMut,
    /// Reset threshold.
    max_len: usize,
}

impl StreamReassembler {
    /// Create a reassembler with the default 256-byte ceiling.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_BUFFER_LEN)
    }

    /// Create a reassembler with a custom ceiling.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(max_len),
            max_len,
        }
    }

    /// Append a notification payload and extract every complete frame.
    ///
    /// Noise in front of a header is dropped. If the buffer is still over the
    /// ceiling afterwards it is reset, losing the partial data.
    pub fn append(&mut self, data: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();

        loop {
            match extract_frame(&self.buffer) {
                Extraction::Frame { len } => {
                    let bytes = self.buffer.split_to(len).freeze();
                    tracing::trace!("Extracted frame: {:02X?}", &bytes[..]);
                    frames.push(Frame::new(bytes));
                }
                Extraction::Discard(n) => {
                    tracing::debug!("Discarding {} bytes of noise", n);
                    let _ = self.buffer.split_to(n);
                }
                Extraction::NeedMoreData => break,
            }
        }

        if self.buffer.len() > self.max_len {
            tracing::warn!(
                "Reassembly buffer exceeded {} bytes ({}), resetting",
                self.max_len,
                self.buffer.len()
            );
            self.buffer.clear();
        }

        frames
    }

    /// Drop all buffered bytes. Call on disconnect or reconnect.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured ceiling.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for StreamReassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, command, Direction};

    fn make_frame(command_id: u8, body: &[u8]) -> Vec<u8> {
        build_frame(Direction::DeviceToApp, command_id, body)
    }

    #[test]
    fn test_single_complete_frame() {
        let mut reassembler = StreamReassembler::new();
        let bytes = make_frame(command::MODE, &[3]);

        let frames = reassembler.append(&bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes[..]);
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_multiple_frames_in_one_append() {
        let mut reassembler = StreamReassembler::new();

        let mut combined = make_frame(command::MODE, &[1]);
        combined.extend_from_slice(&make_frame(command::INTENSITY, &[2]));
        combined.extend_from_slice(&make_frame(command::BODY_ZONE, &[3]));

        let frames = reassembler.append(&combined);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].command_id(), Some(command::MODE));
        assert_eq!(frames[1].command_id(), Some(command::INTENSITY));
        assert_eq!(frames[2].command_id(), Some(command::BODY_ZONE));
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_fragmented_frame() {
        let mut reassembler = StreamReassembler::new();
        let bytes = make_frame(command::TIMER, &[0x02, 0x58]);

        assert!(reassembler.append(&bytes[..3]).is_empty());
        assert_eq!(reassembler.len(), 3);

        let frames = reassembler.append(&bytes[3..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), &[0x02, 0x58]);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut reassembler = StreamReassembler::new();
        let bytes = make_frame(command::STATUS, &[1, 4, 2, 9, 1, 0x01, 0x2C, 1, 0]);

        let mut all_frames = Vec::new();
        for byte in &bytes {
            all_frames.extend(reassembler.append(&[*byte]));
        }

        assert_eq!(all_frames.len(), 1);
        assert_eq!(all_frames[0].as_bytes(), &bytes[..]);
    }

    #[test]
    fn test_mixed_complete_and_partial() {
        let mut reassembler = StreamReassembler::new();

        let first = make_frame(command::MODE, &[1]);
        let second = make_frame(command::INTENSITY, &[9]);

        let mut data = first.clone();
        data.extend_from_slice(&second[..5]);

        let frames = reassembler.append(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(reassembler.len(), 5);

        let frames = reassembler.append(&second[5..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command_id(), Some(command::INTENSITY));
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut reassembler = StreamReassembler::new();
        let bytes = make_frame(command::MODE, &[4]);

        let mut data = vec![0x00, 0x13, 0x79, 0x68, 0x0D, 0x0A];
        data.extend_from_slice(&bytes);

        let frames = reassembler.append(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes[..]);
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_split_header_survives() {
        let mut reassembler = StreamReassembler::new();
        let bytes = make_frame(command::MODE, &[4]);

        let mut first = vec![0xEE, 0xEE];
        first.push(bytes[0]);

        assert!(reassembler.append(&first).is_empty());
        assert_eq!(reassembler.len(), 1);

        let frames = reassembler.append(&bytes[1..]);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_noise_only_never_accumulates() {
        let mut reassembler = StreamReassembler::new();
        let noise = vec![0x55u8; 300];

        let frames = reassembler.append(&noise);

        assert!(frames.is_empty());
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_overflow_resets_buffer() {
        let mut reassembler = StreamReassembler::new();

        // Header declaring a 1000-byte frame that never completes.
        let mut data = vec![0x68, 0x79, 0x03, 0xE8, 0x02, 0x00];
        data.extend(std::iter::repeat(0x11).take(300));

        let frames = reassembler.append(&data);

        assert!(frames.is_empty());
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_under_ceiling_is_kept() {
        let mut reassembler = StreamReassembler::with_max_len(64);
        let mut data = vec![0x68, 0x79, 0x00, 0x50, 0x02, 0x00];
        data.extend(std::iter::repeat(0x11).take(40));

        reassembler.append(&data);
        assert_eq!(reassembler.len(), 46);

        reassembler.append(&[0x11; 20]);
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_clear_drops_partial_frame() {
        let mut reassembler = StreamReassembler::new();
        let bytes = make_frame(command::MODE, &[2]);

        reassembler.append(&bytes[..6]);
        assert!(!reassembler.is_empty());

        reassembler.clear();
        assert!(reassembler.is_empty());

        // Tail of the old frame is now noise; a fresh frame still decodes.
        let mut data = bytes[6..].to_vec();
        data.extend_from_slice(&bytes);
        let frames = reassembler.append(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes[..]);
    }
}
