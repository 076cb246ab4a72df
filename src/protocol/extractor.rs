//! Stateless frame extraction.
//!
//! [`extract_frame`] looks at the front of an accumulated buffer and makes a
//! single decision. The reassembler calls it in a loop until it reports
//! [`Extraction::NeedMoreData`].

use super::wire_format::{
    find_pair, CRC_LEN, HEADER, HEADER_LEN, MIN_EXTRACT_SIZE, MIN_FRAME_SIZE, TERMINATOR,
    TERMINATOR_LEN,
};
use crate::checksum;

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// `buffer[..len]` is a complete frame; consume `len` bytes.
    Frame { len: usize },
    /// Drop this many leading bytes and try again.
    Discard(usize),
    /// Wait for more bytes. Nothing should be consumed.
    NeedMoreData,
}

/// Decide what to do with the front of `buffer`.
///
/// The declared length either counts the terminator or stops short of it, so
/// a frame ends at `declared` or `declared + 2`. The shorter end needs a CRC
/// that checks before it wins, since in the short-length convention it lands
/// on the CRC field and a CRC of `0D 0A` would otherwise cut the frame.
pub fn extract_frame(buffer: &[u8]) -> Extraction {
    if buffer.is_empty() {
        return Extraction::NeedMoreData;
    }

    let start = match find_pair(buffer, HEADER, 0) {
        Some(idx) => idx,
        None => {
            // A trailing 0x68 may be the first half of a split header.
            if buffer[buffer.len() - 1] == HEADER[0] {
                return match buffer.len() - 1 {
                    0 => Extraction::NeedMoreData,
                    noise => Extraction::Discard(noise),
                };
            }
            return Extraction::Discard(buffer.len());
        }
    };

    if start > 0 {
        return Extraction::Discard(start);
    }

    if buffer.len() < MIN_EXTRACT_SIZE {
        return Extraction::NeedMoreData;
    }

    let declared = u16::from_be_bytes([buffer[HEADER_LEN], buffer[HEADER_LEN + 1]]) as usize;
    if declared + TERMINATOR_LEN < MIN_FRAME_SIZE {
        return Extraction::Discard(HEADER_LEN);
    }

    let longest = declared + TERMINATOR_LEN;
    let short_ends = terminated_at(buffer, declared);

    if short_ends && crc_holds(&buffer[..declared]) {
        return Extraction::Frame { len: declared };
    }
    if buffer.len() < longest {
        return Extraction::NeedMoreData;
    }

    if terminated_at(buffer, longest) {
        Extraction::Frame { len: longest }
    } else if short_ends {
        // Corrupt, but framed. Let the codec reject it.
        Extraction::Frame { len: declared }
    } else {
        Extraction::Discard(HEADER_LEN)
    }
}

fn terminated_at(buffer: &[u8], end: usize) -> bool {
    end >= MIN_EXTRACT_SIZE
        && end <= buffer.len()
        && buffer[end - TERMINATOR_LEN..end] == TERMINATOR
}

fn crc_holds(frame: &[u8]) -> bool {
    let crc_index = frame.len() - TERMINATOR_LEN - CRC_LEN;
    checksum::matches(
        &frame[..crc_index],
        [frame[crc_index], frame[crc_index + 1]],
    )
}
