//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the EMS v2 byte layer:
//! - Header, terminator and command id constants
//! - Stateless frame extraction over an accumulated buffer
//! - Stream reassembler for partial and coalesced notifications
//! - Frame struct with typed accessors

mod extractor;
mod frame;
mod reassembler;
mod wire_format;

pub use extractor::{extract_frame, Extraction};
pub use frame::{build_frame, Frame};
pub use reassembler::{StreamReassembler, DEFAULT_MAX_BUFFER_LEN};
pub use wire_format::{
    command, Direction, BODY_OFFSET, COMMAND_OFFSET, CRC_LEN, DIRECTION_OFFSET, HEADER,
    HEADER_LEN, LENGTH_FIELD_LEN, MAX_FRAME_SIZE, MIN_EXTRACT_SIZE, MIN_FRAME_SIZE, TERMINATOR,
    TERMINATOR_LEN,
};

pub(crate) use wire_format::find_pair;
