//! Codec module - frame decoding and command encoding.
//!
//! A codec understands one product family's wire format:
//!
//! - [`EmsV2Codec`] - the EMS v2 frame format (`68 79 ... 0D 0A`)
//!
//! # Design
//!
//! Codecs are trait objects so the [`ProtocolRegistry`](crate::registry::ProtocolRegistry)
//! can route a discovered product id to the right one at runtime. Each codec
//! owns a [`CodecCapabilities`] descriptor instead of inheriting defaults.
//!
//! # Example
//!
//! ```
//! use massager_protocol::codec::{EmsV2Codec, ProtocolCodec, ProtocolCommand, ProtocolMessage};
//! use massager_protocol::protocol::Frame;
//!
//! let codec = EmsV2Codec::new();
//! let bytes = codec.encode(&ProtocolCommand::SetLevel(5));
//!
//! match codec.decode(&Frame::from_slice(&bytes)) {
//!     Some(ProtocolMessage::LevelReport { level, .. }) => assert_eq!(level, 5),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

mod ems_v2;
mod message;

pub use ems_v2::{EmsV2Codec, EMS_V2_PROTOCOL_KEY};
pub use message::{Heartbeat, ProtocolCommand, ProtocolMessage, BATTERY_UNKNOWN};

use bytes::Bytes;

use crate::protocol::Frame;

/// Static description of what a codec talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecCapabilities {
    /// Key used to pair a codec with a device session.
    pub protocol_key: &'static str,
    /// Product ids served by this codec.
    pub product_ids: Vec<u32>,
    /// GATT service UUID candidates, most likely first.
    pub service_uuids: Vec<&'static str>,
    /// Notify characteristic UUID candidates.
    pub notify_uuids: Vec<&'static str>,
    /// Write characteristic UUID candidates.
    pub write_uuids: Vec<&'static str>,
    /// MTU to request after connecting.
    pub preferred_mtu: u16,
}

/// Encoder/decoder for one product family.
///
/// Both directions are pure and may be called from any thread.
pub trait ProtocolCodec: Send + Sync + 'static {
    /// Descriptor for registry routing and transport setup.
    fn capabilities(&self) -> &CodecCapabilities;

    /// Decode a complete frame. Malformed frames yield `None`.
    fn decode(&self, frame: &Frame) -> Option<ProtocolMessage>;

    /// Encode a command into a complete frame.
    ///
    /// # Panics
    ///
    /// Panics on a command this codec cannot express.
    fn encode(&self, command: &ProtocolCommand) -> Bytes;
}
