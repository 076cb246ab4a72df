//! # massager-protocol
//!
//! BLE device-protocol core for EMS massagers.
//!
//! This crate turns noisy characteristic notifications into typed protocol
//! messages and user intents into wire-exact frames. The BLE stack itself
//! (scanning, connecting, GATT I/O) stays outside and talks to this crate
//! through byte chunks and the [`transport::Transport`] trait.
//!
//! ## Architecture
//!
//! - **Byte layer** ([`protocol`], [`checksum`]): framing, CRC16, reassembly
//! - **Codec layer** ([`codec`], [`registry`]): frames ↔ messages/commands,
//!   routed by product id
//! - **Session layer** ([`session`], [`link`]): intents, telemetry and the
//!   per-device async link
//! - **Discovery** ([`advertisement`]): product identity from scan results
//!
//! ## Example
//!
//! ```
//! use massager_protocol::codec::{EmsV2Codec, ProtocolCodec, ProtocolCommand};
//! use massager_protocol::protocol::StreamReassembler;
//!
//! let codec = EmsV2Codec::new();
//! let bytes = codec.encode(&ProtocolCommand::SetLevel(5));
//!
//! let mut reassembler = StreamReassembler::new();
//! let mut messages = Vec::new();
//! for chunk in bytes.chunks(3) {
//!     for frame in reassembler.append(chunk) {
//!         messages.extend(codec.decode(&frame));
//!     }
//! }
//! assert_eq!(messages.len(), 1);
//! ```

pub mod advertisement;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod error;
pub mod link;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod transport;

pub use advertisement::{decode_scan_record, Advertisement};
pub use error::ProtocolError;
pub use link::{DeviceLink, DeviceLinkBuilder, LinkEvent};
pub use registry::ProtocolRegistry;
pub use session::{DeviceIntent, DeviceSession, Telemetry};
