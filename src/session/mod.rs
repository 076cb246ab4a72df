//! Session module - user intents in, telemetry out.
//!
//! Provides:
//! - [`DeviceIntent`] - what the user asked for, independent of wire format
//! - [`DeviceSession`] - maps intents to a codec's [`ProtocolCommand`]s
//! - [`TelemetryMapper`] - folds decoded messages into a [`Telemetry`] snapshot
//!
//! Sessions hold no framing state. Framing lives in the link's reassembler.

mod ems_v2;
mod telemetry;

pub use ems_v2::EmsV2Session;
pub use telemetry::{Telemetry, TelemetryMapper};

use std::sync::Arc;

use crate::codec::ProtocolCommand;
use crate::error::Result;

/// A device-agnostic user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIntent {
    SelectZone(u8),
    SelectMode(u8),
    SelectLevel(u8),
    SelectTimer { seconds: u32 },
    /// Start a full program in one write.
    RunProgram {
        zone: u8,
        mode: u8,
        level: u8,
        timer_minutes: u32,
    },
    Start { duration_seconds: u32 },
    Pause,
    Stop,
    SetMuted(bool),
    RequestStatus,
    RequestHeartbeat,
}

/// Translates intents into commands for one or more protocol families.
pub trait DeviceSession: Send + Sync + 'static {
    /// Protocol keys this session can drive.
    fn protocol_keys(&self) -> &[&'static str];

    /// Map an intent to a command.
    ///
    /// Returns [`ProtocolError::UnsupportedIntent`](crate::ProtocolError::UnsupportedIntent)
    /// if the device family has no equivalent.
    fn command_for(&self, intent: &DeviceIntent) -> Result<ProtocolCommand>;

    /// Check if this session drives the given protocol key.
    fn supports(&self, protocol_key: &str) -> bool {
        self.protocol_keys().contains(&protocol_key)
    }
}

/// Pick the first session that supports `protocol_key`.
pub fn select_session(
    sessions: &[Arc<dyn DeviceSession>],
    protocol_key: &str,
) -> Option<Arc<dyn DeviceSession>> {
    sessions.iter().find(|s| s.supports(protocol_key)).cloned()
}
