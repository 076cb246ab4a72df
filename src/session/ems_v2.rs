//! Intent mapping for EMS v2 devices.

use super::{DeviceIntent, DeviceSession};
use crate::codec::{ProtocolCommand, EMS_V2_PROTOCOL_KEY};
use crate::error::Result;

/// Session for the EMS v2 product family.
#[derive(Debug, Clone, Default)]
pub struct EmsV2Session;

impl EmsV2Session {
    /// Create a new session.
    pub fn new() -> Self {
        Self
    }
}

impl DeviceSession for EmsV2Session {
    fn protocol_keys(&self) -> &[&'static str] {
        &[EMS_V2_PROTOCOL_KEY]
    }

    fn command_for(&self, intent: &DeviceIntent) -> Result<ProtocolCommand> {
        let command = match *intent {
            DeviceIntent::SelectZone(zone) => ProtocolCommand::SetBodyZone(zone),
            DeviceIntent::SelectMode(mode) => ProtocolCommand::SetMode(mode),
            DeviceIntent::SelectLevel(level) => ProtocolCommand::SetLevel(level),
            DeviceIntent::SelectTimer { seconds } => ProtocolCommand::SetTimer(seconds),
            DeviceIntent::RunProgram {
                zone,
                mode,
                level,
                timer_minutes,
            } => ProtocolCommand::RunProgram {
                zone,
                mode,
                level,
                timer_minutes,
            },
            DeviceIntent::Start { duration_seconds } => ProtocolCommand::SetRunState {
                running: true,
                duration_seconds,
            },
            DeviceIntent::Pause => ProtocolCommand::SetRunState {
                running: false,
                duration_seconds: 0,
            },
            DeviceIntent::Stop => ProtocolCommand::StopProgram,
            DeviceIntent::SetMuted(muted) => ProtocolCommand::ToggleMute(muted),
            DeviceIntent::RequestStatus => ProtocolCommand::ReadStatus,
            DeviceIntent::RequestHeartbeat => ProtocolCommand::RequestHeartbeat,
        };
        Ok(command)
    }
}
