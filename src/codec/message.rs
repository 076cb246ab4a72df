//! Typed protocol messages and commands.

use bytes::Bytes;
use serde::Serialize;

use crate::protocol::Direction;

/// Battery percentage reported when the level byte is out of range.
pub const BATTERY_UNKNOWN: i8 = -1;

/// Periodic device status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heartbeat {
    pub direction: Direction,
    pub command_id: u8,
    pub is_running: bool,
    /// 0-100 in steps of 25, or [`BATTERY_UNKNOWN`].
    pub battery_percent: i8,
    pub mode: u8,
    pub level: u8,
    pub zone: u8,
    pub timer_seconds: u32,
    pub is_muted: Option<bool>,
    pub charge_status: Option<u8>,
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ProtocolMessage {
    Heartbeat(Heartbeat),
    ModeReport {
        direction: Direction,
        command_id: u8,
        mode: u8,
    },
    LevelReport {
        direction: Direction,
        command_id: u8,
        level: u8,
    },
    ZoneReport {
        direction: Direction,
        command_id: u8,
        zone: u8,
    },
    TimerReport {
        direction: Direction,
        command_id: u8,
        seconds: u32,
    },
    MuteReport {
        direction: Direction,
        command_id: u8,
        muted: bool,
    },
    /// Command id without a typed shape, or a body too short for one.
    Generic {
        direction: Direction,
        command_id: u8,
        #[serde(serialize_with = "serialize_bytes")]
        body: Bytes,
    },
}

impl ProtocolMessage {
    /// Direction of the frame this message came from.
    pub fn direction(&self) -> Direction {
        match self {
            ProtocolMessage::Heartbeat(hb) => hb.direction,
            ProtocolMessage::ModeReport { direction, .. }
            | ProtocolMessage::LevelReport { direction, .. }
            | ProtocolMessage::ZoneReport { direction, .. }
            | ProtocolMessage::TimerReport { direction, .. }
            | ProtocolMessage::MuteReport { direction, .. }
            | ProtocolMessage::Generic { direction, .. } => *direction,
        }
    }

    /// Command id of the frame this message came from.
    pub fn command_id(&self) -> u8 {
        match self {
            ProtocolMessage::Heartbeat(hb) => hb.command_id,
            ProtocolMessage::ModeReport { command_id, .. }
            | ProtocolMessage::LevelReport { command_id, .. }
            | ProtocolMessage::ZoneReport { command_id, .. }
            | ProtocolMessage::TimerReport { command_id, .. }
            | ProtocolMessage::MuteReport { command_id, .. }
            | ProtocolMessage::Generic { command_id, .. } => *command_id,
        }
    }
}

fn serialize_bytes<S: serde::Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(bytes)
}

/// An outbound command, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolCommand {
    ReadStatus,
    SetMode(u8),
    SetBodyZone(u8),
    SetLevel(u8),
    /// Seconds, clamped to 0..=65535 on encode.
    SetTimer(u32),
    RequestHeartbeat,
    SetRunState {
        running: bool,
        duration_seconds: u32,
    },
    RunProgram {
        zone: u8,
        mode: u8,
        level: u8,
        timer_minutes: u32,
    },
    StopProgram,
    ToggleMute(bool),
    Raw {
        direction: Direction,
        command_id: u8,
        payload: Bytes,
    },
}

impl ProtocolCommand {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolCommand::ReadStatus => "ReadStatus",
            ProtocolCommand::SetMode(_) => "SetMode",
            ProtocolCommand::SetBodyZone(_) => "SetBodyZone",
            ProtocolCommand::SetLevel(_) => "SetLevel",
            ProtocolCommand::SetTimer(_) => "SetTimer",
            ProtocolCommand::RequestHeartbeat => "RequestHeartbeat",
            ProtocolCommand::SetRunState { .. } => "SetRunState",
            ProtocolCommand::RunProgram { .. } => "RunProgram",
            ProtocolCommand::StopProgram => "StopProgram",
            ProtocolCommand::ToggleMute(_) => "ToggleMute",
            ProtocolCommand::Raw { .. } => "Raw",
        }
    }
}
