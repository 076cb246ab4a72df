//! EMS v2 codec.
//!
//! Decoding is lenient where firmware revisions disagree:
//! - the length field may or may not count the terminator
//! - the CRC may be stored big-endian or little-endian
//! - heartbeat bodies come in a 2-byte-timer layout and a legacy
//!   1-byte-minutes layout
//!
//! Encoding always writes the total length and a big-endian CRC.

use bytes::Bytes;

use super::message::{Heartbeat, ProtocolCommand, ProtocolMessage, BATTERY_UNKNOWN};
use super::{CodecCapabilities, ProtocolCodec};
use crate::checksum;
use crate::protocol::{
    build_frame, command, Direction, Frame, HEADER, MIN_FRAME_SIZE, TERMINATOR, TERMINATOR_LEN,
};

/// Protocol key shared by the EMS v2 codec and session.
pub const EMS_V2_PROTOCOL_KEY: &str = "ems_v2";

/// Product ids served when none are configured.
const DEFAULT_PRODUCT_IDS: &[u32] = &[1, 2];

/// Heartbeat bodies at least this long carry a 2-byte timer.
const WIDE_TIMER_BODY_LEN: usize = 8;

/// Fixed heartbeat prefix: running, battery, mode, level, zone.
const HEARTBEAT_PREFIX_LEN: usize = 5;

const MAX_ZONE: u8 = 5;
const MAX_MODE: u8 = 7;
const MAX_LEVEL: u8 = 19;

/// Codec for the EMS v2 frame format.
#[derive(Debug, Clone)]
pub struct EmsV2Codec {
    capabilities: CodecCapabilities,
}

impl EmsV2Codec {
    /// Create a codec serving the default product ids.
    pub fn new() -> Self {
        Self::with_product_ids(DEFAULT_PRODUCT_IDS.to_vec())
    }

    /// Create a codec serving the given product ids.
    pub fn with_product_ids(product_ids: Vec<u32>) -> Self {
        Self {
            capabilities: CodecCapabilities {
                protocol_key: EMS_V2_PROTOCOL_KEY,
                product_ids,
                service_uuids: vec![
                    "0000ffe0-0000-1000-8000-00805f9b34fb",
                    "6e400001-b5a3-f393-e0a9-e50e24dcca9e",
                ],
                notify_uuids: vec![
                    "0000ffe1-0000-1000-8000-00805f9b34fb",
                    "6e400003-b5a3-f393-e0a9-e50e24dcca9e",
                ],
                write_uuids: vec![
                    "0000ffe1-0000-1000-8000-00805f9b34fb",
                    "6e400002-b5a3-f393-e0a9-e50e24dcca9e",
                ],
                preferred_mtu: 185,
            },
        }
    }

    fn decode_body(direction: Direction, command_id: u8, body: &[u8]) -> ProtocolMessage {
        let first = body.first().copied();
        match (command_id, first) {
            // Outgoing STATUS frames are program control, not reports.
            (command::STATUS | command::HEARTBEAT, _)
                if direction == Direction::DeviceToApp && body.len() >= HEARTBEAT_PREFIX_LEN =>
            {
                ProtocolMessage::Heartbeat(decode_heartbeat(direction, command_id, body))
            }
            (command::MODE, Some(mode)) => ProtocolMessage::ModeReport {
                direction,
                command_id,
                mode,
            },
            (command::INTENSITY, Some(level)) => ProtocolMessage::LevelReport {
                direction,
                command_id,
                level,
            },
            (command::BODY_ZONE, Some(zone)) => ProtocolMessage::ZoneReport {
                direction,
                command_id,
                zone,
            },
            (command::TIMER, Some(minutes)) => {
                let seconds = match body {
                    [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]) as u32,
                    _ => minutes as u32 * 60,
                };
                ProtocolMessage::TimerReport {
                    direction,
                    command_id,
                    seconds,
                }
            }
            (command::BUZZER, Some(flag)) => ProtocolMessage::MuteReport {
                direction,
                command_id,
                muted: flag == 0,
            },
            _ => {
                tracing::trace!("Generic message for command id {:#04x}", command_id);
                ProtocolMessage::Generic {
                    direction,
                    command_id,
                    body: Bytes::copy_from_slice(body),
                }
            }
        }
    }
}

impl Default for EmsV2Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for EmsV2Codec {
    fn capabilities(&self) -> &CodecCapabilities {
        &self.capabilities
    }

    fn decode(&self, frame: &Frame) -> Option<ProtocolMessage> {
        let bytes = frame.as_bytes();
        let len = bytes.len();

        if len < MIN_FRAME_SIZE {
            return None;
        }
        if bytes[..2] != HEADER || bytes[len - TERMINATOR_LEN..] != TERMINATOR {
            return None;
        }

        let declared = frame.declared_len()? as usize;
        if declared != len && declared != len - TERMINATOR_LEN {
            tracing::debug!("Length mismatch: declared {} for {} bytes", declared, len);
            return None;
        }

        let crc_index = frame.crc_index()?;
        let stored = frame.crc_bytes()?;
        if !checksum::matches(&bytes[..crc_index], stored) {
            tracing::debug!(
                "CRC mismatch: computed {:#06x}, stored {:02X?}",
                checksum::compute(&bytes[..crc_index]),
                stored
            );
            return None;
        }

        let direction = frame.direction()?;
        let command_id = frame.command_id()?;

        Some(Self::decode_body(direction, command_id, frame.body()))
    }

    fn encode(&self, command: &ProtocolCommand) -> Bytes {
        let (direction, command_id, body): (Direction, u8, Vec<u8>) = match command {
            ProtocolCommand::ReadStatus => (Direction::AppToDevice, command::STATUS, vec![0x00]),
            ProtocolCommand::SetMode(mode) => (Direction::AppToDevice, command::MODE, vec![*mode]),
            ProtocolCommand::SetBodyZone(zone) => {
                (Direction::AppToDevice, command::BODY_ZONE, vec![*zone])
            }
            ProtocolCommand::SetLevel(level) => {
                (Direction::AppToDevice, command::INTENSITY, vec![*level])
            }
            ProtocolCommand::SetTimer(seconds) => (
                Direction::AppToDevice,
                command::TIMER,
                clamp_u16(*seconds).to_be_bytes().to_vec(),
            ),
            ProtocolCommand::RequestHeartbeat => {
                (Direction::AppToDevice, command::HEARTBEAT, Vec::new())
            }
            ProtocolCommand::SetRunState {
                running,
                duration_seconds,
            } => {
                let [hi, lo] = clamp_u16(*duration_seconds).to_be_bytes();
                (
                    Direction::AppToDevice,
                    command::RUN_STATE,
                    vec![*running as u8, hi, lo],
                )
            }
            ProtocolCommand::RunProgram {
                zone,
                mode,
                level,
                timer_minutes,
            } => (
                Direction::AppToDevice,
                command::STATUS,
                vec![
                    0x01,
                    (*zone).min(MAX_ZONE),
                    (*mode).min(MAX_MODE),
                    (*level).min(MAX_LEVEL),
                    (*timer_minutes).min(u8::MAX as u32) as u8,
                ],
            ),
            ProtocolCommand::StopProgram => {
                (Direction::AppToDevice, command::STATUS, vec![0, 0, 0, 0, 0])
            }
            // Buzzer byte is inverted: 0 turns the buzzer off (muted).
            ProtocolCommand::ToggleMute(enabled) => (
                Direction::AppToDevice,
                command::BUZZER,
                vec![if *enabled { 0 } else { 1 }],
            ),
            ProtocolCommand::Raw {
                direction,
                command_id,
                payload,
            } => (*direction, *command_id, payload.to_vec()),
        };

        tracing::trace!("Encoding {} as command id {:#04x}", command.name(), command_id);
        Bytes::from(build_frame(direction, command_id, &body))
    }
}

fn clamp_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

fn battery_percent(level: u8) -> i8 {
    if level <= 4 {
        (level * 25).min(100) as i8
    } else {
        BATTERY_UNKNOWN
    }
}

/// Decode a heartbeat body of at least [`HEARTBEAT_PREFIX_LEN`] bytes.
fn decode_heartbeat(direction: Direction, command_id: u8, body: &[u8]) -> Heartbeat {
    let (timer_seconds, tail) = if body.len() >= WIDE_TIMER_BODY_LEN {
        let seconds = u16::from_be_bytes([body[5], body[6]]) as u32;
        (seconds, 7)
    } else {
        let seconds = body.get(5).map_or(0, |&minutes| minutes as u32 * 60);
        (seconds, 6)
    };

    Heartbeat {
        direction,
        command_id,
        is_running: body[0] == 1,
        battery_percent: battery_percent(body[1]),
        mode: body[2],
        level: body[3],
        zone: body[4],
        timer_seconds,
        is_muted: body.get(tail).map(|&flag| flag == 0),
        charge_status: body.get(tail + 1).copied(),
    }
}
