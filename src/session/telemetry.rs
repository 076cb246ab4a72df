//! Device-agnostic telemetry.
//!
//! Full heartbeats replace most fields; single-field reports update one.
//! Fields stay `None` until the device has reported them.

use serde::Serialize;

use crate::codec::{ProtocolMessage, BATTERY_UNKNOWN};

/// Latest known device state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    pub is_running: Option<bool>,
    pub battery_percent: Option<u8>,
    pub mode: Option<u8>,
    pub level: Option<u8>,
    pub zone: Option<u8>,
    pub timer_seconds: Option<u32>,
    pub is_muted: Option<bool>,
    pub charge_status: Option<u8>,
}

/// Accumulates messages into a [`Telemetry`] snapshot.
#[derive(Debug, Clone, Default)]
pub struct TelemetryMapper {
    current: Telemetry,
}

impl TelemetryMapper {
    /// Create a mapper with an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a message into the snapshot.
    ///
    /// Returns `true` if any field changed.
    pub fn apply(&mut self, message: &ProtocolMessage) -> bool {
        let before = self.current.clone();
        let t = &mut self.current;

        match message {
            ProtocolMessage::Heartbeat(hb) => {
                t.is_running = Some(hb.is_running);
                if hb.battery_percent != BATTERY_UNKNOWN {
                    t.battery_percent = Some(hb.battery_percent as u8);
                }
                t.mode = Some(hb.mode);
                t.level = Some(hb.level);
                t.zone = Some(hb.zone);
                t.timer_seconds = Some(hb.timer_seconds);
                if hb.is_muted.is_some() {
                    t.is_muted = hb.is_muted;
                }
                if hb.charge_status.is_some() {
                    t.charge_status = hb.charge_status;
                }
            }
            ProtocolMessage::ModeReport { mode, .. } => t.mode = Some(*mode),
            ProtocolMessage::LevelReport { level, .. } => t.level = Some(*level),
            ProtocolMessage::ZoneReport { zone, .. } => t.zone = Some(*zone),
            ProtocolMessage::TimerReport { seconds, .. } => t.timer_seconds = Some(*seconds),
            ProtocolMessage::MuteReport { muted, .. } => t.is_muted = Some(*muted),
            ProtocolMessage::Generic { command_id, .. } => {
                tracing::trace!("No telemetry for command id {:#04x}", command_id);
            }
        }

        self.current != before
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &Telemetry {
        &self.current
    }

    /// Forget everything, e.g. after a disconnect.
    pub fn reset(&mut self) {
        self.current = Telemetry::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Heartbeat;
    use crate::protocol::Direction;
    use bytes::Bytes;

    fn heartbeat(battery_percent: i8, is_muted: Option<bool>) -> ProtocolMessage {
        ProtocolMessage::Heartbeat(Heartbeat {
            direction: Direction::DeviceToApp,
            command_id: 0,
            is_running: true,
            battery_percent,
            mode: 3,
            level: 10,
            zone: 2,
            timer_seconds: 900,
            is_muted,
            charge_status: None,
        })
    }

    #[test]
    fn test_heartbeat_fills_snapshot() {
        let mut mapper = TelemetryMapper::new();
        assert!(mapper.apply(&heartbeat(50, Some(false))));

        assert_eq!(
            mapper.snapshot(),
            &Telemetry {
                is_running: Some(true),
                battery_percent: Some(50),
                mode: Some(3),
                level: Some(10),
                zone: Some(2),
                timer_seconds: Some(900),
                is_muted: Some(false),
                charge_status: None,
            }
        );
    }

    #[test]
    fn test_unknown_battery_keeps_previous() {
        let mut mapper = TelemetryMapper::new();
        mapper.apply(&heartbeat(75, None));
        mapper.apply(&heartbeat(BATTERY_UNKNOWN, None));

        assert_eq!(mapper.snapshot().battery_percent, Some(75));
    }

    #[test]
    fn test_partial_reports_update_one_field() {
        let mut mapper = TelemetryMapper::new();
        mapper.apply(&heartbeat(100, Some(false)));

        assert!(mapper.apply(&ProtocolMessage::LevelReport {
            direction: Direction::DeviceToApp,
            command_id: 2,
            level: 12,
        }));
        assert!(mapper.apply(&ProtocolMessage::MuteReport {
            direction: Direction::DeviceToApp,
            command_id: 7,
            muted: true,
        }));
        assert!(mapper.apply(&ProtocolMessage::ZoneReport {
            direction: Direction::DeviceToApp,
            command_id: 3,
            zone: 5,
        }));
        assert!(mapper.apply(&ProtocolMessage::ModeReport {
            direction: Direction::DeviceToApp,
            command_id: 1,
            mode: 0,
        }));
        assert!(mapper.apply(&ProtocolMessage::TimerReport {
            direction: Direction::DeviceToApp,
            command_id: 8,
            seconds: 30,
        }));

        let t = mapper.snapshot();
        assert_eq!(t.level, Some(12));
        assert_eq!(t.is_muted, Some(true));
        assert_eq!(t.zone, Some(5));
        assert_eq!(t.mode, Some(0));
        assert_eq!(t.timer_seconds, Some(30));
        assert_eq!(t.battery_percent, Some(100));
    }

    #[test]
    fn test_generic_and_repeats_report_no_change() {
        let mut mapper = TelemetryMapper::new();
        assert!(!mapper.apply(&ProtocolMessage::Generic {
            direction: Direction::DeviceToApp,
            command_id: 0x40,
            body: Bytes::new(),
        }));

        mapper.apply(&heartbeat(25, None));
        assert!(!mapper.apply(&heartbeat(25, None)));
    }

    #[test]
    fn test_reset() {
        let mut mapper = TelemetryMapper::new();
        mapper.apply(&heartbeat(25, None));
        mapper.reset();
        assert_eq!(mapper.snapshot(), &Telemetry::default());
    }
}
