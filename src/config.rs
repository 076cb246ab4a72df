//! Link configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```
//! use massager_protocol::config::LinkConfig;
//!
//! let config = LinkConfig::from_json_str(r#"{ "default_product_id": 2 }"#).unwrap();
//! assert_eq!(config.default_product_id, Some(2));
//! assert_eq!(config.max_buffer_len, 256);
//! ```

use serde::Deserialize;

use crate::error::{ProtocolError, Result};
use crate::protocol::{DEFAULT_MAX_BUFFER_LEN, MIN_FRAME_SIZE};

/// Default notification channel capacity.
pub const DEFAULT_NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// Default telemetry channel capacity.
pub const DEFAULT_TELEMETRY_CHANNEL_CAPACITY: usize = 64;

/// Configuration for a [`DeviceLink`](crate::link::DeviceLink).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Product id to fall back on when discovery could not determine one.
    pub default_product_id: Option<u32>,
    /// Reassembly buffer ceiling in bytes.
    pub max_buffer_len: usize,
    /// Capacity of the notification channel handed to the transport.
    pub notification_channel_capacity: usize,
    /// Capacity of the event channel handed to the UI.
    pub telemetry_channel_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_product_id: None,
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
            notification_channel_capacity: DEFAULT_NOTIFICATION_CHANNEL_CAPACITY,
            telemetry_channel_capacity: DEFAULT_TELEMETRY_CHANNEL_CAPACITY,
        }
    }
}

impl LinkConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_buffer_len < MIN_FRAME_SIZE {
            return Err(ProtocolError::Config(format!(
                "max_buffer_len {} is smaller than a frame ({})",
                self.max_buffer_len, MIN_FRAME_SIZE
            )));
        }
        if self.notification_channel_capacity == 0 || self.telemetry_channel_capacity == 0 {
            return Err(ProtocolError::Config(
                "Channel capacities must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.default_product_id, None);
        assert_eq!(config.max_buffer_len, 256);
        assert_eq!(
            config.notification_channel_capacity,
            DEFAULT_NOTIFICATION_CHANNEL_CAPACITY
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(LinkConfig::from_json_str("{}").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_full_json() {
        let config = LinkConfig::from_json_str(
            r#"{
                "default_product_id": 1,
                "max_buffer_len": 512,
                "notification_channel_capacity": 8,
                "telemetry_channel_capacity": 4
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_product_id, Some(1));
        assert_eq!(config.max_buffer_len, 512);
        assert_eq!(config.notification_channel_capacity, 8);
        assert_eq!(config.telemetry_channel_capacity, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = LinkConfig::from_json_str(r#"{ "max_buffer_len": 4 }"#).unwrap_err();
        assert!(err.to_string().contains("max_buffer_len"));

        let err = LinkConfig::from_json_str(r#"{ "telemetry_channel_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = LinkConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }
}
