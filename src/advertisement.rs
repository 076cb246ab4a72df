//! Advertisement parsing for device discovery.
//!
//! Devices identify themselves either with manufacturer data shaped like
//! ```text
//! 68 79 <product id> <firmware> <unique id: 4 bytes>
//! ```
//! or, on some units, with an advertised name such as `hy2v3.1`.
//! [`decode_scan_record`] tries the bytes first and falls back to the name.

use serde::Serialize;

use crate::protocol::{find_pair, HEADER};

/// Bytes parsed after the marker: header, product id, firmware, unique id.
pub const ADVERTISEMENT_WINDOW: usize = 8;

/// Minimum byte-form payload: header, product id, firmware.
const MIN_PAYLOAD_LEN: usize = 4;

/// Name prefix for the name form, compared case-insensitively.
const NAME_PREFIX: &str = "hy";

/// Firmware label when the name carries none.
const UNKNOWN_FIRMWARE: &str = "unknown";

/// Product identity broadcast before connecting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Advertisement {
    pub product_id: Option<u32>,
    pub firmware_version: Option<String>,
    /// Eight uppercase hex characters.
    pub unique_id: Option<String>,
}

impl Advertisement {
    /// Parse a payload that starts with the `68 79` marker.
    ///
    /// # Example
    ///
    /// ```
    /// use massager_protocol::advertisement::Advertisement;
    ///
    /// let adv = Advertisement::parse_bytes(Some(&[0x68, 0x79, 0x31, 0x41, 0xAA, 0xBB, 0xCC, 0xDD]))
    ///     .unwrap();
    /// assert_eq!(adv.product_id, Some(1));
    /// assert_eq!(adv.firmware_version.as_deref(), Some("A"));
    /// assert_eq!(adv.unique_id.as_deref(), Some("AABBCCDD"));
    /// ```
    pub fn parse_bytes(payload: Option<&[u8]>) -> Option<Self> {
        let payload = payload?;
        if payload.len() < MIN_PAYLOAD_LEN || payload[..2] != HEADER {
            return None;
        }

        let product = payload[2];
        let product_id = if product.is_ascii_digit() {
            (product - b'0') as u32
        } else {
            product as u32
        };

        let firmware = payload[3];
        let firmware_version = if firmware.is_ascii_alphanumeric() || firmware == b'.' || firmware == b'-'
        {
            (firmware as char).to_string()
        } else {
            firmware.to_string()
        };

        let unique_id = payload
            .get(4..ADVERTISEMENT_WINDOW)
            .map(|id| id.iter().map(|b| format!("{:02X}", b)).collect());

        Some(Self {
            product_id: Some(product_id),
            firmware_version: Some(firmware_version),
            unique_id,
        })
    }

    /// Parse an advertised name such as `hy2v3.1`.
    ///
    /// # Example
    ///
    /// ```
    /// use massager_protocol::advertisement::Advertisement;
    ///
    /// let adv = Advertisement::parse_name(Some("hy2v3.1")).unwrap();
    /// assert_eq!(adv.product_id, Some(2));
    /// assert_eq!(adv.firmware_version.as_deref(), Some("v3.1"));
    /// ```
    pub fn parse_name(name: Option<&str>) -> Option<Self> {
        let name = name?;
        let mut chars = name.chars();

        let prefix: String = chars.by_ref().take(NAME_PREFIX.len()).collect();
        if !prefix.eq_ignore_ascii_case(NAME_PREFIX) {
            return None;
        }

        let product_id = chars.next()?.to_digit(10)?;

        let suffix = chars.as_str();
        let firmware_version = if suffix.is_empty() {
            UNKNOWN_FIRMWARE.to_string()
        } else {
            suffix.to_string()
        };

        Some(Self {
            product_id: Some(product_id),
            firmware_version: Some(firmware_version),
            unique_id: None,
        })
    }
}

/// Locate the `68 79` marker inside raw advertisement bytes and parse the
/// window that follows it.
pub fn scan_manufacturer_data(raw: &[u8]) -> Option<Advertisement> {
    let start = find_pair(raw, HEADER, 0)?;
    let end = (start + ADVERTISEMENT_WINDOW).min(raw.len());
    Advertisement::parse_bytes(Some(&raw[start..end]))
}

/// Identify a scan result from its raw advertisement bytes and/or name.
pub fn decode_scan_record(raw: Option<&[u8]>, name: Option<&str>) -> Option<Advertisement> {
    let from_bytes = raw.and_then(scan_manufacturer_data);
    if from_bytes.is_some() {
        return from_bytes;
    }

    let from_name = Advertisement::parse_name(name);
    if from_name.is_none() {
        tracing::trace!("Ignoring scan result {:?}", name);
    }
    from_name
}
