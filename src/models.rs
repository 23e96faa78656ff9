use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::error::DecodeError;

/// Acceleration per axis in milli-g
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Resting position of a nearable derived from its acceleration axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    /// The nearable is moving, so no resting position can be given
    Unknown,
    HorizontalUpsideDown,
    Horizontal,
    LeftSide,
    RightSide,
    Vertical,
    VerticalUpsideDown,
    /// Not moving, but no axis crossed its threshold
    Indeterminate,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::HorizontalUpsideDown => "HORIZONTAL_UPSIDE_DOWN",
            Self::Horizontal => "HORIZONTAL",
            Self::LeftSide => "LEFT_SIDE",
            Self::RightSide => "RIGHT_SIDE",
            Self::Vertical => "VERTICAL",
            Self::VerticalUpsideDown => "VERTICAL_UPSIDE_DOWN",
            Self::Indeterminate => "INDETERMINATE",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl BatteryLevel {
    /// Voltage thresholds used by the nearable firmware.
    /// A voltage of zero means the frame carried no battery data.
    pub fn from_voltage(voltage: f64) -> Self {
        if voltage >= 2.95 {
            Self::High
        } else if voltage >= 2.7 {
            Self::Medium
        } else if voltage > 0.0 {
            Self::Low
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensor and identity fields of one recognized nearable frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nearable {
    pub uuid: Uuid,
    pub major: u16,
    pub minor: u16,
    #[serde(serialize_with = "serialize_hex")]
    pub manufacturer_id: [u8; 2],
    pub hardware_version: &'static str,
    pub firmware_version: &'static str,
    pub bootloader_version: &'static str,
    pub temperature_celsius: f64,
    pub is_moving: bool,
    pub acceleration: Acceleration,
    pub orientation: Orientation,
    pub battery_level: BatteryLevel,
}

impl Nearable {
    /// Manufacturer id as lower-case hex, e.g. "5d01"
    pub fn manufacturer_id_hex(&self) -> String {
        hex::encode(self.manufacturer_id)
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8; 2], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Result of decoding one advertisement structure
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    Unrecognized {
        bytes_consumed: usize,
    },
    Nearable {
        bytes_consumed: usize,
        nearable: Nearable,
    },
}

impl DecodedRecord {
    /// Number of bytes the caller should skip to reach the next structure
    pub fn bytes_consumed(&self) -> usize {
        match self {
            Self::Unrecognized { bytes_consumed } | Self::Nearable { bytes_consumed, .. } => {
                *bytes_consumed
            }
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Nearable { .. })
    }

    pub fn nearable(&self) -> Option<&Nearable> {
        match self {
            Self::Nearable { nearable, .. } => Some(nearable),
            Self::Unrecognized { .. } => None,
        }
    }
}

/// Records decoded from one advertisement payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAdvertisement {
    pub records: Vec<DecodedRecord>,
    /// Set when the walk stopped at a malformed structure
    pub error: Option<DecodeError>,
}

/// One output line of the decoder binary
#[derive(Debug, Serialize)]
pub struct NearableReport<'a> {
    pub received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub bytes_consumed: usize,
    #[serde(flatten)]
    pub nearable: &'a Nearable,
}

/// Counters reported when the decoder binary exits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub lines: u64,
    pub nearables: u64,
    pub unrecognized: u64,
    pub malformed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_level_thresholds() {
        assert_eq!(BatteryLevel::from_voltage(2.95), BatteryLevel::High);
        assert_eq!(BatteryLevel::from_voltage(2.94999), BatteryLevel::Medium);
        assert_eq!(BatteryLevel::from_voltage(2.7), BatteryLevel::Medium);
        assert_eq!(BatteryLevel::from_voltage(2.69999), BatteryLevel::Low);
        assert_eq!(BatteryLevel::from_voltage(0.0), BatteryLevel::Unknown);
        assert_eq!(BatteryLevel::from_voltage(f64::NAN), BatteryLevel::Unknown);
    }

    #[test]
    fn labels_match_wire_names() {
        assert_eq!(Orientation::HorizontalUpsideDown.to_string(), "HORIZONTAL_UPSIDE_DOWN");
        assert_eq!(
            serde_json::to_string(&Orientation::VerticalUpsideDown).unwrap(),
            "\"VERTICAL_UPSIDE_DOWN\""
        );
        assert_eq!(BatteryLevel::Medium.to_string(), "medium");
        assert_eq!(serde_json::to_string(&BatteryLevel::High).unwrap(), "\"high\"");
    }

    #[test]
    fn record_accessors() {
        let record = DecodedRecord::Unrecognized { bytes_consumed: 7 };
        assert_eq!(record.bytes_consumed(), 7);
        assert!(!record.is_recognized());
        assert!(record.nearable().is_none());
    }
}
