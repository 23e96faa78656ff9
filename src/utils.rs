//! Input parsing and output formatting for the decoder binary
use time::format_description::well_known::Rfc3339;
use time::{format_description, OffsetDateTime};

use crate::error::DecodeError;
use crate::models::{Nearable, NearableReport};

/// Format a timestamp for human-readable output
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format.
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

pub fn format_rfc3339(dt: &OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string())
}

/// Parse one line of hex-encoded advertisement bytes
///
/// Accepts an optional `0x` prefix and whitespace, `:` or `-` between bytes,
/// so output from most BLE sniffing tools can be piped in directly.
pub fn parse_hex(line: &str) -> Result<Vec<u8>, DecodeError> {
    let line = line.trim();
    let line = line
        .strip_prefix("0x")
        .or_else(|| line.strip_prefix("0X"))
        .unwrap_or(line);

    let digits: String = line
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    Ok(hex::decode(digits)?)
}

/// Render a decoded nearable as a single JSON line
pub fn render_json(
    nearable: &Nearable,
    bytes_consumed: usize,
    name: Option<&str>,
    received_at: &OffsetDateTime,
) -> serde_json::Result<String> {
    serde_json::to_string(&NearableReport {
        received_at: format_rfc3339(received_at),
        name,
        bytes_consumed,
        nearable,
    })
}

/// Render a decoded nearable as a human-readable line
pub fn render_text(nearable: &Nearable, name: Option<&str>, received_at: &OffsetDateTime) -> String {
    let label = match name {
        Some(name) => name.to_string(),
        None => nearable.uuid.to_string(),
    };

    format!(
        "{} {} major={} minor={} temp={:.2}°C moving={} orientation={} battery={} \
         accel=({:.1}, {:.1}, {:.1}) mg hw={} fw={} bootloader={} mfg={}",
        format_datetime(received_at),
        label,
        nearable.major,
        nearable.minor,
        nearable.temperature_celsius,
        nearable.is_moving,
        nearable.orientation,
        nearable.battery_level,
        nearable.acceleration.x,
        nearable.acceleration.y,
        nearable.acceleration.z,
        nearable.hardware_version,
        nearable.firmware_version,
        nearable.bootloader_version,
        nearable.manufacturer_id_hex(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearable::decode;

    const FRAME_HEX: &str = "020104 03030F18 17FF5D01 01 11223344 0001 0002 01 81 19 50 00 0A0A0A";

    fn sample_nearable() -> Nearable {
        let bytes = parse_hex(FRAME_HEX).unwrap();
        decode(&bytes).unwrap().nearable().cloned().unwrap()
    }

    #[test]
    fn parses_separated_hex() {
        assert_eq!(parse_hex("02 01 06").unwrap(), vec![0x02, 0x01, 0x06]);
        assert_eq!(parse_hex("0x02:01:06").unwrap(), vec![0x02, 0x01, 0x06]);
        assert_eq!(parse_hex("02-01-06\n").unwrap(), vec![0x02, 0x01, 0x06]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(matches!(parse_hex("0G"), Err(DecodeError::InvalidHex(_))));
        assert!(matches!(parse_hex("020"), Err(DecodeError::InvalidHex(_))));
    }

    #[test]
    fn formats_datetime() {
        let dt = OffsetDateTime::from_unix_timestamp(0).unwrap();
        assert_eq!(format_datetime(&dt), "01.01.1970 - 00:00:00");
        assert_eq!(format_rfc3339(&dt), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn renders_json_with_hex_manufacturer_id() {
        let nearable = sample_nearable();
        let dt = OffsetDateTime::from_unix_timestamp(0).unwrap();

        let line = render_json(&nearable, 3, Some("kitchen"), &dt).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["received_at"], "1970-01-01T00:00:00Z");
        assert_eq!(value["name"], "kitchen");
        assert_eq!(value["bytes_consumed"], 3);
        assert_eq!(value["uuid"], "d0d3fa86-ca76-45ec-9bd9-6af411223344");
        assert_eq!(value["manufacturer_id"], "5d01");
        assert_eq!(value["major"], 1);
        assert_eq!(value["minor"], 2);
        assert_eq!(value["hardware_version"], "D3.2");
        assert_eq!(value["orientation"], "INDETERMINATE");
        assert_eq!(value["battery_level"], "low");
        assert!(value["acceleration"]["x"].is_number());
    }

    #[test]
    fn json_omits_missing_name() {
        let nearable = sample_nearable();
        let dt = OffsetDateTime::from_unix_timestamp(0).unwrap();

        let line = render_json(&nearable, 3, None, &dt).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("name").is_none());
    }

    #[test]
    fn renders_text() {
        let nearable = sample_nearable();
        let dt = OffsetDateTime::from_unix_timestamp(0).unwrap();

        let line = render_text(&nearable, None, &dt);
        assert!(line.starts_with("01.01.1970 - 00:00:00 d0d3fa86-ca76-45ec-9bd9-6af411223344"));
        assert!(line.contains("major=1 minor=2"));
        assert!(line.contains("temp=1.56°C"));
        assert!(line.contains("orientation=INDETERMINATE battery=low"));
        assert!(line.contains("mfg=5d01"));

        let named = render_text(&nearable, Some("kitchen"), &dt);
        assert!(named.starts_with("01.01.1970 - 00:00:00 kitchen major=1"));
    }
}
