//! Conversions from raw nearable fields to their meaningful values

use crate::models::{BatteryLevel, Orientation};

/// Milli-g per unit of a raw acceleration byte
const ACCELERATION_SCALE: f64 = 15.62;

const MOVING_FLAG: u8 = 0x40;
const BATTERY_ABSENT_FLAG: i32 = 0x80;

/// Hardware revision string for the raw hardware byte
pub fn hardware_version(byte: u8) -> &'static str {
    match byte {
        1 => "D3.2",
        2 => "D3.3",
        3 => "D3.4",
        4 => "SB0",
        _ => "unknown",
    }
}

/// Application firmware version for the raw firmware byte
pub fn firmware_version(byte: i8) -> &'static str {
    match byte {
        -127 => "SA1.0.0",
        -126 => "SA1.0.1",
        _ => "unknown",
    }
}

/// Bootloader version for a raw version byte.
///
/// The decoder passes the firmware byte here. It is unclear whether that
/// byte is meant to carry the bootloader version as well.
pub fn bootloader_version(version_byte: i8) -> &'static str {
    match version_byte {
        1 => "SB1.0.0",
        _ => "unknown",
    }
}

/// Temperature in °C from a 12-bit two's complement value with 4 fractional bits
pub fn temperature(raw: i16) -> f64 {
    let t = (i32::from(raw) & 0x0FFF) << 4;

    if t & 0x8000 != 0 {
        (f64::from(t & 0x7FFF) - 32768.0) / 256.0
    } else {
        f64::from(t) / 256.0
    }
}

/// Acceleration in milli-g
pub fn acceleration(raw: i8) -> f64 {
    f64::from(raw) * ACCELERATION_SCALE
}

/// Battery voltage, or 0.0 when the frame flags battery data as absent
///
/// The voltage is a 10-bit reading over a 3.6 V reference. The upper bits come
/// from the moving indicator byte and the lower bits from the battery byte.
pub fn battery_voltage(battery_raw: i8, moving_and_battery_raw: i8) -> f64 {
    let flags = i32::from(moving_and_battery_raw);
    if flags & BATTERY_ABSENT_FLAG != 0 {
        return 0.0;
    }

    let raw = (flags << 8) + ((i32::from(battery_raw) >> 4) & 0x3FF);
    3.6 * f64::from(raw) / 1023.0
}

pub fn battery_level(battery_raw: i8, moving_and_battery_raw: i8) -> BatteryLevel {
    BatteryLevel::from_voltage(battery_voltage(battery_raw, moving_and_battery_raw))
}

pub fn is_moving(moving_and_battery_raw: i8) -> bool {
    (moving_and_battery_raw as u8) & MOVING_FLAG != 0
}

/// Classify the resting position from acceleration in milli-g.
///
/// Checks run in a fixed order and the first match wins.
pub fn orientation(is_moving: bool, x: f64, y: f64, z: f64) -> Orientation {
    if is_moving {
        return Orientation::Unknown;
    }

    if z > 800.0 {
        Orientation::HorizontalUpsideDown
    } else if z < -800.0 {
        Orientation::Horizontal
    } else if x > 700.0 {
        Orientation::LeftSide
    } else if x < -700.0 {
        Orientation::RightSide
    } else if y > 800.0 {
        Orientation::Vertical
    } else if y < -800.0 {
        Orientation::VerticalUpsideDown
    } else {
        Orientation::Indeterminate
    }
}
