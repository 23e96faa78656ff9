//! Estimote nearable frame validation and field extraction
use log::{debug, trace, warn};
use uuid::Uuid;

use crate::error::DecodeError;
use crate::models::{Acceleration, DecodedAdvertisement, DecodedRecord, Nearable};
use crate::nearable::interpreters::{
    acceleration, battery_level, bootloader_version, firmware_version, hardware_version,
    is_moving, orientation, temperature,
};

// Nearable frame markers
const FLAGS_STRUCTURE_BYTES: usize = 0x03; // Flags AD structure including its length byte
const SERVICE_LIST_LEN: u8 = 0x03;
const SERVICE_LIST_TYPE: u8 = 0x03; // Complete list of 16-bit service UUIDs
const SERVICE_UUID_LOW: u8 = 0x0F;
const SERVICE_UUID_HIGH: u8 = 0x18;
const MANUFACTURER_DATA_LEN: u8 = 0x17;
const MANUFACTURER_DATA_TYPE: u8 = 0xFF;

/// Shortest input the decoder accepts
pub const MIN_STRUCTURE_LEN: usize = 3;

const BODY_START: usize = 3;
const BODY_LEN: usize = 25;

/// Bytes needed to extract every nearable field
pub const FRAME_LEN: usize = BODY_START + BODY_LEN;

/// Vendor-fixed first 12 bytes of every nearable UUID
pub const UUID_PREFIX: [u8; 12] = [
    0xd0, 0xd3, 0xfa, 0x86, 0xca, 0x76, 0x45, 0xec, 0x9b, 0xd9, 0x6a, 0xf4,
];

/// Fields of a nearable frame before interpretation
///
/// The frame spans three AD structures: Flags, a service UUID list holding
/// 0x180F, and the manufacturer-specific data. The body starts at byte 3 of
/// the input and is laid out as follows (offsets relative to byte 3):
/// - Byte 0: Service list length (0x03)
/// - Byte 1: Service list AD type (0x03)
/// - Bytes 2-3: Service UUID, little-endian (0x0F, 0x18)
/// - Byte 4: Manufacturer data length (0x17)
/// - Byte 5: Manufacturer data AD type (0xFF)
/// - Bytes 6-7: Manufacturer id
/// - Byte 8: Nearable protocol version (not used here)
/// - Bytes 9-12: UUID suffix
/// - Bytes 13-14: Major (unsigned 16-bit, big-endian)
/// - Bytes 15-16: Minor (unsigned 16-bit, big-endian)
/// - Byte 17: Hardware version
/// - Byte 18: Firmware version (signed)
/// - Byte 19: Temperature (signed)
/// - Byte 20: Battery (signed)
/// - Byte 21: Moving indicator and battery level (signed)
/// - Bytes 22-24: Acceleration X, Y, Z (signed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawFrame {
    pub service_list_len: u8,
    pub service_list_type: u8,
    pub service_uuid_low: u8,
    pub service_uuid_high: u8,
    pub manufacturer_data_len: u8,
    pub manufacturer_data_type: u8,
    pub manufacturer_id: [u8; 2],
    pub protocol_version: u8,
    pub uuid_suffix: [u8; 4],
    pub major: u16,
    pub minor: u16,
    pub hardware_version: u8,
    pub firmware_version: i8,
    pub temperature: i8,
    pub battery: i8,
    pub moving_and_battery: i8,
    pub acceleration_x: i8,
    pub acceleration_y: i8,
    pub acceleration_z: i8,
}

impl RawFrame {
    pub fn from_body(body: &[u8; BODY_LEN]) -> Self {
        RawFrame {
            service_list_len: body[0],
            service_list_type: body[1],
            service_uuid_low: body[2],
            service_uuid_high: body[3],
            manufacturer_data_len: body[4],
            manufacturer_data_type: body[5],
            manufacturer_id: [body[6], body[7]],
            protocol_version: body[8],
            uuid_suffix: [body[9], body[10], body[11], body[12]],
            major: u16::from_be_bytes([body[13], body[14]]),
            minor: u16::from_be_bytes([body[15], body[16]]),
            hardware_version: body[17],
            firmware_version: body[18] as i8,
            temperature: body[19] as i8,
            battery: body[20] as i8,
            moving_and_battery: body[21] as i8,
            acceleration_x: body[22] as i8,
            acceleration_y: body[23] as i8,
            acceleration_z: body[24] as i8,
        }
    }

    /// Whether all six structural markers match exactly
    pub fn has_nearable_markers(&self) -> bool {
        self.service_list_len == SERVICE_LIST_LEN
            && self.service_list_type == SERVICE_LIST_TYPE
            && self.service_uuid_low == SERVICE_UUID_LOW
            && self.service_uuid_high == SERVICE_UUID_HIGH
            && self.manufacturer_data_len == MANUFACTURER_DATA_LEN
            && self.manufacturer_data_type == MANUFACTURER_DATA_TYPE
    }
}

/// Full nearable UUID from the 4 UUID bytes carried in the frame
pub(crate) fn nearable_uuid(suffix: [u8; 4]) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes[..12].copy_from_slice(&UUID_PREFIX);
    bytes[12..].copy_from_slice(&suffix);
    Uuid::from_bytes(bytes)
}

/// Convert raw frame fields into a nearable record
pub(crate) fn interpret(raw: &RawFrame) -> Nearable {
    let moving = is_moving(raw.moving_and_battery);
    let acceleration = Acceleration {
        x: acceleration(raw.acceleration_x),
        y: acceleration(raw.acceleration_y),
        z: acceleration(raw.acceleration_z),
    };

    Nearable {
        uuid: nearable_uuid(raw.uuid_suffix),
        major: raw.major,
        minor: raw.minor,
        manufacturer_id: raw.manufacturer_id,
        hardware_version: hardware_version(raw.hardware_version),
        firmware_version: firmware_version(raw.firmware_version),
        bootloader_version: bootloader_version(raw.firmware_version),
        temperature_celsius: temperature(i16::from(raw.temperature)),
        is_moving: moving,
        acceleration,
        orientation: orientation(moving, acceleration.x, acceleration.y, acceleration.z),
        battery_level: battery_level(raw.battery, raw.moving_and_battery),
    }
}

/// Decode one advertisement structure as an Estimote nearable frame
///
/// `ad_struct` starts at the length byte of the structure and may extend to
/// the end of the advertisement, since the nearable fields live in the
/// structures that follow the Flags structure.
///
/// # Returns
/// `DecodedRecord::Nearable` if every marker matches, `DecodedRecord::Unrecognized`
/// otherwise. Both carry the length of the first structure so the caller can
/// skip it. Fails only when the input is shorter than 3 bytes or shorter than
/// its declared length.
pub fn decode(ad_struct: &[u8]) -> Result<DecodedRecord, DecodeError> {
    if ad_struct.len() < MIN_STRUCTURE_LEN {
        return Err(DecodeError::TooShort {
            len: ad_struct.len(),
        });
    }

    let bytes_consumed = usize::from(ad_struct[0]) + 1;
    if bytes_consumed > ad_struct.len() {
        return Err(DecodeError::Truncated {
            declared: bytes_consumed,
            available: ad_struct.len(),
        });
    }

    let unrecognized = DecodedRecord::Unrecognized { bytes_consumed };
    if bytes_consumed != FLAGS_STRUCTURE_BYTES {
        return Ok(unrecognized);
    }

    let body: &[u8; BODY_LEN] = match ad_struct
        .get(BODY_START..FRAME_LEN)
        .and_then(|body| body.try_into().ok())
    {
        Some(body) => body,
        None => {
            debug!(
                "Structure too short for a nearable frame: len={}",
                ad_struct.len()
            );
            return Ok(unrecognized);
        }
    };

    trace!("Candidate nearable frame: {:02X?}", body);

    let raw = RawFrame::from_body(body);
    if !raw.has_nearable_markers() {
        debug!("Frame markers do not match a nearable: {:02X?}", &body[..6]);
        return Ok(unrecognized);
    }

    Ok(DecodedRecord::Nearable {
        bytes_consumed,
        nearable: interpret(&raw),
    })
}

/// Iterator over the AD structures of a full advertisement payload
///
/// Each structure is passed to [`decode`] and the iterator advances by the
/// consumed byte count. A zero length byte ends the payload. Iteration stops
/// after the first error.
pub struct AdStructures<'a> {
    payload: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> AdStructures<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            offset: 0,
            done: false,
        }
    }
}

impl Iterator for AdStructures<'_> {
    type Item = Result<DecodedRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let remaining = match self.payload.get(self.offset..) {
            Some(remaining) if !remaining.is_empty() && remaining[0] != 0 => remaining,
            _ => {
                self.done = true;
                return None;
            }
        };

        let declared = usize::from(remaining[0]) + 1;
        let result = if declared > remaining.len() {
            Err(DecodeError::Truncated {
                declared,
                available: remaining.len(),
            })
        } else if remaining.len() < MIN_STRUCTURE_LEN {
            // Complete but too small to carry a nearable
            Ok(DecodedRecord::Unrecognized {
                bytes_consumed: declared,
            })
        } else {
            decode(remaining)
        };

        match &result {
            Ok(record) => self.offset += record.bytes_consumed(),
            Err(e) => {
                warn!("Malformed structure at offset {}: {}", self.offset, e);
                self.done = true;
            }
        }

        Some(result)
    }
}

/// Decode every AD structure of an advertisement payload
///
/// Records decoded before a malformed structure are kept, and the error that
/// stopped the walk is returned alongside them.
pub fn decode_advertisement(payload: &[u8]) -> DecodedAdvertisement {
    let mut decoded = DecodedAdvertisement::default();

    for result in AdStructures::new(payload) {
        match result {
            Ok(record) => decoded.records.push(record),
            Err(e) => decoded.error = Some(e),
        }
    }

    decoded
}
